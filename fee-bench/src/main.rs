use clap::Parser;
use light_fee_bench::{
    cli::Cli,
    indexer::PhotonIndexer,
    report::render_report,
    rpc::SolanaRpcConnection,
    run_from_args,
    telemetry::setup_telemetry,
};
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    setup_telemetry();

    let cli = Cli::parse();
    let result = run_from_args(&cli.args, |config| {
        (
            SolanaRpcConnection::new(config.rpc_url.clone(), None),
            PhotonIndexer::new(config.indexer_url.clone(), Some(config.api_key.clone())),
        )
    })
    .await;

    match result {
        Ok(report) => println!("{}", render_report(&report)),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
