use clap::Parser;
use curve_changer::{
    api::{ApiClient, ApiError},
    args::Args,
    model::{generate_commands, write_commands, CommandError}
};
use thiserror::Error;
use tracing::{error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Commands(#[from] CommandError),

    #[error("failed to write command files: {0}")]
    Io(#[from] std::io::Error)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Curve validation happens here, before anything touches the network
    let args = Args::parse();
    init_logging(&args);

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &Args) {
    let filter = match args.log_level() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // The progress bar lives on an info span, so only the log output is filtered
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter)
        )
        .with(indicatif_layer)
        .init();
}

async fn run(args: Args) -> Result<(), AppError> {
    let mut client = ApiClient::http(&args.fetch_config())?;

    info!(pool = %args.pool, curve = %args.curve.kind(), "Fetching leaderboard IDs");
    let leaderboard_ids = client.leaderboard_ids(&args.pool).await?;
    info!(count = leaderboard_ids.len(), "Fetched leaderboard IDs");

    let commands = generate_commands(&mut client, &leaderboard_ids, &args.pool, &args.curve).await?;
    write_commands(&args.out_dir, &commands)?;

    Ok(())
}
