use exam_cli::{config::EnvVars, runner::start};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .init();
    tracing::info!("Starting exam practice session...");

    let env_vars = EnvVars::new();

    if let Err(e) = start(&env_vars).await {
        tracing::error!("Error running practice session: {:?}", e);
        std::process::exit(1);
    }
}
