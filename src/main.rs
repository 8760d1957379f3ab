use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use instore_assistant::config::Config;
use instore_assistant::gateway::HttpGateway;
use instore_assistant::shell::{Shell, HELP};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the pages on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    tracing::info!("Backend: {}", config.base_url());
    tracing::info!("Resolution policy: {:?}", config.resolution_policy);

    let gateway = Arc::new(HttpGateway::new(&config)?);
    let shell = Shell::new(gateway, config.resolution_policy);

    println!("In-Store Assistant");
    print!("{HELP}");

    shell
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}
