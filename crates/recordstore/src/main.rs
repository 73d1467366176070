mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recordstore::storage::dynamodb::DynamoDbStore;
use recordstore::RecordStoreClient;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so dumped JSON on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recordstore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Command::Load { file, .. } = &cli.command {
        cli::check_file(file)?;
    }

    let aws = cli.global.aws_settings();
    tracing::info!(destination = %aws.target_display(), "Connecting to record store");

    let store = DynamoDbStore::from_settings(&aws).await;
    let client = RecordStoreClient::new(store, cli.global.client_settings());
    client.configure().await?;

    cli::run(&client, cli.command).await
}
