use clap::Parser;
use sweepduel::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), SweepduelError> {
    let args = ServerArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true).compact())
        .init();

    let config = ServerConfig::from(args);
    tracing::info!(
        bind = %config.bind,
        width = config.room.board.width,
        height = config.room.board.height,
        mines = config.room.board.mines,
        seed = ?config.room.board.seed,
        "starting sweepduel"
    );

    let server = SweepduelServer::builder().config(config).build().await?;
    server.run().await
}
