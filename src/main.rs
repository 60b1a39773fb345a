use std::error::Error;
use std::net::SocketAddr;

use clap::Parser;
use time::UtcOffset;
use tokio::net::TcpListener;

use commentdrop::logger::Logger;
use commentdrop::{build_router, AppState, CliArgs, Config};

fn main() -> Result<(), Box<dyn Error>> {
    // The local offset can only be read while the process is single threaded
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    Logger::init(offset).map_err(|e| e.to_string())?;

    let config = CliArgs::parse().into_config().with_utc_offset(offset);
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(config))
}

async fn serve(config: Config) -> Result<(), Box<dyn Error>> {
    if !config.content_dir.is_dir() {
        log::warn!("Content directory {:?} does not exist, every comment will be rejected", config.content_dir);
    }
    log::info!(
        "Saving comments to {:?} (content: {:?}, touch file: {:?}, offset: {:?})",
        config.comments_dir,
        config.content_dir,
        config.touch_file,
        config.utc_offset
    );

    let (host, port) = config.bind_addr();
    let listener = TcpListener::bind((host, port)).await?;
    log::info!("Accepting comments on http://{}{}", listener.local_addr()?, config.endpoint);

    let state = AppState::new(config)?;
    let app = build_router(state);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
