use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use chatter::core::config;
use chatter::tui;

#[derive(Parser)]
#[command(name = "chatter", about = "Channel-tagged chat in the terminal")]
struct Args {
    /// Backend base URL (overrides config and CHATTER_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// Sign in as this user at startup
    #[arg(short, long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to chatter.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("chatter.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().map_err(std::io::Error::other)?;
    let resolved = config::resolve(
        &file_config,
        args.backend_url.as_deref(),
        args.user.as_deref(),
    )
    .map_err(std::io::Error::other)?;

    log::info!(
        "Chatter starting up (backend: {})",
        resolved.backend_base_url
    );

    tui::run(resolved)
}
