//! Main application entry point.

use clap::Parser;
use stacksmith_app::Cli;

fn main() {
    #[cfg(feature = "native")]
    env_logger::init();
    log::info!("Starting Stacksmith");

    if let Err(e) = stacksmith_app::run(Cli::parse()) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
