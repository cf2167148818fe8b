//! wtmplast: main entry point

use clap::Parser;
use wtmplast::cli::{self, Cli};
use wtmplast::error::Result;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    cli::run(cli)
}
