use clap::Parser;
use clinvar_study::{Cli, MyVariant, Session};
use color_eyre::eyre::{Report, Result};
use log::debug;

#[tokio::main]
async fn main() -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // CLI Setup

    // Parse CLI parameters
    let args = Cli::parse();

    // initialize color_eyre crate for colorized logs
    color_eyre::install()?;

    // Set logging/verbosity level via RUST_LOG
    std::env::set_var("RUST_LOG", args.verbosity.to_string());

    // initialize env_logger crate for logging/verbosity level
    env_logger::init();

    debug!("Arguments:\n{}", serde_json::to_string_pretty(&args)?);

    // ------------------------------------------------------------------------
    // Session

    let source = MyVariant::new(&args.url)?;
    Session::new(source, args).start().await?;

    Ok(())
}
