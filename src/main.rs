use std::sync::Arc;

use clap::Parser as _;
use proc_exit::prelude::*;

mod args;
mod browser;
mod config;
mod error;
mod serve;

fn main() {
    human_panic::setup_panic!();

    let result = run();
    proc_exit::exit(result);
}

fn run() -> proc_exit::ExitResult {
    let args = args::Cli::parse();
    args.init_logging();

    let config = config::Config::default();
    serve::run(&config, Arc::new(browser::SystemBrowser)).with_code(proc_exit::Code::FAILURE)?;
    Ok(())
}
