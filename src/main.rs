/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for protomap

use clap::Parser;
use protomap::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    // Progress is reported through `info!`, so show it unless RUST_LOG says otherwise
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run(cli)
}
