//! rawdec-helper: decoder library self-test and raw VVC decoding from the
//! command line.

use anyhow::Result;
use clap::Parser;

mod cli;
mod session;

fn main() -> Result<()> {
    cli::Args::parse().run()
}
