use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod check;
mod decode;
mod settings;

pub use check::CheckCommand;
pub use decode::DecodeCommand;
pub use settings::SettingsCommand;

#[derive(Parser, Debug)]
#[command(name = "rawdec-helper")]
#[command(about = "Drive a libvvcdec decoder library: self-test, decode to raw YUV, manage settings")]
pub struct Args {
    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decoder settings file.
    #[arg(long, global = true, default_value = "rawdec-helper.json")]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a decoder library and resolve every entry point
    Check(CheckCommand),
    /// Decode a VVC elementary stream into raw planar YUV
    Decode(DecodeCommand),
    /// Show or change the persisted decoder settings
    Settings(SettingsCommand),
}

impl Args {
    pub fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        match self.command {
            Command::Check(cmd) => cmd.run(),
            Command::Decode(cmd) => cmd.run(&self.settings),
            Command::Settings(cmd) => cmd.run(&self.settings),
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
