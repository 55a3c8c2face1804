use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rd_common::DecoderEngine;

#[derive(Parser, Debug)]
pub struct CheckCommand {
    /// Library file to test.
    pub library: PathBuf,
}

impl CheckCommand {
    pub fn run(self) -> Result<()> {
        rd_decoder::check_library_file(DecoderEngine::VvcDec, &self.library)
            .with_context(|| format!("{} is not a usable libvvcdec", self.library.display()))?;
        println!("{}: ok", self.library.display());
        Ok(())
    }
}
