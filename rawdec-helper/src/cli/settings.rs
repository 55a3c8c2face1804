use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use rd_common::{DecoderEngine, DecoderSettings};

#[derive(Parser, Debug)]
pub struct SettingsCommand {
    /// Use exactly this libvvcdec file. It is checked before it is saved.
    #[arg(long, value_name = "FILE")]
    pub set_library: Option<PathBuf>,

    /// Add a directory to the library search path.
    #[arg(long, value_name = "DIR")]
    pub add_search_dir: Vec<PathBuf>,

    /// Start from the defaults instead of the saved settings.
    #[arg(long)]
    pub clear: bool,
}

impl SettingsCommand {
    pub fn run(self, path: &Path) -> Result<()> {
        let mut settings = if self.clear {
            DecoderSettings::default()
        } else {
            DecoderSettings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?
        };

        let changed = self.apply(&mut settings)?;
        if changed {
            settings
                .save(path)
                .with_context(|| format!("saving settings to {}", path.display()))?;
        }

        println!("{}", serde_json::to_string_pretty(&settings)?);
        Ok(())
    }

    /// Apply the requested edits. Returns whether anything needs saving.
    fn apply(&self, settings: &mut DecoderSettings) -> Result<bool> {
        if let Some(library) = &self.set_library {
            rd_decoder::check_library_file(DecoderEngine::VvcDec, library)
                .with_context(|| format!("{} is not a usable libvvcdec", library.display()))?;
            settings.vvcdec_library = Some(library.clone());
        }
        for dir in &self.add_search_dir {
            if !settings.search_dirs.contains(dir) {
                settings.search_dirs.push(dir.clone());
            }
        }
        Ok(self.clear || self.set_library.is_some() || !self.add_search_dir.is_empty())
    }
}
