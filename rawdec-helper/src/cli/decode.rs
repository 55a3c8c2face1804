use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use rd_common::{DecoderConfig, DecoderEngine, DecoderRole, DecoderSettings};
use rd_demux::{BitstreamFile, Framing};

use crate::session::DecodeSession;

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum RoleArg {
    #[default]
    Interactive,
    Caching,
}

impl From<RoleArg> for DecoderRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Interactive => DecoderRole::Interactive,
            RoleArg::Caching => DecoderRole::Caching,
        }
    }
}

#[derive(Parser, Debug)]
pub struct DecodeCommand {
    /// VVC elementary stream.
    pub input: PathBuf,

    /// Raw planar YUV output file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Decoder library file; overrides the settings file.
    #[arg(long = "lib")]
    pub library: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = RoleArg::Interactive)]
    pub role: RoleArg,

    /// Stop after this many frames.
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Input units carry an N byte big-endian length prefix instead of start codes.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=4))]
    pub length_size: Option<u8>,
}

impl DecodeCommand {
    pub fn run(self, settings_path: &Path) -> Result<()> {
        let settings = DecoderSettings::load(settings_path)
            .with_context(|| format!("loading settings from {}", settings_path.display()))?;
        let mut config =
            DecoderConfig::from_settings(&settings, DecoderEngine::VvcDec, self.role.into());
        if let Some(library) = &self.library {
            config = config.with_library_file(library);
        }

        let framing = self
            .length_size
            .map_or(Framing::AnnexB, Framing::LengthPrefixed);
        let mut input = BitstreamFile::open(&self.input, framing)
            .with_context(|| format!("reading {}", self.input.display()))?;

        let mut decoder = rd_decoder::create_decoder(&config);
        if let Some(reason) = decoder.error_string() {
            bail!("{} decoder unavailable: {reason}", decoder.decoder_name());
        }
        info!(
            decoder = %decoder.decoder_name(),
            role = %decoder.role(),
            input = %self.input.display(),
            %framing,
            "Decoding"
        );

        let file = File::create(&self.output)
            .with_context(|| format!("creating {}", self.output.display()))?;
        let mut out = BufWriter::new(file);

        let stats = DecodeSession::new(decoder.as_mut())
            .with_max_frames(self.max_frames)
            .run(&mut input, &mut out)?;
        out.flush()
            .with_context(|| format!("writing {}", self.output.display()))?;

        println!("{}: {stats}", self.output.display());
        Ok(())
    }
}
