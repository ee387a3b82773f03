use clap::{ArgAction, Parser, ValueEnum};
use dmread_config::{Config, Symbology};
use dmread_library::Mode;
use std::path::PathBuf;

/// Rename specimen images after the data matrix or barcode on their label.
///
/// Every image gets the catalogue number read off its label plus a view
/// suffix: `_D` for the first photograph of a specimen, `_V` for the second,
/// `_MANUAL` for any after that and `_L` for lateral shots. Raw files with
/// the same stem are renamed along with their image.
#[derive(Debug, Parser)]
#[command(name = "dmread", author, version, about, long_about)]
pub struct Cli {
    /// Directory holding the images.
    #[arg(value_parser = parse_directory)]
    pub directory: PathBuf,
    /// Only this directory, or every directory beneath it too.
    #[arg(short, long, value_enum)]
    pub mode: ModeArg,
    /// CSV of image-number ranges (ImageStart, ImageStop, genus,
    /// specificEpithet). Images outside every range are skipped; the rest
    /// get the range's taxon in their name.
    #[arg(short, long)]
    pub ranges: Option<PathBuf>,
    /// What to do with the renames once the batch is done.
    #[arg(long, value_enum, default_value_t = OnComplete::Prompt)]
    pub on_complete: OnComplete,
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Institution code identifiers must start with.
    #[arg(long)]
    pub institution: Option<String>,
    /// Scan budget per decoder run, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub scan_time: Option<u64>,
    /// Decoders to run, in order, comma separated.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub decoders: Vec<DecoderArg>,
    /// Where to write the rename log. Defaults to the image directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    /// More output; repeat for more still. `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
impl Cli {
    /// Command-line flags win over every configuration source.
    pub fn apply(&self, config: &mut Config) {
        if let Some(institution) = &self.institution {
            config.institution = institution.clone();
        }
        if let Some(scan_time) = self.scan_time {
            config.scan_time_ms = scan_time;
        }
        if !self.decoders.is_empty() {
            config.decoders = self.decoders.iter().copied().map(Symbology::from).collect();
        }
        if let Some(log_dir) = &self.log_dir {
            config.log.directory = Some(log_dir.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Standard,
    Recursive,
}
impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => Mode::Standard,
            ModeArg::Recursive => Mode::Recursive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecoderArg {
    Barcode,
    DataMatrix,
}
impl From<DecoderArg> for Symbology {
    fn from(decoder: DecoderArg) -> Self {
        match decoder {
            DecoderArg::Barcode => Symbology::Barcode,
            DecoderArg::DataMatrix => Symbology::DataMatrix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnComplete {
    /// Ask whether to undo.
    Prompt,
    /// Put every file back.
    Undo,
    /// Keep the renames and write the log.
    Log,
}

/// Paths pasted into a terminal often drag trailing whitespace along.
fn parse_directory(value: &str) -> Result<PathBuf, String> {
    match value.trim_end() {
        "" => Err("directory must not be empty".to_string()),
        trimmed => Ok(PathBuf::from(trimmed)),
    }
}
