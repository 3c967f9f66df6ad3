// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::RevealPolicy;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "case-reveal")]
#[command(about = "Interactive case-opening scene", long_about = None)]
pub struct Cli {
    /// JSON scene configuration; built-in defaults when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the asset paths are relative to
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Do not play the click sound
    #[arg(long = "no-sound", default_value = "false")]
    pub no_sound: bool,

    /// Do not load the background sphere
    #[arg(long = "no-background", default_value = "false")]
    pub no_background: bool,

    /// Use only the first N image planes
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub planes: Option<usize>,

    /// What happens after a revealed plane is dismissed
    #[arg(long, value_enum)]
    pub reveal: Option<RevealPolicy>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}
