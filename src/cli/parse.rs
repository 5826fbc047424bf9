//! CLI parse: clap types for georef-output. No behavior beyond option checks.

use crate::error::PipelineError;
use crate::select::frame_override;
use crate::types::FrameId;
use clap::Parser;
use std::path::PathBuf;

/// Generate output products for frames whose registration is complete
#[derive(Parser, Debug)]
#[command(name = "georef-output")]
#[command(about = "Generate output products for registered frames")]
pub struct Cli {
    /// Mission of a single frame to process (requires --roll and --frame)
    #[arg(long)]
    pub mission: Option<String>,

    /// Roll of a single frame to process (requires --mission and --frame)
    #[arg(long)]
    pub roll: Option<String>,

    /// Frame number of a single frame to process (requires --mission and --roll)
    #[arg(long)]
    pub frame: Option<String>,

    /// Do not process more than this many frames (0 = configured default batch)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Print the frames that would be processed and exit
    #[arg(long)]
    pub list: bool,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The explicit frame requested on the command line, if any.
    pub fn frame_override(&self) -> Result<Option<FrameId>, PipelineError> {
        frame_override(
            self.mission.as_deref(),
            self.roll.as_deref(),
            self.frame.as_deref(),
        )
    }
}
