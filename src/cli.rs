use std::path::PathBuf;

use clap::Parser;

/// Reconstructs QC build scripts, SMD geometry/animation, and BMP
/// textures from a compiled GoldSource Studio MDL (v10) file.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the compiled .mdl file to decompile
    #[clap(value_parser, value_name = "SOURCE_FILE")]
    pub source_file: PathBuf,

    /// Directory to write the reconstructed sources into (defaults to
    /// decomp_<source file name> next to the source file)
    #[clap(value_parser, value_name = "TARGET_DIRECTORY")]
    pub target_directory: Option<PathBuf>,

    /// Log debug output
    #[clap(long, default_value_t = false)]
    pub verbose: bool,
}
