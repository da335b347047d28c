use crate::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Recursively search text and CSV files for a keyword and jump to the match",
    long_about = None,
    after_help = "Examples:\n  supersearch ~/Documents report\n  supersearch D:\\Data 2024 --case-sensitive\n  supersearch                     # prompts for directory and keyword"
)]
pub struct Cli {
    /// Directory to search; prompted for when omitted
    pub directory: Option<PathBuf>,

    /// Keyword to look for; prompted for when omitted
    pub keyword: Option<String>,

    /// Match case exactly
    #[clap(short, long, value_parser, default_value_t = false)]
    pub case_sensitive: bool,

    /// File extensions to include (default: txt csv)
    #[clap(short, long = "ext", value_parser, num_args = 1.., use_value_delimiter = true)]
    pub extensions: Option<Vec<String>>,

    /// Number of worker threads
    #[clap(short, long, value_parser)]
    pub jobs: Option<usize>,

    /// Skip files larger than this many MB
    #[clap(long, value_parser)]
    pub max_size: Option<u64>,

    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Do not ask which result to open
    #[clap(long, value_parser, default_value_t = false)]
    pub no_open: bool,

    #[clap(long, value_parser, default_value_t = false)]
    pub no_color: bool,

    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    #[clap(long, value_parser, default_value_t = false)]
    pub verbose: bool,
}
