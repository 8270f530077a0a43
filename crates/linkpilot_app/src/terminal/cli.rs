use std::path::PathBuf;

use clap::Parser;

/// Submit links for extraction, follow the job and open the results.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "linkpilot", version, about)]
pub struct Args {
    /// RON config file. Defaults to `linkpilot.ron` when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Extraction server base URL.
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,

    /// Seconds between automatic opens.
    #[arg(short, long, value_name = "SECONDS", value_parser = clap::value_parser!(u32).range(1..))]
    pub delay: Option<u32>,

    /// Read links from a file, one per line.
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Start opening links as soon as the job completes.
    #[arg(long)]
    pub auto_open: bool,

    /// Write the download list as soon as the job completes.
    #[arg(long)]
    pub export: bool,

    /// Quit once the job and any automatic work have finished.
    #[arg(long)]
    pub exit_when_done: bool,

    /// Links to submit.
    #[arg(value_name = "LINK")]
    pub links: Vec<String>,
}
