use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "func2widgets")]
#[command(about = "Derive GUI widget descriptions from Python functions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Python source file to inspect
    pub file: PathBuf,

    /// Target: a function name, a class name, or Class.method
    pub target: String,

    /// Keep the receiver parameter (self/cls) of methods
    #[arg(long)]
    pub keep_self: bool,

    /// Reject class targets instead of reflecting their __init__
    #[arg(long)]
    pub no_classes: bool,

    /// Fail on a malformed widget configs block instead of ignoring it
    #[arg(long)]
    pub strict: bool,

    /// Use the raw docstring (block stripped) as the function description
    #[arg(long)]
    pub raw_description: bool,

    /// Let prose "defaults to ..." hints replace explicit None defaults
    #[arg(long)]
    pub prose_defaults: bool,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pub pretty: bool,
}
