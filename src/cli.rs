use std::path::PathBuf;

use clap::Parser;

use livequiz::persist::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "livequiz", version, about = "Turn a pasted quiz document into a live-quiz draft")]
pub struct Cli {
    /// Quiz document to parse, or - for stdin
    #[arg(default_value = "quiz.txt")]
    pub path: String,

    /// Name recorded as the quiz author [default: from config, else Teacher]
    #[arg(long)]
    pub author: Option<String>,

    /// Config file [default: per-user config.yaml if present]
    #[arg(long, value_name = "file")]
    pub config: Option<PathBuf>,

    /// Origin used to build the join URL pattern
    #[arg(long, value_name = "url")]
    pub base_url: Option<String>,

    /// Output format for the parse result
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Write the parse result to a file instead of stdout
    #[arg(long, value_name = "path")]
    pub output: Option<PathBuf>,

    /// Print a human-readable summary instead of the full result
    #[arg(long)]
    pub summary: bool,

    /// Exit with status 2 when the document has errors
    #[arg(long)]
    pub strict: bool,
}
