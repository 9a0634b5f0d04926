mod cli;

use std::io::Read;

use anyhow::Context;
use clap::Parser;

use livequiz::{config, parser, persist};

use crate::cli::Cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when `--strict` is set and the document has errors.
fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    let mut options = config.parse_options();
    if let Some(author) = cli.author {
        options.author = author;
    }
    if let Some(base_url) = cli.base_url {
        options.base_url = base_url;
    }

    let text = if cli.path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Cannot read quiz document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&cli.path)
            .with_context(|| format!("Cannot read quiz document {}", cli.path))?
    };

    let result = parser::parse_document_with(&text, &options);
    log::info!(
        "{}: {} question(s), status {:?}",
        cli.path,
        result.quiz.questions.len(),
        result.quiz.status
    );

    if cli.summary {
        persist::print_summary(&result);
    } else if let Some(ref output) = cli.output {
        persist::save_result(&result, output, cli.format)?;
        eprintln!("Draft written to {}", output.display());
    } else {
        print!("{}", persist::render(&result, cli.format)?);
    }

    Ok(!(cli.strict && !result.errors.is_empty()))
}
