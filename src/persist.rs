use std::fs;
use std::path::Path;

use clap::ValueEnum;

use crate::error::{Error, Result};
use crate::model::ParseResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

pub fn render(result: &ParseResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(result)?),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            Ok(json)
        }
    }
}

pub fn save_result(result: &ParseResult, path: &Path, format: OutputFormat) -> Result<()> {
    let content = render(result, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    atomic_write(path, &content)
}

pub fn load_result(path: &Path) -> Result<ParseResult> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    // JSON is a subset of YAML, so one reader covers both formats.
    Ok(serde_yaml::from_str(&content)?)
}

fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}

pub fn print_summary(result: &ParseResult) {
    let quiz = &result.quiz;
    println!("Quiz: {}", quiz.title);
    if !quiz.description.is_empty() {
        println!("Description: {}", quiz.description);
    }
    println!("Questions: {}", quiz.questions.len());
    println!("Status: {:?}", quiz.status);
    println!("Join token: {}", quiz.join.token);
    println!("Join URL: {}", quiz.join_url());
    if !result.errors.is_empty() {
        println!("Errors:");
        for e in &result.errors {
            println!("  - {}", e);
        }
    }
    if !result.warnings.is_empty() {
        println!("Warnings:");
        for w in &result.warnings {
            println!("  - {}", w);
        }
    }
}
