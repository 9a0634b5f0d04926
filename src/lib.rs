pub mod config;
pub mod delivery;
pub mod error;
pub mod model;
pub mod parser;
pub mod persist;
pub mod scoring;
pub mod settings;
pub mod shuffle;
pub mod token;

pub use error::{Error, Result};
pub use parser::{parse_document, parse_document_with, ParseOptions};
