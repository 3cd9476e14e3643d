//! Classification of the positional arguments left after option parsing.
//!
//! Each token is either a splitpoint time, an existing directory (expanded
//! in place to the audio files it contains) or a plain filename.

use std::path::Path;

use crate::engine::{Engine, EngineError};
use crate::time;

/// What a single positional token turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    TimeMark(i64),
    Directory(String),
    Filename(String),
}

pub fn classify(token: &str) -> Token {
    if let Some(hundredths) = time::parse_time(token) {
        return Token::TimeMark(hundredths);
    }
    if Path::new(token).is_dir() {
        return Token::Directory(token.to_string());
    }
    Token::Filename(token.to_string())
}

/// Filenames and splitpoints collected from the positional arguments, in the
/// order they were given.
#[derive(Debug, Default, PartialEq)]
pub struct CollectedInputs {
    pub filenames: Vec<String>,
    pub splitpoints: Vec<i64>,
    pub had_directory: bool,
}

pub fn collect(tokens: &[String], engine: &dyn Engine) -> Result<CollectedInputs, EngineError> {
    let mut inputs = CollectedInputs::default();
    for token in tokens {
        match classify(token) {
            Token::TimeMark(hundredths) => inputs.splitpoints.push(hundredths),
            Token::Directory(dir) => {
                inputs.had_directory = true;
                inputs.filenames.extend(engine.find_audio_files(&dir)?);
            }
            Token::Filename(name) => inputs.filenames.push(name),
        }
    }
    Ok(inputs)
}
