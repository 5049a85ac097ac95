use std::path::PathBuf;

use crate::deck::DEFAULT_BATCH_SIZE;
use crate::error::{Error, Result};
use crate::jpdb::models::JpdbConfiguration;

pub const API_KEY_VAR: &str = "JPDB_API_KEY";
pub const DICTIONARY_VAR: &str = "VIBRATO_DICTIONARY";

/// Everything the pipeline needs, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: JpdbConfiguration,
    pub dictionary: PathBuf,
    pub batch_size: usize,
    /// Position given to every deck created by a directory run.
    pub default_position: u32,
}

impl Config {
    pub fn new(api: JpdbConfiguration, dictionary: PathBuf) -> Self {
        Self {
            api,
            dictionary,
            batch_size: DEFAULT_BATCH_SIZE,
            default_position: 0,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch size must be at least 1".to_string()));
        }
        self.batch_size = batch_size;
        Ok(self)
    }
}

/// Takes the flag value if given, otherwise the environment variable.
pub fn from_flag_or_env(flag: Option<String>, var: &str) -> Result<String> {
    flag.or_else(|| std::env::var(var).ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{} is not set", var)))
}
