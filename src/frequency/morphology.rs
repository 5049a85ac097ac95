// Word counting with the vibrato morphological analyser.

use std::fs::File;
use std::path::Path;

use tracing::info;
use vibrato::{Dictionary, Tokenizer};

use super::{FrequencyTable, WordCounter};
use crate::error::{Error, Result};

pub struct VibratoCounter {
    tokenizer: Tokenizer,
}

impl VibratoCounter {
    /// Loads a zstd compressed system dictionary (`system.dic.zst`).
    pub fn from_zstd(dictionary_path: &Path) -> Result<Self> {
        info!(dictionary = %dictionary_path.display(), "loading the dictionary");
        let file = File::open(dictionary_path).map_err(|e| {
            Error::Config(format!(
                "cannot open dictionary {}: {}",
                dictionary_path.display(),
                e
            ))
        })?;
        let decoder = zstd::Decoder::new(file)?;
        let dict = Dictionary::read(decoder).map_err(|e| Error::Tokenization(e.to_string()))?;

        Ok(Self::new(dict))
    }

    pub fn new(dict: Dictionary) -> Self {
        Self {
            tokenizer: Tokenizer::new(dict),
        }
    }
}

// Punctuation, symbols and whitespace are not words.
fn is_word(surface: &str) -> bool {
    surface.chars().any(char::is_alphanumeric)
}

impl WordCounter for VibratoCounter {
    fn count_words(&self, text: &str) -> Result<FrequencyTable> {
        let mut worker = self.tokenizer.new_worker();
        let mut table = FrequencyTable::new();

        // One lattice per line keeps memory bounded for book-sized input.
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            worker.reset_sentence(line);
            worker.tokenize();
            for token in worker.token_iter() {
                let surface = token.surface();
                if is_word(surface) {
                    table.add(surface, 1);
                }
            }
        }

        Ok(table)
    }
}
