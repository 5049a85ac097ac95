pub mod morphology;

use std::collections::HashMap;

use crate::error::Result;

/// Counts distinct word surface forms in a text.
///
/// Implementations are opaque; a fault is reported as `Error::Tokenization`.
pub trait WordCounter {
    fn count_words(&self, text: &str) -> Result<FrequencyTable>;
}

/// Word to occurrence count, remembering the order in which words were first seen.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, word: &str, count: u64) {
        match self.index.get(word) {
            Some(&i) => self.entries[i].1 += count,
            None => {
                self.index.insert(word.to_string(), self.entries.len());
                self.entries.push((word.to_string(), count));
            }
        }
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.index.get(word).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut table = Self::new();
        for word in iter {
            table.add(word, 1);
        }
        table
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedWord {
    pub word: String,
    pub count: u64,
}

/// Words ordered by descending count. Equal counts keep first-occurrence order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RankedWordList(Vec<RankedWord>);

impl RankedWordList {
    pub fn from_table(table: FrequencyTable) -> Self {
        let mut words: Vec<RankedWord> = table
            .entries
            .into_iter()
            .map(|(word, count)| RankedWord { word, count })
            .collect();
        // sort_by is stable
        words.sort_by(|a, b| b.count.cmp(&a.count));
        Self(words)
    }

    pub fn words(&self) -> &[RankedWord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Runs the counter over the extracted text. No transformation, no retry.
pub fn build_frequency_table<C>(counter: &C, text: &str) -> Result<FrequencyTable>
where
    C: WordCounter + ?Sized,
{
    counter.count_words(text)
}
