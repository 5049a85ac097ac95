use tracing::info;

use crate::error::{Error, Result};
use crate::frequency::{RankedWord, RankedWordList};
use crate::jpdb::models::{VocabularyId, JPDB_PARSE_PATH};
use crate::jpdb::DeckService;

/// Word-forms per parse request. Larger requests get rejected by jpdb.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Resolves ranked words to vocabulary ids, one bounded parse request per batch.
pub struct VocabularyBatcher<'a, S: ?Sized> {
    service: &'a S,
    batch_size: usize,
}

impl<'a, S> VocabularyBatcher<'a, S>
where
    S: DeckService + ?Sized,
{
    pub fn new(service: &'a S, batch_size: usize) -> Self {
        Self {
            service,
            batch_size: batch_size.max(1),
        }
    }

    /// Contiguous, order-preserving slices of at most `batch_size` words.
    pub fn batches<'w>(&self, words: &'w RankedWordList) -> impl Iterator<Item = &'w [RankedWord]> {
        words.words().chunks(self.batch_size)
    }

    pub fn batch_count(&self, words: &RankedWordList) -> usize {
        words.len().div_ceil(self.batch_size)
    }

    /// Resolves one batch. Ids come back in the service's order, which need not match the
    /// submitted words; forms the service does not know are simply absent.
    pub async fn resolve_batch(&self, batch: &[RankedWord]) -> Result<Vec<VocabularyId>> {
        let lookup = lookup_text(batch);
        let response = self.service.parse(&lookup).await?;

        let vocabulary = response.vocabulary.ok_or_else(|| Error::ServiceResponse {
            endpoint: JPDB_PARSE_PATH,
            reason: "response did not contain any vocabulary data".to_string(),
        })?;
        info!(
            submitted = batch.len(),
            resolved = vocabulary.len(),
            "parsed batch"
        );

        Ok(vocabulary)
    }
}

fn lookup_text(batch: &[RankedWord]) -> String {
    batch
        .iter()
        .map(|ranked| ranked.word.as_str())
        .collect::<Vec<&str>>()
        .join(" ")
}
