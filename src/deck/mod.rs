pub mod batch;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::epub::extract_text;
use crate::error::{DocumentError, Error, Stage};
use crate::frequency::{build_frequency_table, RankedWordList, WordCounter};
use crate::jpdb::models::Deck;
use crate::jpdb::DeckService;
use batch::VocabularyBatcher;

pub use batch::DEFAULT_BATCH_SIZE;

/// Turns one epub into a populated deck on the service.
///
/// Order per document: extract, count, create, add each batch, verify. Any failure aborts the
/// document; a deck that was already created is left on the service as it is.
pub struct DeckSynchronizer<'a, S: ?Sized, C: ?Sized> {
    service: &'a S,
    counter: &'a C,
    batch_size: usize,
}

impl<'a, S, C> DeckSynchronizer<'a, S, C>
where
    S: DeckService + ?Sized,
    C: WordCounter + ?Sized,
{
    pub fn new(service: &'a S, counter: &'a C, batch_size: usize) -> Self {
        Self {
            service,
            counter,
            batch_size,
        }
    }

    pub async fn create_deck_from_epub(
        &self,
        epub_path: &Path,
        deck_name: &str,
        deck_position: u32,
    ) -> Result<Deck, DocumentError> {
        let fail = |stage| move |source| DocumentError::new(epub_path, stage, source);

        // The text blob is dropped as soon as its table exists.
        let words = {
            let text = extract_text(epub_path).map_err(fail(Stage::Extract))?;
            info!(document = %epub_path.display(), chars = text.chars().count(), "read epub");

            let table = build_frequency_table(self.counter, &text).map_err(fail(Stage::Tokenize))?;
            info!(unique_words = table.len(), "counted words");
            RankedWordList::from_table(table)
        };

        let deck_id = self
            .create(deck_name, deck_position)
            .await
            .map_err(fail(Stage::Create))?;

        self.populate(deck_id, &words)
            .await
            .map_err(fail(Stage::Populate))?;

        self.verify(deck_id).await.map_err(fail(Stage::Verify))
    }

    async fn create(&self, deck_name: &str, deck_position: u32) -> Result<u64, Error> {
        info!(name = deck_name, position = deck_position, "creating deck");
        let response = self
            .service
            .create_empty_deck(deck_name, deck_position)
            .await?;

        let id = response.id.ok_or_else(|| Error::DeckCreation {
            name: deck_name.to_string(),
        })?;
        info!(name = deck_name, deck = id, "created deck");
        Ok(id)
    }

    async fn populate(&self, deck_id: u64, words: &RankedWordList) -> Result<(), Error> {
        let batcher = VocabularyBatcher::new(self.service, self.batch_size);
        let total = batcher.batch_count(words);

        let mut processed = 0;
        for (index, batch) in batcher.batches(words).enumerate() {
            info!(
                batch = index + 1,
                of = total,
                "fetching ids for words {} to {}",
                processed,
                processed + batch.len()
            );
            let vocabulary = batcher.resolve_batch(batch).await?;
            processed += batch.len();

            if vocabulary.is_empty() {
                warn!(batch = index + 1, "no word in batch was recognised");
                continue;
            }

            debug!(deck = deck_id, count = vocabulary.len(), "adding vocabulary");
            self.service.add_vocabulary(deck_id, &vocabulary).await?;
        }

        Ok(())
    }

    async fn verify(&self, deck_id: u64) -> Result<Deck, Error> {
        let decks = list_decks(self.service).await?;

        decks
            .into_iter()
            .find(|deck| deck.id == deck_id)
            .ok_or(Error::DeckVerification { id: deck_id })
    }
}

/// All of the user's decks. A response without a deck list is a service fault.
pub async fn list_decks<S>(service: &S) -> Result<Vec<Deck>, Error>
where
    S: DeckService + ?Sized,
{
    let response = service.list_user_decks().await?;
    let decks = response.decks.ok_or_else(|| Error::ServiceResponse {
        endpoint: crate::jpdb::models::JPDB_LIST_DECKS_PATH,
        reason: "response did not contain a deck list".to_string(),
    })?;
    debug!(count = decks.len(), "retrieved user decks");
    Ok(decks)
}
