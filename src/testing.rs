// In-memory doubles for the deck service and the word counter.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{Error, Result};
use crate::frequency::{FrequencyTable, WordCounter};
use crate::jpdb::models::{
    CreateDeckResponse, Deck, ListDecksResponse, ParseResponse, VocabularyId, JPDB_LIST_DECKS_PATH,
    JPDB_PARSE_PATH,
};
use crate::jpdb::DeckService;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { name: String, position: u32 },
    Parse(String),
    Add { deck_id: u64, count: usize },
    List,
}

#[derive(Default)]
struct State {
    decks: Vec<Deck>,
    words: HashMap<String, VocabularyId>,
    calls: Vec<Call>,
    next_id: u64,
}

#[derive(Default)]
pub struct FakeDeckService {
    state: Mutex<State>,
    no_create_id: bool,
    no_parse_vocabulary: bool,
    hide_created: bool,
    fail_parse_call: Option<usize>,
    fail_listing: bool,
}

impl FakeDeckService {
    pub fn new() -> Self {
        let service = Self::default();
        service.state.lock().unwrap().next_id = 100;
        service
    }

    pub fn with_deck(self, id: u64, name: &str) -> Self {
        self.state.lock().unwrap().decks.push(Deck {
            id,
            name: name.to_string(),
            vocabulary_count: 10,
            known_coverage: 50.0,
        });
        self
    }

    pub fn without_create_id(mut self) -> Self {
        self.no_create_id = true;
        self
    }

    pub fn without_parse_vocabulary(mut self) -> Self {
        self.no_parse_vocabulary = true;
        self
    }

    pub fn hiding_created_decks(mut self) -> Self {
        self.hide_created = true;
        self
    }

    /// The n-th parse call (counting from 1) answers with a server error.
    pub fn failing_parse_call(mut self, n: usize) -> Self {
        self.fail_parse_call = Some(n);
        self
    }

    pub fn failing_deck_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn parse_requests(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Parse(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn add_calls(&self) -> Vec<(u64, usize)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Add { deck_id, count } => Some((deck_id, count)),
                _ => None,
            })
            .collect()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DeckService for FakeDeckService {
    async fn create_empty_deck(&self, name: &str, position: u32) -> Result<CreateDeckResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            name: name.to_string(),
            position,
        });
        if self.no_create_id {
            return Ok(CreateDeckResponse { id: None });
        }

        let id = state.next_id;
        state.next_id += 1;
        if !self.hide_created {
            state.decks.push(Deck {
                id,
                name: name.to_string(),
                vocabulary_count: 0,
                known_coverage: 0.0,
            });
        }
        Ok(CreateDeckResponse { id: Some(id) })
    }

    async fn parse(&self, text: &str) -> Result<ParseResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Parse(text.to_string()));

        let parse_calls = state
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Parse(_)))
            .count();
        if self.fail_parse_call == Some(parse_calls) {
            return Err(Error::ServiceStatus {
                endpoint: JPDB_PARSE_PATH,
                status: StatusCode::TOO_MANY_REQUESTS,
                body: "too many requests".to_string(),
            });
        }
        if self.no_parse_vocabulary {
            return Ok(ParseResponse { vocabulary: None });
        }

        let mut vocabulary = Vec::new();
        for word in text.split_whitespace() {
            let next = state.words.len() as u64;
            let id = *state
                .words
                .entry(word.to_string())
                .or_insert(VocabularyId(next, 0));
            vocabulary.push(id);
        }
        // The real service does not answer in submission order.
        vocabulary.reverse();

        Ok(ParseResponse {
            vocabulary: Some(vocabulary),
        })
    }

    async fn add_vocabulary(&self, deck_id: u64, vocabulary: &[VocabularyId]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Add {
            deck_id,
            count: vocabulary.len(),
        });
        if let Some(deck) = state.decks.iter_mut().find(|deck| deck.id == deck_id) {
            deck.vocabulary_count += vocabulary.len() as u64;
        }
        Ok(())
    }

    async fn list_user_decks(&self) -> Result<ListDecksResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List);
        if self.fail_listing {
            return Err(Error::ServiceStatus {
                endpoint: JPDB_LIST_DECKS_PATH,
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".to_string(),
            });
        }
        Ok(ListDecksResponse {
            decks: Some(state.decks.clone()),
        })
    }
}

pub const TOKENIZER_FAULT: &str = "@@fault@@";

/// Splits on whitespace. Fails on text containing [`TOKENIZER_FAULT`].
pub struct WhitespaceCounter;

impl WordCounter for WhitespaceCounter {
    fn count_words(&self, text: &str) -> Result<FrequencyTable> {
        if text.contains(TOKENIZER_FAULT) {
            return Err(Error::Tokenization("segmentation fault".to_string()));
        }
        Ok(text.split_whitespace().collect())
    }
}
