use std::fmt;

use serde::{Deserialize, Serialize};

pub const JPDB_API_URL: &str = "https://jpdb.io/api/v1";
pub const JPDB_MOCK_API_URL: &str = "http://127.0.0.1:3030";

pub const JPDB_CREATE_DECK_PATH: &str = "/deck/create-empty";
pub const JPDB_PARSE_PATH: &str = "/parse";
pub const JPDB_ADD_VOCABULARY_PATH: &str = "/deck/add-vocabulary";
pub const JPDB_LIST_DECKS_PATH: &str = "/list-user-decks";

pub const VOCABULARY_FIELDS: [&str; 2] = ["vid", "sid"];
pub const DECK_FIELDS: [&str; 4] = ["id", "name", "vocabulary_count", "vocabulary_known_coverage"];

/// A `[vid, sid]` pair identifying one dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VocabularyId(pub u64, pub u64);

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,
    pub position: u32,
}

// Fields are optional: a missing key must be detected, not assumed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateDeckResponse {
    pub id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseRequest {
    pub text: String,
    pub token_fields: Vec<String>,
    pub vocabulary_fields: Vec<String>,
}

impl ParseRequest {
    pub fn new(text: String) -> Self {
        Self {
            text,
            token_fields: Vec::new(),
            vocabulary_fields: VOCABULARY_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ParseResponse {
    pub vocabulary: Option<Vec<VocabularyId>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddVocabularyRequest {
    pub id: u64,
    pub vocabulary: Vec<VocabularyId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListDecksRequest {
    pub fields: Vec<String>,
}

impl Default for ListDecksRequest {
    fn default() -> Self {
        Self {
            fields: DECK_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListDecksResponse {
    pub decks: Option<Vec<Deck>>,
}

/// A deck as listed by `list-user-decks`, serialized as
/// `[id, name, vocabulary_count, vocabulary_known_coverage]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DeckRow", into = "DeckRow")]
pub struct Deck {
    pub id: u64,
    pub name: String,
    pub vocabulary_count: u64,
    pub known_coverage: f64,
}

#[derive(Serialize, Deserialize)]
struct DeckRow(u64, String, u64, Option<f64>);

impl From<DeckRow> for Deck {
    fn from(DeckRow(id, name, vocabulary_count, known_coverage): DeckRow) -> Self {
        Self {
            id,
            name,
            vocabulary_count,
            known_coverage: known_coverage.unwrap_or(0.0),
        }
    }
}

impl From<Deck> for DeckRow {
    fn from(deck: Deck) -> Self {
        DeckRow(
            deck.id,
            deck.name,
            deck.vocabulary_count,
            Some(deck.known_coverage),
        )
    }
}

#[derive(Clone)]
pub struct JpdbConfiguration {
    pub api_key: String,
    pub api_url: String,
}

impl fmt::Debug for JpdbConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JpdbConfiguration")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl JpdbConfiguration {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: JPDB_API_URL.to_string(),
        }
    }

    pub fn with_url(api_key: String, api_url: String) -> Self {
        Self { api_key, api_url }
    }
}
