use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} is not a readable epub container: {source}", .path.display())]
    ContainerFormat {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("entry {entry} is not valid UTF-8: {source}")]
    Decode {
        entry: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("tokenizer fault: {0}")]
    Tokenization(String),

    #[error("request to {endpoint} failed: {source}")]
    ServiceRequest {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered {status}: {body}")]
    ServiceStatus {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response from {endpoint}: {reason}")]
    ServiceResponse {
        endpoint: &'static str,
        reason: String,
    },

    #[error("the service did not return an id for new deck '{name}'")]
    DeckCreation { name: String },

    #[error("deck {id} was created but is missing from the deck listing")]
    DeckVerification { id: u64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Where a document's pipeline was when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    // Deck name and position, before any document work.
    Prepare,
    Extract,
    Tokenize,
    Create,
    Populate,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Prepare => "preparing deck",
            Stage::Extract => "extracting text",
            Stage::Tokenize => "counting words",
            Stage::Create => "creating deck",
            Stage::Populate => "adding vocabulary",
            Stage::Verify => "verifying deck",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{} failed while {stage}: {source}", .document.display())]
pub struct DocumentError {
    pub document: PathBuf,
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl DocumentError {
    pub fn new(document: impl Into<PathBuf>, stage: Stage, source: Error) -> Self {
        Self {
            document: document.into(),
            stage,
            source,
        }
    }
}
