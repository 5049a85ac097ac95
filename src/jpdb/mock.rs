// A local stand-in for the jpdb API, used by the --test flag, the mock_server binary and
// the integration tests. Decks live in memory for the lifetime of the server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::info;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

use super::models::{
    AddVocabularyRequest, CreateDeckRequest, CreateDeckResponse, Deck, ListDecksResponse,
    ParseRequest, ParseResponse, VocabularyId,
};
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    error_message: String,
}

#[derive(Debug)]
struct MockDeck {
    id: u64,
    name: String,
    vocabulary: Vec<VocabularyId>,
}

#[derive(Debug)]
struct MockState {
    api_key: String,
    decks: Vec<MockDeck>,
    words: HashMap<String, VocabularyId>,
    next_deck_id: u64,
}

impl MockState {
    fn new(api_key: String) -> Self {
        Self {
            api_key,
            decks: Vec::new(),
            words: HashMap::new(),
            next_deck_id: 1,
        }
    }

    fn authorized(&self, header: &Option<String>) -> bool {
        header.as_deref() == Some(format!("Bearer {}", self.api_key).as_str())
    }

    // Purely numeric tokens are not in the dictionary.
    fn lookup(&mut self, word: &str) -> Option<VocabularyId> {
        if word.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let next_vid = 1_000_000 + self.words.len() as u64;
        Some(*self
            .words
            .entry(word.to_string())
            .or_insert(VocabularyId(next_vid, 1)))
    }
}

type SharedState = Arc<Mutex<MockState>>;

fn error_reply(status: StatusCode, error: &'static str, message: &str) -> Response {
    let body = ErrorResponse {
        error,
        error_message: message.to_string(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn forbidden() -> Response {
    error_reply(StatusCode::FORBIDDEN, "bad_key", "the API key is invalid")
}

fn create_deck(header: Option<String>, request: CreateDeckRequest, state: SharedState) -> Response {
    let Ok(mut state) = state.lock() else {
        return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "internal", "poisoned");
    };
    if !state.authorized(&header) {
        return forbidden();
    }
    info!(name = %request.name, position = request.position, "mock: create deck");

    let id = state.next_deck_id;
    state.next_deck_id += 1;

    let position = (request.position as usize).min(state.decks.len());
    state.decks.insert(
        position,
        MockDeck {
            id,
            name: request.name,
            vocabulary: Vec::new(),
        },
    );

    warp::reply::json(&CreateDeckResponse { id: Some(id) }).into_response()
}

fn parse(header: Option<String>, request: ParseRequest, state: SharedState) -> Response {
    let Ok(mut state) = state.lock() else {
        return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "internal", "poisoned");
    };
    if !state.authorized(&header) {
        return forbidden();
    }

    let mut vocabulary: Vec<VocabularyId> = Vec::new();
    for word in request.text.split_whitespace() {
        if let Some(id) = state.lookup(word) {
            if !vocabulary.contains(&id) {
                vocabulary.push(id);
            }
        }
    }
    info!(resolved = vocabulary.len(), "mock: parse");

    warp::reply::json(&ParseResponse {
        vocabulary: Some(vocabulary),
    })
    .into_response()
}

fn add_vocabulary(
    header: Option<String>,
    request: AddVocabularyRequest,
    state: SharedState,
) -> Response {
    let Ok(mut state) = state.lock() else {
        return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "internal", "poisoned");
    };
    if !state.authorized(&header) {
        return forbidden();
    }

    let Some(deck) = state.decks.iter_mut().find(|deck| deck.id == request.id) else {
        return error_reply(StatusCode::BAD_REQUEST, "bad_deck", "deck not found");
    };
    for id in request.vocabulary {
        if !deck.vocabulary.contains(&id) {
            deck.vocabulary.push(id);
        }
    }
    info!(deck = deck.id, size = deck.vocabulary.len(), "mock: add vocabulary");

    warp::reply::json(&serde_json::json!({})).into_response()
}

fn list_decks(header: Option<String>, state: SharedState) -> Response {
    let Ok(state) = state.lock() else {
        return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "internal", "poisoned");
    };
    if !state.authorized(&header) {
        return forbidden();
    }

    let decks = state
        .decks
        .iter()
        .map(|deck| Deck {
            id: deck.id,
            name: deck.name.clone(),
            vocabulary_count: deck.vocabulary.len() as u64,
            known_coverage: 0.0,
        })
        .collect();

    warp::reply::json(&ListDecksResponse { decks: Some(decks) }).into_response()
}

// Sets up a mock server on `addr` that emulates the jpdb API.
// Returns the bound address and a oneshot::Sender<()> to signal the server to shut down.
pub async fn run_mock_server(
    addr: SocketAddr,
    api_key: &str,
) -> Result<(SocketAddr, oneshot::Sender<()>)> {
    let state: SharedState = Arc::new(Mutex::new(MockState::new(api_key.to_string())));
    let with_state = warp::any().map(move || state.clone());
    let auth = warp::header::optional::<String>("authorization");

    let create_route = warp::post()
        .and(warp::path!("deck" / "create-empty"))
        .and(auth.clone())
        .and(warp::body::json::<CreateDeckRequest>())
        .and(with_state.clone())
        .map(create_deck);

    let parse_route = warp::post()
        .and(warp::path!("parse"))
        .and(auth.clone())
        .and(warp::body::json::<ParseRequest>())
        .and(with_state.clone())
        .map(parse);

    let add_route = warp::post()
        .and(warp::path!("deck" / "add-vocabulary"))
        .and(auth.clone())
        .and(warp::body::json::<AddVocabularyRequest>())
        .and(with_state.clone())
        .map(add_vocabulary);

    let list_route = warp::post()
        .and(warp::path!("list-user-decks"))
        .and(auth)
        .and(with_state)
        .map(list_decks);

    let routes = create_route.or(parse_route).or(add_route).or(list_route);

    let (tx, rx) = oneshot::channel();

    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            rx.await.ok();
        })
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;

    info!(address = %bound, "mock jpdb server running");
    tokio::spawn(server);

    Ok((bound, tx))
}
