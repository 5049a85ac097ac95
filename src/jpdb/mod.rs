pub mod mock;
pub mod models;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use models::{
    AddVocabularyRequest, CreateDeckRequest, CreateDeckResponse, JpdbConfiguration,
    ListDecksRequest, ListDecksResponse, ParseRequest, ParseResponse, VocabularyId,
    JPDB_ADD_VOCABULARY_PATH, JPDB_CREATE_DECK_PATH, JPDB_LIST_DECKS_PATH, JPDB_PARSE_PATH,
};

/// The four remote operations the pipeline needs from the deck service.
#[async_trait]
pub trait DeckService: Send + Sync {
    async fn create_empty_deck(&self, name: &str, position: u32) -> Result<CreateDeckResponse>;

    async fn parse(&self, text: &str) -> Result<ParseResponse>;

    async fn add_vocabulary(&self, deck_id: u64, vocabulary: &[VocabularyId]) -> Result<()>;

    async fn list_user_decks(&self) -> Result<ListDecksResponse>;
}

pub struct JpdbClient {
    config: JpdbConfiguration,
    client: Client,
}

impl JpdbClient {
    pub fn new(config: JpdbConfiguration) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    // Every endpoint is a bearer-authenticated JSON POST.
    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> Result<reqwest::Response> {
        debug!(endpoint, "posting to jpdb");
        let response = self
            .client
            .post(format!("{}{}", self.config.api_url, endpoint))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|source| Error::ServiceRequest { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ServiceStatus {
                endpoint,
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn post_json<B, R>(&self, endpoint: &'static str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.post(endpoint, body).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| Error::ServiceRequest { endpoint, source })?;

        serde_json::from_slice(&bytes).map_err(|e| Error::ServiceResponse {
            endpoint,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl DeckService for JpdbClient {
    async fn create_empty_deck(&self, name: &str, position: u32) -> Result<CreateDeckResponse> {
        let body = CreateDeckRequest {
            name: name.to_string(),
            position,
        };
        self.post_json(JPDB_CREATE_DECK_PATH, &body).await
    }

    async fn parse(&self, text: &str) -> Result<ParseResponse> {
        let body = ParseRequest::new(text.to_string());
        self.post_json(JPDB_PARSE_PATH, &body).await
    }

    async fn add_vocabulary(&self, deck_id: u64, vocabulary: &[VocabularyId]) -> Result<()> {
        let body = AddVocabularyRequest {
            id: deck_id,
            vocabulary: vocabulary.to_vec(),
        };
        // The response carries no payload.
        self.post(JPDB_ADD_VOCABULARY_PATH, &body).await?;
        Ok(())
    }

    async fn list_user_decks(&self) -> Result<ListDecksResponse> {
        self.post_json(JPDB_LIST_DECKS_PATH, &ListDecksRequest::default())
            .await
    }
}
