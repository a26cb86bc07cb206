//! Game service REST client
//!
//! Explicit game actions (start, guess, fetch) go over plain HTTP; the
//! gesture path does not pass through here. Every successful response
//! body is a full [`GameSnapshot`] and replaces local state wholesale.

use crate::game::types::{GameSnapshot, GuessDirection};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default game service base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/game";

/// Request timeout for game service calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct GuessRequest {
    guess: &'static str,
}

/// REST client for the authoritative game service.
pub struct GameClient {
    client: Client,
    base_url: String,
}

impl GameClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> crate::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a new game. The returned snapshot carries the new game id.
    pub async fn start_game(&self) -> crate::Result<GameSnapshot> {
        let url = format!("{}/start", self.base_url);
        debug!(%url, "Starting new game");
        let response = self.client.post(&url).send().await?;
        Self::parse(response).await
    }

    /// Submit an explicit higher/lower guess for a game.
    pub async fn make_guess(
        &self,
        game_id: &str,
        direction: GuessDirection,
    ) -> crate::Result<GameSnapshot> {
        let url = format!("{}/{}/guess", self.base_url, game_id);
        debug!(%url, direction = direction.as_str(), "Submitting guess");
        let response = self
            .client
            .post(&url)
            .json(&GuessRequest {
                guess: direction.as_str(),
            })
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Fetch the current state of a game.
    pub async fn get_game(&self, game_id: &str) -> crate::Result<GameSnapshot> {
        let url = format!("{}/{}", self.base_url, game_id);
        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> crate::Result<GameSnapshot> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::UpstreamService(format!(
                "{status}: {body}"
            )));
        }
        Ok(response.json::<GameSnapshot>().await?)
    }
}
