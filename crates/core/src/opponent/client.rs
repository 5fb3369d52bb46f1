//! HTTP client for the move-suggestion endpoint

use reqwest::Client;
use std::future::Future;
use tracing::debug;

use super::types::{BotMoveRequest, BotMoveResponse};
use crate::config::ControllerConfig;
use crate::error::{Error, Result};

/// Source of bot moves.
pub trait Opponent: Send + Sync + 'static {
    fn request_move(
        &self,
        request: &BotMoveRequest,
    ) -> impl Future<Output = Result<BotMoveResponse>> + Send;
}

/// [`Opponent`] reached over HTTP with a JSON POST.
pub struct RemoteOpponent {
    client: Client,
    endpoint: String,
}

impl RemoteOpponent {
    pub fn new(config: &ControllerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Opponent for RemoteOpponent {
    async fn request_move(&self, request: &BotMoveRequest) -> Result<BotMoveResponse> {
        debug!(endpoint = %self.endpoint, board = %request.board, "requesting bot move");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Opponent(format!(
                "HTTP error! status: {}",
                response.status()
            )));
        }

        let body: BotMoveResponse = response.json().await?;
        Ok(body)
    }
}
