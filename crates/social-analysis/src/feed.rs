use async_trait::async_trait;
use risk_core::AnalysisError;
use serde::Deserialize;
use solana_client::http::{error_for_status, RateLimiter, Transport};
use std::time::Duration;

use crate::{SocialFeed, SocialPost};

const MAX_POSTS: usize = 200;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    posts: Vec<SocialPost>,
}

/// Social feed served over HTTP: `GET {url}?q={token}&limit=N` returning `{"posts": [...]}`.
pub struct HttpSocialFeed {
    transport: Transport,
    url: String,
}

impl HttpSocialFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport: Transport::new(timeout, RateLimiter::new(60, Duration::from_secs(60))),
            url: url.into(),
        }
    }

    /// Override the pause between 429 retries.
    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.transport = self.transport.with_retry_wait(wait);
        self
    }
}

#[async_trait]
impl SocialFeed for HttpSocialFeed {
    async fn fetch_posts(&self, token: &str) -> Result<Vec<SocialPost>, AnalysisError> {
        let limit = MAX_POSTS.to_string();
        let request = self
            .transport
            .client()
            .get(&self.url)
            .query(&[("q", token), ("limit", limit.as_str())]);
        let response = error_for_status(self.transport.send(request).await?).await?;

        let body: FeedResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(format!("social feed: {}", e)))?;

        let mut posts = body.posts;
        posts.truncate(MAX_POSTS);
        Ok(posts)
    }
}
