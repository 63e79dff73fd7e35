use async_trait::async_trait;
use persona_core::{AppConfig, CoreError, RedditApiError, UserActivity};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const COMMENT_SEARCH_ENDPOINT: &str = "/reddit/comment/search/";
const SUBMISSION_SEARCH_ENDPOINT: &str = "/reddit/submission/search/";

/// Top-level shape of a search response. A missing `data` array reads as empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListing {
    #[serde(default)]
    pub data: Vec<CommentData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionListing {
    #[serde(default)]
    pub data: Vec<SubmissionData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
}

impl CommentData {
    /// `[Comment] <body> (<link>)`
    pub fn to_display_line(&self, permalink_base: &str) -> String {
        let body = self.body.as_deref().unwrap_or_default().trim();
        format!(
            "[Comment] {} ({})",
            body,
            permalink(permalink_base, self.permalink.as_deref())
        )
    }
}

impl SubmissionData {
    /// `[Post] <title> - <selftext> (<link>)`
    pub fn to_display_line(&self, permalink_base: &str) -> String {
        let title = self.title.as_deref().unwrap_or_default().trim();
        let selftext = self.selftext.as_deref().unwrap_or_default().trim();
        format!(
            "[Post] {} - {} ({})",
            title,
            selftext,
            permalink(permalink_base, self.permalink.as_deref())
        )
    }
}

fn permalink(base: &str, path: Option<&str>) -> String {
    format!("{}{}", base, path.unwrap_or_default())
}

/// Anything that can produce a user's flattened posts and comments.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch_user_activity(&self, username: &str) -> Result<UserActivity, CoreError>;
}

/// Client for the Pushshift-style comment/submission search API.
#[derive(Debug, Clone)]
pub struct PushshiftClient {
    http_client: Client,
    base_url: String,
    permalink_base: String,
    comment_page_size: usize,
    post_page_size: usize,
}

impl PushshiftClient {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(seconds) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url: config.search.base_url.trim_end_matches('/').to_string(),
            permalink_base: config.search.permalink_base.clone(),
            comment_page_size: config.search.comment_page_size,
            post_page_size: config.search.post_page_size,
        })
    }

    async fn make_request(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let start_time = Instant::now();

        info!("Making search API request: GET {}", endpoint);
        let response = match self.http_client.get(&url).query(query_params).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for GET {}: {}", endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        debug!(
            "GET {} returned {} in {:?}",
            endpoint,
            status,
            start_time.elapsed()
        );

        if status.is_success() {
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let status_code = status.as_u16();
        let error = match status_code {
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                RedditApiError::RateLimitExceeded { retry_after }
            }
            403 => RedditApiError::Forbidden {
                resource: endpoint.to_string(),
            },
            503 => RedditApiError::EndpointUnavailable {
                endpoint: endpoint.to_string(),
            },
            code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
            code => RedditApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                status_code: code,
            },
        };
        Err(CoreError::RedditApi(error))
    }

    async fn search<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        username: &str,
        size: usize,
    ) -> Result<T, CoreError> {
        let size = size.to_string();
        let response = self
            .make_request(endpoint, &[("author", username), ("size", size.as_str())])
            .await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse search response from {}: {}", endpoint, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse {} for {}: {}", endpoint, username, e),
            })
        })
    }

    pub async fn get_user_comments(&self, username: &str) -> Result<Vec<String>, CoreError> {
        let listing: CommentListing = self
            .search(COMMENT_SEARCH_ENDPOINT, username, self.comment_page_size)
            .await?;

        let comments: Vec<String> = listing
            .data
            .iter()
            .take(self.comment_page_size)
            .map(|comment| comment.to_display_line(&self.permalink_base))
            .collect();

        info!("Retrieved {} comments for u/{}", comments.len(), username);
        Ok(comments)
    }

    pub async fn get_user_posts(&self, username: &str) -> Result<Vec<String>, CoreError> {
        let listing: SubmissionListing = self
            .search(SUBMISSION_SEARCH_ENDPOINT, username, self.post_page_size)
            .await?;

        let posts: Vec<String> = listing
            .data
            .iter()
            .take(self.post_page_size)
            .map(|post| post.to_display_line(&self.permalink_base))
            .collect();

        info!("Retrieved {} posts for u/{}", posts.len(), username);
        Ok(posts)
    }
}

#[async_trait]
impl ActivitySource for PushshiftClient {
    async fn fetch_user_activity(&self, username: &str) -> Result<UserActivity, CoreError> {
        // Comments first, matching the request order of the search API usage.
        let comments = self.get_user_comments(username).await?;
        let posts = self.get_user_posts(username).await?;
        Ok(UserActivity::new(posts, comments))
    }
}
