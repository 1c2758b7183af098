//! Chapter banks fetched over HTTP.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::instrument;

use mockexam_core::error::LoadError;
use mockexam_core::model::ChapterRef;
use mockexam_core::traits::QuestionSource;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches `GET {base_url}/{chapter}`.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, chapter: &ChapterRef) -> String {
        format!("{}/{}", self.base_url, chapter.as_str().trim_start_matches('/'))
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch(&self, chapter: &ChapterRef) -> Result<String, LoadError> {
        let response = self
            .client
            .get(self.url_for(chapter))
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("request timed out after {DEFAULT_TIMEOUT_SECS}s")
                } else if e.is_connect() {
                    format!("server not reachable at {}", self.base_url)
                } else {
                    e.to_string()
                };
                LoadError::unavailable(chapter.clone(), message)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::status(chapter.clone(), status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| LoadError::unavailable(chapter.clone(), format!("failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockexam_core::error::LoadCause;
    use mockexam_core::source::load_pools;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bank(prefix: &str) -> serde_json::Value {
        serde_json::json!({
            "chapterId": prefix,
            "title": format!("Chapter {prefix}"),
            "questions": [
                {"questionId": format!("{prefix}-1"), "statement": "One?", "choices": ["a", "b"], "correctIndex": 0},
                {"questionId": format!("{prefix}-2"), "statement": "Two?", "choices": ["a", "b"], "correctIndex": 1}
            ]
        })
    }

    #[tokio::test]
    async fn fetches_chapter_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/banks/chapt1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(bank("1")))
            .mount(&server)
            .await;

        let source = HttpSource::new(&format!("{}/banks/", server.uri())).unwrap();
        let pools = load_pools(&source, &[ChapterRef::new("chapt1.json")])
            .await
            .unwrap();

        assert_eq!(pools[0].id, "1");
        assert_eq!(pools[0].len(), 2);
    }

    #[tokio::test]
    async fn non_success_status_names_the_chapter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chapt3.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpSource::new(&server.uri()).unwrap();
        let err = source
            .fetch(&ChapterRef::new("chapt3.json"))
            .await
            .unwrap_err();

        assert_eq!(err.chapter.as_str(), "chapt3.json");
        assert_eq!(err.cause, LoadCause::Status(404));
    }

    #[tokio::test]
    async fn server_error_stops_loading() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chapt1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(bank("1")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chapt2.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chapt3.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(bank("3")))
            .expect(0)
            .mount(&server)
            .await;

        let source = HttpSource::new(&server.uri()).unwrap();
        let err = load_pools(
            &source,
            &[
                ChapterRef::new("chapt1.json"),
                ChapterRef::new("chapt2.json"),
                ChapterRef::new("chapt3.json"),
            ],
        )
        .await
        .unwrap_err();

        assert_eq!(err.chapter.as_str(), "chapt2.json");
        assert_eq!(err.cause, LoadCause::Status(503));
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        // Nothing listens on port 9 of localhost.
        let source = HttpSource::new("http://127.0.0.1:9").unwrap();
        let err = source
            .fetch(&ChapterRef::new("chapt1.json"))
            .await
            .unwrap_err();
        assert!(matches!(err.cause, LoadCause::Unavailable(_)));
    }
}
