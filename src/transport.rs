use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::config::Config;
use crate::error::TransportError;
use crate::models::SearchQuery;

/// Source of raw feed bytes for a query.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Makes a single attempt; no retries.
    async fn fetch_raw(&self, query: &SearchQuery) -> Result<Vec<u8>, TransportError>;
}

/// Fetches the public photo feed over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// `<endpoint>?format=json&nojsoncallback=1&tags=<query>` with the query
    /// form-encoded.
    pub fn request_url(&self, query: &SearchQuery) -> Result<Url, TransportError> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("format", "json"),
                ("nojsoncallback", "1"),
                ("tags", query.as_str()),
            ],
        )?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidEndpoint(self.endpoint.clone()));
        }

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_raw(&self, query: &SearchQuery) -> Result<Vec<u8>, TransportError> {
        let url = self.request_url(query)?;
        tracing::debug!(%url, "requesting photo feed");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::BadResponse(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(endpoint: &str) -> HttpTransport {
        let config = Config {
            endpoint: endpoint.to_string(),
            ..Config::default()
        };
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_request_url_layout() {
        let transport = transport("https://api.flickr.com/services/feeds/photos_public.gne");
        let url = transport.request_url(&SearchQuery::parse("hellcat").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.flickr.com/services/feeds/photos_public.gne?format=json&nojsoncallback=1&tags=hellcat"
        );
    }

    #[test]
    fn test_query_is_encoded() {
        let transport = transport("https://example.com/feed");
        let url = transport
            .request_url(&SearchQuery::parse("cats & dogs#1?").unwrap())
            .unwrap();

        assert_eq!(url.query(), Some("format=json&nojsoncallback=1&tags=cats+%26+dogs%231%3F"));
        let tags: Vec<_> = url
            .query_pairs()
            .filter(|(k, _)| k == "tags")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(tags, vec!["cats & dogs#1?"]);
    }

    #[test]
    fn test_invalid_endpoint() {
        let query = SearchQuery::parse("cats").unwrap();

        let result = transport("not a url").request_url(&query);
        assert!(matches!(result, Err(TransportError::InvalidEndpoint(_))));

        let result = transport("mailto:someone@example.com").request_url(&query);
        assert!(matches!(result, Err(TransportError::InvalidEndpoint(_))));

        let result = transport("ftp://example.com/feed").request_url(&query);
        assert!(matches!(result, Err(TransportError::InvalidEndpoint(_))));
    }
}
