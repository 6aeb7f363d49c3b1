//! Typed HTTP client for the listing API.

use crate::adapters::http::types::{DeleteResponse, ErrorResponse, HealthResponse, MutationResponse};
use crate::domain::model::{Listing, ListingId, ListingUpdate, NewListing};
use crate::domain::query::ListingQueryParams;
use crate::utils::error::{ListingError, Result};
use crate::utils::validation::{validate_url, HTTP_URL_SCHEMES};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct ListingApiClient {
    base_url: Url,
    client: Client,
}

impl ListingApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        validate_url("base_url", base_url, HTTP_URL_SCHEMES)?;
        let mut base_url = Url::parse(base_url).map_err(|e| ListingError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        // 確保 join 時保留既有路徑
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ListingError::ConfigError {
                message: format!("Cannot build URL for {}: {}", path, e),
            })
    }

    fn listing_url(&self, id: &ListingId) -> Result<Url> {
        let mut url = self.endpoint("api/listings")?;
        url.path_segments_mut()
            .map_err(|_| ListingError::ConfigError {
                message: "Base URL cannot carry a path".to_string(),
            })?
            .push(id.as_str());
        Ok(url)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.client.get(self.endpoint("api/health")?).send().await?;
        decode(response).await
    }

    pub async fn create(&self, listing: &NewListing) -> Result<ListingId> {
        tracing::debug!("POST listing {}", listing.unit_name);
        let response = self
            .client
            .post(self.endpoint("api/listings")?)
            .json(listing)
            .send()
            .await?;
        let body: MutationResponse = decode(response).await?;
        Ok(body.id)
    }

    pub async fn update(&self, id: &ListingId, fields: &ListingUpdate) -> Result<ListingId> {
        let response = self
            .client
            .patch(self.listing_url(id)?)
            .json(fields)
            .send()
            .await?;
        let body: MutationResponse = decode(response).await?;
        Ok(body.id)
    }

    pub async fn delete(&self, id: &ListingId) -> Result<String> {
        let response = self.client.delete(self.listing_url(id)?).send().await?;
        let body: DeleteResponse = decode(response).await?;
        Ok(body.message)
    }

    pub async fn get(&self, id: &ListingId) -> Result<Listing> {
        let response = self.client.get(self.listing_url(id)?).send().await?;
        decode(response).await
    }

    pub async fn search(&self, params: &ListingQueryParams) -> Result<Vec<Listing>> {
        let response = self
            .client
            .get(self.endpoint("api/listings")?)
            .query(params)
            .send()
            .await?;
        decode(response).await
    }
}

/// Decodes a success body, or turns the structured failure body into `ListingError::Api`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let error = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => ListingError::Api {
            status: status.as_u16(),
            code: body.code,
            message: body.message,
        },
        Err(_) => ListingError::Api {
            status: status.as_u16(),
            code: "UNEXPECTED_RESPONSE".to_string(),
            message: if text.is_empty() {
                status.to_string()
            } else {
                text
            },
        },
    };
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_base_url() {
        assert!(ListingApiClient::new("ftp://example.com").is_err());
        assert!(ListingApiClient::new("").is_err());
    }

    #[test]
    fn test_urls_keep_base_path() {
        let client = ListingApiClient::new("http://localhost:3000/estate").unwrap();
        assert_eq!(
            client.endpoint("api/listings").unwrap().as_str(),
            "http://localhost:3000/estate/api/listings"
        );
        assert_eq!(
            client.listing_url(&ListingId::from("abc123")).unwrap().as_str(),
            "http://localhost:3000/estate/api/listings/abc123"
        );
    }
}
