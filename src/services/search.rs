use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::ServiceError;

const SERVICE: &str = "serper search";

/// One organic web result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Live web search, ranked best first.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError>;
}

#[async_trait]
pub trait GroceryIndex: Send + Sync {
    async fn search(&self, product: &str, location: &str) -> Result<Vec<ShoppingItem>, ServiceError>;
}

#[async_trait]
pub trait PlacesIndex: Send + Sync {
    async fn search(&self, cuisine: &str, location: &str) -> Result<Vec<Place>, ServiceError>;
}

#[derive(Deserialize)]
struct OrganicResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct ShoppingResponse {
    #[serde(default)]
    shopping: Vec<ShoppingItem>,
}

#[derive(Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    places: Vec<Place>,
}

/// Serper.dev client backing web, shopping and places search.
/// Without an API key every search yields an empty list.
#[derive(Clone)]
pub struct SerperClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    default_location: String,
}

impl SerperClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, default_location: impl Into<String>, timeout: Duration) -> Self {
        if api_key.is_none() {
            warn!("SERPER_API_KEY not set; web, shopping and places search are disabled");
        }
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            default_location: default_location.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.serper_base_url.clone(),
            config.serper_api_key.clone(),
            format!("{}, UK", config.location),
            config.http_timeout,
        )
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, payload: serde_json::Value) -> Result<Option<T>, ServiceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        debug!(endpoint, "serper request");
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, endpoint))
            .header("X-API-KEY", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| ServiceError::Transport { service: SERVICE, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { service: SERVICE, status: status.as_u16(), body });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| ServiceError::Decode { service: SERVICE, reason: e.to_string() })
    }
}

#[async_trait]
impl WebSearch for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        let payload = json!({ "q": query, "location": self.default_location, "gl": "gb" });
        let resp: Option<OrganicResponse> = self.post("search", payload).await?;
        Ok(resp.map(|r| r.organic).unwrap_or_default())
    }
}

#[async_trait]
impl GroceryIndex for SerperClient {
    async fn search(&self, product: &str, location: &str) -> Result<Vec<ShoppingItem>, ServiceError> {
        let payload = json!({ "q": product, "location": location, "gl": "gb" });
        let resp: Option<ShoppingResponse> = self.post("shopping", payload).await?;
        Ok(resp.map(|r| r.shopping).unwrap_or_default())
    }
}

#[async_trait]
impl PlacesIndex for SerperClient {
    async fn search(&self, cuisine: &str, location: &str) -> Result<Vec<Place>, ServiceError> {
        let payload = json!({ "q": format!("{} in {}", cuisine, location), "gl": "gb" });
        let resp: Option<PlacesResponse> = self.post("places", payload).await?;
        Ok(resp.map(|r| r.places).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_key_means_no_results() {
        let client = SerperClient::new("http://127.0.0.1:9", None, "London, UK", Duration::from_secs(1));
        assert!(WebSearch::search(&client, "kale").await.unwrap().is_empty());
        assert!(GroceryIndex::search(&client, "kale", "London").await.unwrap().is_empty());
        assert!(PlacesIndex::search(&client, "vegan", "London").await.unwrap().is_empty());
    }

    #[test]
    fn places_tolerate_missing_fields() {
        let raw = r#"{"places":[{"title":"Mildreds"},{"rating":4.5,"address":"Soho"}]}"#;
        let parsed: PlacesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.places.len(), 2);
        assert_eq!(parsed.places[0].rating, None);
        assert_eq!(parsed.places[1].address.as_deref(), Some("Soho"));
    }
}
