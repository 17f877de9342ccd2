use crate::upload::{error_message_from_body, AuthContext, UploadError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::debug;

/// Ids are integers in the database but strings everywhere in the client.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhotoLocation {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub event_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct AccessCheck {
    #[serde(default, rename = "hasAccess")]
    has_access: bool,
}

/// Read-only access to the events a photographer can upload to.
#[derive(Clone)]
pub struct EventsClient {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AuthContext>,
}

impl EventsClient {
    pub fn new(base_url: impl Into<String>, auth: Arc<dyn AuthContext>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Whether the signed-in account is an active photographer on any event.
    pub async fn check_access(&self) -> Result<bool, UploadError> {
        let check: AccessCheck = self.get_json("/api/photographer/check-access").await?;
        Ok(check.has_access)
    }

    pub async fn photographer_events(&self) -> Result<Vec<Event>, UploadError> {
        self.get_json("/api/events/photographer").await
    }

    pub async fn locations(&self, event_id: &str) -> Result<Vec<PhotoLocation>, UploadError> {
        self.get_json(&format!("/api/events/{}/locations", event_id))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, UploadError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| UploadError::Api(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Api(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(UploadError::Api(error_message_from_body(
                "Request",
                status.as_u16(),
                &body,
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| UploadError::Api(format!("Failed to parse {}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::Session;

    #[test]
    fn access_check_defaults_to_denied() {
        let granted: AccessCheck = serde_json::from_str(r#"{"hasAccess": true}"#).unwrap();
        assert!(granted.has_access);

        let denied: AccessCheck = serde_json::from_str("{}").unwrap();
        assert!(!denied.has_access);
    }

    #[tokio::test]
    async fn check_access_needs_a_session() {
        let client = EventsClient::new("http://127.0.0.1:9", Arc::new(Session::new()));

        let err = client.check_access().await.unwrap_err();

        assert!(matches!(err, UploadError::Auth(_)));
    }

    #[test]
    fn numeric_ids_become_strings() {
        let events: Vec<Event> = serde_json::from_str(
            r#"[{"id": 7, "name": "City Marathon", "start_date": "2025-03-02", "created_at": "x"}]"#,
        )
        .unwrap();
        assert_eq!(events[0].id, "7");
        assert_eq!(events[0].start_date.as_deref(), Some("2025-03-02"));

        let locations: Vec<PhotoLocation> =
            serde_json::from_str(r#"[{"id": "a1", "event_id": 7, "name": "Finish line"}]"#)
                .unwrap();
        assert_eq!(locations[0].event_id, "7");
    }
}
