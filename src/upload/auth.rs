use crate::upload::error::UploadError;
use std::sync::RwLock;

/// Source of the bearer credential attached to every API call.
#[async_trait::async_trait]
pub trait AuthContext: Send + Sync {
    async fn access_token(&self) -> Result<String, UploadError>;
}

/// An in-memory session that can be signed into and out of at runtime.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        let token = token.filter(|t| !t.trim().is_empty());
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait::async_trait]
impl AuthContext for Session {
    async fn access_token(&self) -> Result<String, UploadError> {
        self.current()
            .ok_or_else(|| UploadError::Auth("No active session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_session_is_an_auth_error() {
        let session = Session::new();
        let err = session.access_token().await.unwrap_err();
        assert!(matches!(err, UploadError::Auth(_)));
    }

    #[tokio::test]
    async fn blank_token_signs_out() {
        let session = Session::with_token("abc");
        assert_eq!(session.access_token().await.unwrap(), "abc");

        session.set_token(Some("   ".to_string()));

        assert!(!session.is_active());
    }
}
