use super::feed::FeedError;

/// Header carrying the service-to-service token on every outbound call.
pub const SERVICE_AUTHORIZATION: &str = "ServiceAuthorization";

/// Supplies the service-to-service token.
pub trait AuthTokenProvider {
    fn token(&self) -> Result<String, FeedError>;
}

/// Token fixed at startup from configuration.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl AuthTokenProvider for StaticTokenProvider {
    fn token(&self) -> Result<String, FeedError> {
        if self.token.is_empty() {
            return Err(FeedError::Auth("service token is empty".into()));
        }
        Ok(format!("Bearer {}", self.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_is_bearer() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.token().unwrap(), "Bearer abc");
    }

    #[test]
    fn empty_token_is_an_error() {
        assert!(StaticTokenProvider::new("").token().is_err());
    }
}
