//! Configuration module
//!
//! Settings collected from command-line flags and `PIPEDECK_*` environment
//! variables, shared by every command handler.

use pipedeck_client::ApiClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the pipeline backend
    pub api_url: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Rows per page for list commands
    pub page_size: u32,
}

impl Config {
    /// Build the API client for this configuration
    pub fn client(&self) -> ApiClient {
        let client = ApiClient::new(&self.api_url);
        match &self.token {
            Some(token) => client.with_token(token),
            None => client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_carries_url_and_token() {
        let config = Config {
            api_url: "http://kfp:8888".to_string(),
            token: Some("secret".to_string()),
            page_size: 10,
        };
        let client = config.client();
        assert_eq!(client.base_url(), "http://kfp:8888");
        assert!(client.has_token());

        let anonymous = Config {
            token: None,
            ..config
        };
        assert!(!anonymous.client().has_token());
    }
}
