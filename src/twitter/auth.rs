//! OAuth 1.0a user-context request signing (HMAC-SHA1).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use rand::distr::Alphanumeric;
use ring::hmac;

use crate::config::TwitterConfig;
use crate::error::{Result, SmError};

#[derive(Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_config(config: &TwitterConfig) -> Result<Self> {
        let fields = [
            ("twitter.api_key", &config.api_key),
            ("twitter.api_secret_key", &config.api_secret_key),
            ("twitter.access_token", &config.access_token),
            ("twitter.access_token_secret", &config.access_token_secret),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(SmError::MissingConfig(format!(
                    "{name} is empty; set it in .secrets.toml or SMCRON_{}",
                    name.replace('.', "_").to_uppercase()
                )));
            }
        }
        Ok(Self {
            consumer_key: config.api_key.trim().to_string(),
            consumer_secret: config.api_secret_key.trim().to_string(),
            token: config.access_token.trim().to_string(),
            token_secret: config.access_token_secret.trim().to_string(),
        })
    }
}

pub struct OAuthSigner {
    credentials: Credentials,
    key: hmac::Key,
}

impl OAuthSigner {
    pub fn new(credentials: Credentials) -> Self {
        let signing_key = format!(
            "{}&{}",
            encode(&credentials.consumer_secret),
            encode(&credentials.token_secret)
        );
        let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes());
        Self { credentials, key }
    }

    /// Build the `Authorization` header for a request.
    ///
    /// `url` must not carry a query string; request parameters go in `params`.
    pub fn authorization(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_with(method, url, params, &nonce, &timestamp)
    }

    fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let mut oauth = self.oauth_params(nonce, timestamp);
        let signature = self.signature(method, url, params, &oauth);
        oauth.push(("oauth_signature".to_string(), signature));
        oauth.sort();

        let fields = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }

    fn oauth_params(&self, nonce: &str, timestamp: &str) -> Vec<(String, String)> {
        vec![
            (
                "oauth_consumer_key".to_string(),
                self.credentials.consumer_key.clone(),
            ),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                "HMAC-SHA1".to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.credentials.token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        oauth: &[(String, String)],
    ) -> String {
        let mut encoded: Vec<(String, String)> = params
            .iter()
            .chain(oauth.iter())
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        encoded.sort();
        let parameter_string = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            encode(url),
            encode(&parameter_string)
        );
        let tag = hmac::sign(&self.key, base.as_bytes());
        STANDARD.encode(tag.as_ref())
    }
}

/// RFC 3986 percent-encoding, as OAuth 1.0a requires.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
