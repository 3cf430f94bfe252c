use crate::err::{Result, StaplusError};
use crate::http::transport::Auth;
use std::env;
use std::time::Duration;
use url::Url;

pub const ENV_URL: &str = "STAPLUS_URL";
pub const ENV_TOKEN: &str = "STAPLUS_TOKEN";
pub const ENV_USER: &str = "STAPLUS_USER";
pub const ENV_PASS: &str = "STAPLUS_PASS";
pub const ENV_TIMEOUT_SECS: &str = "STAPLUS_TIMEOUT_SECS";

/// Where and how to reach a STAplus server.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    /// service root, e.g. `http://localhost:8080/FROST-Server/v1.1`
    pub url: String,
    pub auth: Auth,
    /// request timeout; reqwest's default applies when unset
    pub timeout: Option<Duration>,
}

impl ServiceConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: Auth::None,
            timeout: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Bearer(token.into());
        self
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Auth::Basic {
            user: user.into(),
            password: password.into(),
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads `STAPLUS_URL` (required), then either `STAPLUS_TOKEN` or
    /// `STAPLUS_USER`/`STAPLUS_PASS`, and `STAPLUS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(ENV_URL)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| StaplusError::Config(format!("{} is not set", ENV_URL)))?;
        let mut config = Self::new(url);

        if let Some(token) = lookup(ENV_TOKEN) {
            config = config.with_bearer_token(token);
        } else if let Some(user) = lookup(ENV_USER) {
            let password = lookup(ENV_PASS).ok_or_else(|| {
                StaplusError::Config(format!("{} is set but {} is not", ENV_USER, ENV_PASS))
            })?;
            config = config.with_basic_auth(user, password);
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                StaplusError::Config(format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the url is absolute http(s).
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.url)?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(StaplusError::Config(format!(
                "unsupported URL scheme {}",
                other
            ))),
        }
    }
}

impl<S: AsRef<str>> From<S> for ServiceConfig {
    fn from(url: S) -> Self {
        Self::new(url.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_url_required() {
        assert!(matches!(
            ServiceConfig::from_lookup(lookup(&[])),
            Err(StaplusError::Config(_))
        ));
    }

    #[test]
    fn test_token_wins_over_basic() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_URL, "https://example.org/FROST-Server/v1.1"),
            (ENV_TOKEN, "abc"),
            (ENV_USER, "u"),
            (ENV_PASS, "p"),
            (ENV_TIMEOUT_SECS, "15"),
        ]))
        .unwrap();
        assert_eq!(config.auth, Auth::Bearer("abc".into()));
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_basic_needs_password() {
        let result = ServiceConfig::from_lookup(lookup(&[
            (ENV_URL, "https://example.org/v1.1"),
            (ENV_USER, "u"),
        ]));
        assert!(matches!(result, Err(StaplusError::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(ServiceConfig::new("ftp://example.org").validate().is_err());
        assert!(ServiceConfig::new("not a url").validate().is_err());
    }
}
