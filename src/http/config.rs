use clap::{error::Error as ClapError, error::ErrorKind};
use http::Uri;
use std::env;
use std::env::VarError;
use std::fmt::Display;
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

const HTTP_PROXY_ENV_NAME: &str = "HTTP_PROXY";
const HTTPS_PROXY_ENV_NAME: &str = "HTTPS_PROXY";

/// Settings for the blocking [`super::client::HttpClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub(crate) timeout: Duration,
    pub(crate) conn_timeout: Duration,
    pub(crate) proxy: ProxyConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            conn_timeout: DEFAULT_HTTP_TIMEOUT,
            proxy: ProxyConfig::default(),
        }
    }
}

impl HttpConfig {
    pub fn new(timeout: Duration, conn_timeout: Duration, proxy: ProxyConfig) -> Self {
        Self {
            timeout,
            conn_timeout,
            proxy,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProxyError {
    #[error("invalid proxy url `{0}`: `{1}`")]
    InvalidUrl(String, String),
}

/// Type to represent a Url which can be used in proxy implementations.
/// It allows representing empty urls and perform basic uri validations.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct ProxyUrl(Option<Uri>);

impl TryFrom<&str> for ProxyUrl {
    type Error = ProxyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Ok(Self(None));
        }
        let uri = s
            .parse::<Uri>()
            .map_err(|err| ProxyError::InvalidUrl(s.to_string(), err.to_string()))?;
        Ok(Self(Some(uri)))
    }
}

impl Display for ProxyUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(url) => write!(f, "{url}"),
            None => write!(f, ""),
        }
    }
}

impl ProxyUrl {
    fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Proxy for the record API HTTP client.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ProxyConfig {
    /// Proxy URL proxy:
    /// <protocol>://<user>:<password>@<host>:<port>
    /// (All parts except host are optional)
    url: ProxyUrl,
}

impl ProxyConfig {
    pub fn new(proxy_url: &str) -> Result<Self, ProxyError> {
        let url = ProxyUrl::try_from(proxy_url)?;
        Ok(Self { url })
    }

    /// Returns the proxy url, `None` when no proxy is configured.
    pub fn url(&self) -> Option<String> {
        (!self.url.is_empty()).then(|| self.url.to_string())
    }

    /// Returns a new instance whose url is taken from the standard environment variables if needed.
    pub fn try_with_url_from_env(self) -> Result<Self, ProxyError> {
        self.with_env_aware_url(env::var)
    }

    /// Returns a new instance setting up the using the provided `env_var` function to get it from the
    /// environment if required. It fails if the url from the environment is not valid.
    fn with_env_aware_url<F>(self, env_var: F) -> Result<Self, ProxyError>
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        if !self.url.is_empty() {
            return Ok(self);
        }
        let url = env_var(HTTPS_PROXY_ENV_NAME)
            .or_else(|_| env_var(HTTP_PROXY_ENV_NAME))
            .unwrap_or_default()
            .as_str()
            .try_into()?;
        Ok(ProxyConfig { url })
    }
}

impl From<ProxyError> for ClapError {
    fn from(err: ProxyError) -> ClapError {
        ClapError::raw(ErrorKind::InvalidValue, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ProxyError;
    use assert_matches::assert_matches;
    use rstest::rstest;

    use super::{ProxyConfig, ProxyUrl};
    use std::{collections::HashMap, env::VarError};

    #[rstest]
    #[case::nothing_configured(&[("SOME_OTHER", "env-variable")], "", "")]
    #[case::config_without_env(&[("SOME_OTHER", "env-variable")], "http://localhost:8888", "http://localhost:8888")]
    #[case::config_has_priority(&[("HTTPS_PROXY", "http://other.proxy:9999")], "http://localhost:8888", "http://localhost:8888")]
    #[case::https_proxy_env(&[("HTTPS_PROXY", "http://other.proxy:9999")], "", "http://other.proxy:9999")]
    #[case::http_proxy_env(&[("HTTP_PROXY", "http://other.proxy:9999")], "", "http://other.proxy:9999")]
    #[case::https_proxy_has_more_priority(
        &[("HTTPS_PROXY", "http://one.proxy:9999"), ("HTTP_PROXY", "http://other.proxy:9999")],
        "",
        "http://one.proxy:9999"
    )]
    fn system_proxy_values(
        #[case] env_values: &[(&'static str, &'static str)],
        #[case] config_url: &str,
        #[case] expected: &str,
    ) {
        let env_values: HashMap<_, _> = env_values.iter().copied().collect();
        let config = ProxyConfig::new(config_url)
            .unwrap()
            .with_env_aware_url(|k| {
                env_values
                    .get(k)
                    .map(|v| v.to_string())
                    .ok_or(VarError::NotPresent)
            })
            .unwrap();

        let expected: ProxyUrl = expected.try_into().unwrap();
        assert_eq!(config.url, expected);
    }

    #[test]
    fn invalid_system_proxy() {
        let config = ProxyConfig::default();
        let result = config.with_env_aware_url(|_| Ok("http://".to_string()));
        assert_matches!(result.unwrap_err(), ProxyError::InvalidUrl(s, _) => {
            assert_eq!(s, "http://".to_string())
        });
    }

    #[test]
    fn empty_proxy_has_no_url() {
        assert_eq!(ProxyConfig::default().url(), None);
        assert_eq!(
            ProxyConfig::new("http://localhost:8888").unwrap().url(),
            Some("http://localhost:8888/".to_string())
        );
    }
}
