pub mod commands;
pub mod converter;
pub mod credentials;
pub mod dispatcher;
pub mod http;
pub mod http_client;
pub mod parameters;
pub mod scheduler;
pub mod token;
pub mod token_client;

use std::sync::Arc;

use crate::token::Token;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenClientError {
    /// The server rejected the request. Bytes of `body` that are not valid UTF-8 are replaced
    /// with `U+FFFD`.
    #[error("authentication failed: status code `{code}`, body: `{body}`")]
    Authentication { code: u16, body: String },
    #[error("client configuration: `{0}`")]
    Configuration(String),
    #[error("sending authentication request: `{0}`")]
    Transport(#[from] http_client::HttpClientError),
    #[error("decoding authentication: `{0}`")]
    Decode(#[from] converter::ConverterError),
    #[error("building authentication request: `{0}`")]
    InvalidRequest(String),
    #[error("acquiring token cache lock")]
    PoisonError,
}

/// The TokenProvider is responsible for handing out a usable authentication token.
pub trait TokenProvider {
    /// Returns the cached token, obtaining one first if there is none.
    fn token(&self) -> Result<Token, TokenClientError>;

    /// Obtains a new token regardless of the cached one and caches it.
    ///
    /// Every call reaches the server. Concurrent callers recovering from the same rejected token
    /// renew one after another, each replacing the token the previous one cached.
    fn force_renew(&self) -> Result<Token, TokenClientError>;
}

impl<T> TokenProvider for Arc<T>
where
    T: TokenProvider + ?Sized,
{
    fn token(&self) -> Result<Token, TokenClientError> {
        self.as_ref().token()
    }

    fn force_renew(&self) -> Result<Token, TokenClientError> {
        self.as_ref().force_renew()
    }
}
