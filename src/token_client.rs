use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::HeaderName;
use tracing::{debug, warn};

use crate::converter::{AuthenticationConverter, JsonAuthenticationConverter};
use crate::credentials::Credentials;
use crate::http_client::HttpClient;
use crate::scheduler::{DelayedExecutor, OneAtATimeScheduler};
use crate::token::Token;
use crate::{TokenClientError, TokenProvider};

mod login;
mod renew;

/// Header carrying the token on every authorized request (`authToken`).
pub const AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("authtoken");
pub(crate) const AUTHENTICATION_ACCEPT: &str = "application/vnd.uub.authentication+json";

/// Keeps one cached token and mints or renews it over HTTP.
///
/// The cache lock is held while a token is being minted, so concurrent callers
/// of [`TokenProvider::token`] share the outcome of a single network call.
pub struct HttpTokenClient<C, V = JsonAuthenticationConverter>
where
    C: HttpClient,
    V: AuthenticationConverter,
{
    credentials: Credentials,
    cached_token: Mutex<Option<Token>>,
    http_client: C,
    converter: V,
}

impl<C, V> fmt::Debug for HttpTokenClient<C, V>
where
    C: HttpClient,
    V: AuthenticationConverter,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTokenClient")
            .field("credentials", &self.credentials)
            .field("cached_token", &self.cached_token)
            .field("http_client", &"impl HttpClient") // HttpClient does not implement Debug
            .finish()
    }
}

impl<C> HttpTokenClient<C>
where
    C: HttpClient,
{
    /// Creates a client reading authentication responses with [`JsonAuthenticationConverter`].
    ///
    /// Renewable [`crate::credentials::AuthCredentials`] are renewed right away so the client
    /// takes over the lifetime of the provided token.
    pub fn new(
        http_client: C,
        credentials: impl Into<Credentials>,
    ) -> Result<Self, TokenClientError> {
        Self::new_with_converter(http_client, JsonAuthenticationConverter, credentials)
    }
}

impl<C, V> HttpTokenClient<C, V>
where
    C: HttpClient,
    V: AuthenticationConverter,
{
    pub fn new_with_converter(
        http_client: C,
        converter: V,
        credentials: impl Into<Credentials>,
    ) -> Result<Self, TokenClientError> {
        let credentials = credentials.into();

        let initial_token = match &credentials {
            Credentials::App(_) => None,
            Credentials::Auth(auth) => match auth.renew_url() {
                Some(renew_url) => {
                    let token =
                        renew::renew(&http_client, &converter, renew_url, auth.token())?;
                    debug!("took over the renewal of the provided token");
                    Some(token)
                }
                None => Some(Token::from_access_token(auth.token().to_owned())),
            },
        };

        Ok(Self {
            credentials,
            cached_token: Mutex::new(initial_token),
            http_client,
            converter,
        })
    }

    fn ensure_renewable(&self) -> Result<(), TokenClientError> {
        match &self.credentials {
            Credentials::Auth(auth) if auth.renew_url().is_none() => {
                Err(TokenClientError::Configuration(
                    "the token was provided without a renew url and cannot be renewed".into(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Gets a new token from the server, minting from login credentials or renewing `current`.
    fn fetch_token(&self, current: Option<&Token>) -> Result<Token, TokenClientError> {
        match &self.credentials {
            Credentials::App(app) => login::mint(&self.http_client, &self.converter, app),
            Credentials::Auth(auth) => {
                // The server may move the renew action; prefer the latest advertised one.
                let renew_url = current
                    .and_then(Token::renew_url)
                    .or(auth.renew_url())
                    .ok_or_else(|| TokenClientError::Configuration("missing renew url".into()))?;
                let access_token = current.map_or(auth.token(), Token::access_token);

                renew::renew(&self.http_client, &self.converter, renew_url, access_token)
            }
        }
    }
}

impl<C, V> TokenProvider for HttpTokenClient<C, V>
where
    C: HttpClient,
    V: AuthenticationConverter,
{
    fn token(&self) -> Result<Token, TokenClientError> {
        let mut cached_token = self
            .cached_token
            .lock()
            .map_err(|_| TokenClientError::PoisonError)?;

        if let Some(token) = cached_token.as_ref() {
            return Ok(token.clone());
        }

        let token = self.fetch_token(None)?;
        debug!("authentication token minted");
        *cached_token = Some(token.clone());

        Ok(token)
    }

    fn force_renew(&self) -> Result<Token, TokenClientError> {
        self.ensure_renewable()?;

        let mut cached_token = self
            .cached_token
            .lock()
            .map_err(|_| TokenClientError::PoisonError)?;

        let token = self.fetch_token(cached_token.as_ref()).inspect_err(|e| {
            debug!("error renewing authentication token: {e}");
        })?;
        debug!("authentication token renewed");
        *cached_token = Some(token.clone());

        Ok(token)
    }
}

impl<C, V> HttpTokenClient<C, V>
where
    C: HttpClient + Send + Sync + 'static,
    V: AuthenticationConverter + Send + Sync + 'static,
{
    /// Renews the token after `delay` unless another renewal is scheduled on `scheduler` first.
    ///
    /// The scheduler only keeps a weak reference to the client: once every `Arc` is dropped the
    /// pending renewal does nothing.
    pub fn schedule_renewal<E>(self: &Arc<Self>, scheduler: &OneAtATimeScheduler<E>, delay: Duration)
    where
        E: DelayedExecutor,
    {
        scheduler.schedule_after_delay(
            self,
            |client: Arc<Self>| {
                if let Err(err) = client.force_renew() {
                    warn!("scheduled token renewal failed: {err}");
                }
            },
            delay,
        );
    }
}
