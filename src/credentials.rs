use std::fmt;

use http::Uri;
use thiserror::Error;

use crate::token::AccessToken;

#[derive(Error, Debug, PartialEq)]
pub enum CredentialsError {
    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("invalid url `{0}`: `{1}`")]
    InvalidUrl(String, String),
}

/// Describes how a [`crate::token_client::HttpTokenClient`] authenticates.
#[derive(Clone, PartialEq)]
pub enum Credentials {
    /// Long-lived login credentials used to mint tokens from scratch.
    App(AppCredentials),
    /// An already issued token, optionally renewable.
    Auth(AuthCredentials),
}

impl From<AppCredentials> for Credentials {
    fn from(value: AppCredentials) -> Self {
        Credentials::App(value)
    }
}

impl From<AuthCredentials> for Credentials {
    fn from(value: AuthCredentials) -> Self {
        Credentials::Auth(value)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::App(app) => f.debug_tuple("App").field(app).finish(),
            Credentials::Auth(auth) => f.debug_tuple("Auth").field(auth).finish(),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct AppCredentials {
    login_url: String,
    login_id: String,
    app_secret: String,
}

impl AppCredentials {
    pub fn new(
        login_url: impl Into<String>,
        login_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let login_url = login_url.into();
        let login_id = login_id.into();
        let app_secret = app_secret.into();

        validate_url("login_url", &login_url)?;
        non_empty("login_id", &login_id)?;
        non_empty("app_secret", &app_secret)?;

        Ok(Self {
            login_url,
            login_id,
            app_secret,
        })
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn login_id(&self) -> &str {
        &self.login_id
    }

    pub(crate) fn app_secret(&self) -> &str {
        &self.app_secret
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("login_url", &self.login_url)
            .field("login_id", &self.login_id)
            .field("app_secret", &"<hidden>") // Do not print the secret
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct AuthCredentials {
    renew_url: Option<String>,
    token: AccessToken,
}

impl AuthCredentials {
    /// Credentials for a token that can be renewed through `renew_url`.
    pub fn new(
        renew_url: impl Into<String>,
        token: impl Into<AccessToken>,
    ) -> Result<Self, CredentialsError> {
        let renew_url = renew_url.into();
        validate_url("renew_url", &renew_url)?;
        Self::build(Some(renew_url), token.into())
    }

    /// Credentials for a fixed token. A client built from them can never re-authenticate.
    pub fn without_renew_url(token: impl Into<AccessToken>) -> Result<Self, CredentialsError> {
        Self::build(None, token.into())
    }

    fn build(renew_url: Option<String>, token: AccessToken) -> Result<Self, CredentialsError> {
        non_empty("token", &token)?;
        Ok(Self { renew_url, token })
    }

    pub fn renew_url(&self) -> Option<&str> {
        self.renew_url.as_deref()
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }
}

impl fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("renew_url", &self.renew_url)
            .field("token", &"<hidden>")
            .finish()
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), CredentialsError> {
    if value.trim().is_empty() {
        return Err(CredentialsError::EmptyField(field));
    }
    Ok(())
}

fn validate_url(field: &'static str, value: &str) -> Result<(), CredentialsError> {
    non_empty(field, value)?;
    value
        .parse::<Uri>()
        .map_err(|err| CredentialsError::InvalidUrl(value.to_string(), err.to_string()))?;
    Ok(())
}
