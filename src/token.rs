use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub type AccessToken = String;

/// Follow-up operation advertised by the server for a token, such as `renew` or `delete`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionLink {
    pub url: String,
    pub request_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

/// Validity and ownership information returned alongside a token.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AuthenticationMetadata {
    pub valid_until: Option<DateTime<Utc>>,
    pub renew_until: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub login_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub renew: Option<ActionLink>,
    pub delete: Option<ActionLink>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct Token {
    access_token: AccessToken,
    metadata: Option<AuthenticationMetadata>,
}

impl Token {
    pub fn new(access_token: AccessToken, metadata: AuthenticationMetadata) -> Self {
        Token {
            access_token,
            metadata: Some(metadata),
        }
    }

    /// A token known only by its value, e.g. one handed over by another process.
    pub fn from_access_token(access_token: AccessToken) -> Self {
        Token {
            access_token,
            metadata: None,
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn metadata(&self) -> Option<&AuthenticationMetadata> {
        self.metadata.as_ref()
    }

    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.metadata.as_ref().and_then(|m| m.valid_until)
    }

    /// Url of the renew action, when the server advertised one.
    pub fn renew_url(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.renew.as_ref())
            .map(|link| link.url.as_str())
    }

    /// Tokens without validity metadata are never considered expired; the server decides with a 401.
    pub fn is_expired(&self) -> bool {
        self.valid_until().is_some_and(|until| until.lt(&Utc::now()))
    }

    /// Time left until `valid_until` minus `margin`, clamped at zero.
    pub fn renewal_delay(&self, margin: TimeDelta) -> Option<std::time::Duration> {
        let remaining = self.valid_until()? - Utc::now() - margin;
        Some(remaining.to_std().unwrap_or_default())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<hidden>")
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.access_token)
    }
}
