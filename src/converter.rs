use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::token::{ActionLink, AuthenticationMetadata, Token};

#[derive(Error, Debug, PartialEq)]
pub enum ConverterError {
    #[error("unable to deserialize authentication: `{0}`")]
    DeserializeError(String),
    #[error("missing `{0}` in authentication")]
    MissingField(&'static str),
    #[error("invalid timestamp in `{0}`: `{1}`")]
    InvalidTimestamp(&'static str, String),
}

/// Converts an authentication response body into a [`Token`].
pub trait AuthenticationConverter {
    fn convert(&self, body: &str) -> Result<Token, ConverterError>;
}

/// Reads the JSON authentication record returned by the login and renew endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonAuthenticationConverter;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthenticationResponse {
    Wrapped { authentication: Authentication },
    Bare(Authentication),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Authentication {
    data: DataGroup,
    #[serde(default)]
    action_links: ActionLinks,
}

#[derive(Debug, Deserialize)]
struct DataGroup {
    #[serde(default)]
    children: Vec<DataChild>,
}

/// Groups and other non-atomic children carry no `value` and are ignored.
#[derive(Debug, Deserialize)]
struct DataChild {
    name: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionLinks {
    renew: Option<ActionLink>,
    delete: Option<ActionLink>,
}

impl DataGroup {
    fn atomic(&self, name: &str) -> Option<String> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .and_then(|child| child.value.clone())
    }

    fn timestamp(&self, name: &'static str) -> Result<Option<DateTime<Utc>>, ConverterError> {
        let Some(raw) = self.atomic(name) else {
            return Ok(None);
        };
        let millis = raw
            .parse::<i64>()
            .map_err(|e| ConverterError::InvalidTimestamp(name, e.to_string()))?;
        DateTime::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| ConverterError::InvalidTimestamp(name, raw))
    }
}

impl AuthenticationConverter for JsonAuthenticationConverter {
    fn convert(&self, body: &str) -> Result<Token, ConverterError> {
        let authentication = match serde_json::from_str(body)
            .map_err(|e| ConverterError::DeserializeError(e.to_string()))?
        {
            AuthenticationResponse::Wrapped { authentication } => authentication,
            AuthenticationResponse::Bare(authentication) => authentication,
        };
        let data = &authentication.data;

        let access_token = data
            .atomic("token")
            .ok_or(ConverterError::MissingField("token"))?;

        let metadata = AuthenticationMetadata {
            valid_until: data.timestamp("validUntil")?,
            renew_until: data.timestamp("renewUntil")?,
            user_id: data.atomic("userId"),
            login_id: data.atomic("loginId"),
            first_name: data.atomic("firstName"),
            last_name: data.atomic("lastName"),
            renew: authentication.action_links.renew,
            delete: authentication.action_links.delete,
        };

        Ok(Token::new(access_token, metadata))
    }
}
