use http::{HeaderMap, Response, StatusCode, header::LOCATION};
use tracing::debug;

use super::Operation;

/// Response payload. Successful downloads and bodies that are not valid UTF-8 are kept as bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    Binary(Vec<u8>),
}

/// Final outcome of a dispatched operation, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    status: StatusCode,
    success: bool,
    headers: HeaderMap,
    body: ResponseBody,
    created_id: Option<String>,
}

impl RestResponse {
    pub(super) fn from_http(operation: Operation, response: Response<Vec<u8>>) -> Self {
        let (parts, body) = response.into_parts();
        let success = parts.status == operation.success_status();

        let body = if success && operation.returns_binary() {
            ResponseBody::Binary(body)
        } else {
            match String::from_utf8(body) {
                Ok(text) => ResponseBody::Text(text),
                Err(e) => ResponseBody::Binary(e.into_bytes()),
            }
        };

        let created_id = if success && operation.creates() {
            let created_id = created_id(&parts.headers);
            if created_id.is_none() {
                debug!("{operation:?} succeeded without a usable location header");
            }
            created_id
        } else {
            None
        };

        Self {
            status: parts.status,
            success,
            headers: parts.headers,
            body,
            created_id,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is the one expected for the dispatched operation.
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Binary(_) => None,
        }
    }

    pub fn binary(&self) -> Option<&[u8]> {
        match &self.body {
            ResponseBody::Binary(bytes) => Some(bytes),
            ResponseBody::Text(_) => None,
        }
    }

    /// Id of the created record, taken from the last segment of the `Location` header.
    pub fn created_id(&self) -> Option<&str> {
        self.created_id.as_deref()
    }
}

fn created_id(headers: &HeaderMap) -> Option<String> {
    let location = headers.get(LOCATION)?.to_str().ok()?;
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
}
