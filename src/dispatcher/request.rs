use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};

use crate::token::Token;
use crate::token_client::AUTH_TOKEN_HEADER;

use super::DispatchError;

/// A REST request, kept around so it can be sent again with a renewed token.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RestRequest {
    pub fn new(method: Method, uri: &str) -> Result<Self, DispatchError> {
        let uri = uri
            .parse::<Uri>()
            .map_err(|e| DispatchError::InvalidRequest(format!("invalid uri `{uri}`: {e}")))?;
        Ok(Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Vec::new(),
        })
    }

    pub fn get(uri: &str) -> Result<Self, DispatchError> {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Result<Self, DispatchError> {
        Self::new(Method::POST, uri)
    }

    pub fn delete(uri: &str) -> Result<Self, DispatchError> {
        Self::new(Method::DELETE, uri)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(self, body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..self
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Builds the request to send, authorized with `token`.
    pub(super) fn authorized(&self, token: &Token) -> Result<Request<Vec<u8>>, DispatchError> {
        let mut auth_token_header = HeaderValue::from_str(token.access_token()).map_err(|_| {
            DispatchError::InvalidRequest("invalid HTTP header value set for authToken".to_string())
        })?;
        auth_token_header.set_sensitive(true);

        let mut request = Request::builder()
            .method(self.method.clone())
            .uri(self.uri.clone())
            .body(self.body.clone())
            .map_err(|e| DispatchError::InvalidRequest(format!("Failed to build request: {e}")))?;

        let headers = request.headers_mut();
        headers.clone_from(&self.headers);
        headers.insert(AUTH_TOKEN_HEADER, auth_token_header);

        Ok(request)
    }
}
