use http::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::http_client::{HttpClient, HttpClientError};
use crate::token::Token;
use crate::{TokenClientError, TokenProvider};

mod request;
mod response;

pub use request::RestRequest;
pub use response::{ResponseBody, RestResponse};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("acquiring authentication token: `{0}`")]
    Token(#[from] TokenClientError),
    #[error("sending request: `{0}`")]
    Transport(#[from] HttpClientError),
    #[error("building request: `{0}`")]
    InvalidRequest(String),
}

/// REST operations, which differ in their success status and response content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    List,
    Search,
    Validate,
    Index,
    Download,
}

impl Operation {
    pub fn success_status(&self) -> StatusCode {
        match self {
            Operation::Create | Operation::Index => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    fn creates(&self) -> bool {
        matches!(self, Operation::Create | Operation::Index)
    }

    fn returns_binary(&self) -> bool {
        matches!(self, Operation::Download)
    }
}

/// Sends authorized requests, renewing the token and retrying once when the server answers 401.
#[derive(Debug)]
pub struct RetryDispatcher<T, C>
where
    T: TokenProvider,
    C: HttpClient,
{
    token_provider: T,
    http_client: C,
}

impl<T, C> RetryDispatcher<T, C>
where
    T: TokenProvider,
    C: HttpClient,
{
    pub fn new(token_provider: T, http_client: C) -> Self {
        Self {
            token_provider,
            http_client,
        }
    }

    pub fn token_provider(&self) -> &T {
        &self.token_provider
    }

    /// Sends `request` and returns the response of the last attempt as is.
    ///
    /// Only token acquisition, transport and request building failures are errors; any HTTP
    /// status, including a second 401, is returned as a [`RestResponse`].
    pub fn dispatch(
        &self,
        operation: Operation,
        request: &RestRequest,
    ) -> Result<RestResponse, DispatchError> {
        let token = self.token_provider.token()?;
        let mut response = self.send(request, &token)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("{operation:?} {} was unauthorized, renewing token", request.uri());
            let token = self.token_provider.force_renew()?;
            response = self.send(request, &token)?;
        }

        Ok(RestResponse::from_http(operation, response))
    }

    fn send(
        &self,
        request: &RestRequest,
        token: &Token,
    ) -> Result<http::Response<Vec<u8>>, DispatchError> {
        let http_request = request.authorized(token)?;
        Ok(self.http_client.send(http_request)?)
    }

    pub fn read(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::Read, request)
    }

    pub fn create(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::Create, request)
    }

    pub fn update(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::Update, request)
    }

    pub fn delete(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::Delete, request)
    }

    pub fn list(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::List, request)
    }

    pub fn search(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::Search, request)
    }

    pub fn validate(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::Validate, request)
    }

    pub fn index(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::Index, request)
    }

    pub fn download(&self, request: &RestRequest) -> Result<RestResponse, DispatchError> {
        self.dispatch(Operation::Download, request)
    }
}
