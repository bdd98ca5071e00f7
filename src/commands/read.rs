use http::HeaderValue;
use http::header::ACCEPT;

use crate::TokenProvider;
use crate::dispatcher::{DispatchError, RestRequest, RestResponse, RetryDispatcher};
use crate::http_client::HttpClient;

pub struct ReadCommand<T, C>
where
    T: TokenProvider,
    C: HttpClient,
{
    dispatcher: RetryDispatcher<T, C>,
}

impl<T, C> ReadCommand<T, C>
where
    T: TokenProvider,
    C: HttpClient,
{
    pub fn new(dispatcher: RetryDispatcher<T, C>) -> Self {
        Self { dispatcher }
    }

    pub fn read(&self, url: &str, accept: &str) -> Result<RestResponse, DispatchError> {
        let accept = HeaderValue::from_str(accept)
            .map_err(|e| DispatchError::InvalidRequest(format!("invalid accept header: {e}")))?;
        let request = RestRequest::get(url)?.with_header(ACCEPT, accept);

        self.dispatcher.read(&request)
    }
}
