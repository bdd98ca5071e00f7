use crate::http::config::HttpConfig;
use crate::http_client::{HttpClient as RecordHttpClient, HttpClientError};
use http::{Request, Response};
use reqwest::Proxy;
use reqwest::blocking::{Client, Response as BlockingResponse};
use tracing::debug;

/// Blocking reqwest implementation of [`RecordHttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self, HttpBuildError> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .tls_built_in_native_certs(true)
            .timeout(config.timeout)
            .connect_timeout(config.conn_timeout);

        if let Some(proxy_url) = config.proxy.url() {
            debug!("using proxy for the http client");
            let proxy = Proxy::all(proxy_url.as_str())
                .map_err(|err| HttpBuildError::InvalidProxy(err.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|err| HttpBuildError::ClientBuilder(err.to_string()))?;

        Ok(Self { client })
    }

    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpResponseError> {
        let req = self
            .client
            .request(request.method().clone(), request.uri().to_string().as_str())
            .headers(request.headers().clone())
            .body(request.body().to_vec());

        let res = req
            .send()
            .map_err(|err| HttpResponseError::TransportError(err.to_string()))?;

        try_build_response(res)
    }
}

fn try_build_response(res: BlockingResponse) -> Result<Response<Vec<u8>>, HttpResponseError> {
    let status = res.status();
    let version = res.version();
    let headers = res.headers().clone();

    let body: Vec<u8> = res
        .bytes()
        .map_err(|err| HttpResponseError::ReadingResponse(err.to_string()))?
        .into();

    let mut response = http::Response::builder()
        .status(status)
        .version(version)
        .body(body)
        .map_err(|err| HttpResponseError::BuildingResponse(err.to_string()))?;
    *response.headers_mut() = headers;

    Ok(response)
}

impl RecordHttpClient for HttpClient {
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        let response = self.send(req)?;

        Ok(response)
    }
}

impl From<HttpResponseError> for HttpClientError {
    fn from(err: HttpResponseError) -> Self {
        match err {
            HttpResponseError::TransportError(msg) => HttpClientError::TransportError(msg),
            HttpResponseError::BuildingResponse(msg) | HttpResponseError::ReadingResponse(msg) => {
                HttpClientError::InvalidResponse(msg)
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum HttpBuildError {
    #[error("could not build the http client: {0}")]
    ClientBuilder(String),
    #[error("invalid proxy configuration: {0}")]
    InvalidProxy(String),
}

#[derive(thiserror::Error, Debug)]
enum HttpResponseError {
    #[error("could read response body: {0}")]
    ReadingResponse(String),
    #[error("could build response: {0}")]
    BuildingResponse(String),
    #[error("http transport error: `{0}`")]
    TransportError(String),
}
