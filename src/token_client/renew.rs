use http::{HeaderValue, Request, Response, StatusCode, header::ACCEPT};

use crate::{
    TokenClientError,
    converter::AuthenticationConverter,
    http_client::HttpClient,
    token::{AccessToken, Token},
};

use super::{AUTH_TOKEN_HEADER, AUTHENTICATION_ACCEPT};

/// Extends the validity of `current` through its renew action.
pub(super) fn renew<C, V>(
    http_client: &C,
    converter: &V,
    renew_url: &str,
    current: &AccessToken,
) -> Result<Token, TokenClientError>
where
    C: HttpClient,
    V: AuthenticationConverter,
{
    let request = build_request(renew_url, current)?;
    let response = http_client.send(request)?;
    evaluate_response(converter, response)
}

fn build_request(renew_url: &str, current: &AccessToken) -> Result<Request<Vec<u8>>, TokenClientError> {
    let mut auth_token_header = HeaderValue::from_str(current).map_err(|_| {
        TokenClientError::InvalidRequest("invalid HTTP header value set for authToken".to_string())
    })?;
    auth_token_header.set_sensitive(true);

    Request::builder()
        .uri(renew_url)
        .method("POST")
        .header(AUTH_TOKEN_HEADER, auth_token_header)
        .header(ACCEPT, AUTHENTICATION_ACCEPT)
        .body(Vec::new())
        .map_err(|e| TokenClientError::InvalidRequest(format!("Failed to build request: {e}")))
}

fn evaluate_response<V: AuthenticationConverter>(
    converter: &V,
    res: Response<Vec<u8>>,
) -> Result<Token, TokenClientError> {
    let body = String::from_utf8_lossy(res.body());

    match res.status() {
        StatusCode::OK | StatusCode::CREATED => Ok(converter.convert(&body)?),
        status => Err(TokenClientError::Authentication {
            code: status.as_u16(),
            body: body.into_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rstest::rstest;

    use super::*;
    use crate::converter::JsonAuthenticationConverter;
    use crate::converter::tests::authentication_body;
    use crate::http_client::tests::response;

    #[test]
    fn build_correct_requests() {
        let request = build_request("https://example.com/authToken/1", &"current".into()).unwrap();

        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(request.uri(), "https://example.com/authToken/1");
        assert_eq!(request.headers().get("authToken").unwrap(), "current");
        assert!(request.headers().get("authToken").unwrap().is_sensitive());
        assert_eq!(
            request.headers().get(ACCEPT).unwrap(),
            "application/vnd.uub.authentication+json"
        );
    }

    #[test]
    fn token_with_invalid_header_characters_is_rejected() {
        let err = build_request("https://example.com/authToken/1", &"bad\ntoken".into()).unwrap_err();

        assert_matches!(err, TokenClientError::InvalidRequest(_));
    }

    #[rstest]
    #[case(200)]
    #[case(201)]
    fn renew_accepts_ok_and_created(#[case] status: u16) {
        let res = response(status, &authentication_body("renewed", "https://example.com/r"));

        let token = evaluate_response(&JsonAuthenticationConverter, res).unwrap();

        assert_eq!(token.access_token(), "renewed");
    }

    #[test]
    fn failed_renew_keeps_code_and_body() {
        let res = response(401, "token expired");

        let err = evaluate_response(&JsonAuthenticationConverter, res).unwrap_err();

        assert_matches!(err, TokenClientError::Authentication { code: 401, body } => {
            assert_eq!(body, "token expired")
        });
    }
}
