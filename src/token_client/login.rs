use http::{
    Request, Response, StatusCode,
    header::{ACCEPT, CONTENT_TYPE},
};

use crate::{
    TokenClientError,
    converter::AuthenticationConverter,
    credentials::AppCredentials,
    http_client::HttpClient,
    token::Token,
};

use super::AUTHENTICATION_ACCEPT;

pub(super) const LOGIN_CONTENT_TYPE: &str = "application/vnd.uub.login";
const APP_TOKEN_PATH: &str = "apptoken";

/// Mints a brand-new token from login credentials.
pub(super) fn mint<C, V>(
    http_client: &C,
    converter: &V,
    credentials: &AppCredentials,
) -> Result<Token, TokenClientError>
where
    C: HttpClient,
    V: AuthenticationConverter,
{
    let request = build_request(credentials)?;
    let response = http_client.send(request)?;
    evaluate_response(converter, response)
}

fn build_request(credentials: &AppCredentials) -> Result<Request<Vec<u8>>, TokenClientError> {
    let uri = format!("{}{APP_TOKEN_PATH}", credentials.login_url());
    let body = format!("{}\n{}", credentials.login_id(), credentials.app_secret());

    Request::builder()
        .uri(uri)
        .method("POST")
        .header(CONTENT_TYPE, LOGIN_CONTENT_TYPE)
        .header(ACCEPT, AUTHENTICATION_ACCEPT)
        .body(body.into_bytes())
        .map_err(|e| TokenClientError::InvalidRequest(format!("Failed to build request: {e}")))
}

fn evaluate_response<V: AuthenticationConverter>(
    converter: &V,
    res: Response<Vec<u8>>,
) -> Result<Token, TokenClientError> {
    let body = String::from_utf8_lossy(res.body());

    match res.status() {
        StatusCode::CREATED => Ok(converter.convert(&body)?),
        status => Err(TokenClientError::Authentication {
            code: status.as_u16(),
            body: body.into_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::converter::JsonAuthenticationConverter;
    use crate::converter::tests::authentication_body;
    use crate::http_client::tests::response;

    fn app_credentials() -> AppCredentials {
        AppCredentials::new("https://example.com/login/rest/", "someLoginId", "someSecret")
            .unwrap()
    }

    #[test]
    fn build_correct_requests() {
        let request = build_request(&app_credentials()).unwrap();

        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(
            request.uri(),
            "https://example.com/login/rest/apptoken"
        );
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/vnd.uub.login"
        );
        assert_eq!(
            request.headers().get(ACCEPT).unwrap(),
            "application/vnd.uub.authentication+json"
        );
        assert_eq!(request.body(), b"someLoginId\nsomeSecret");
    }

    #[test]
    fn evaluate_response_created() {
        let res = response(201, &authentication_body("T1", "https://example.com/renew"));

        let token = evaluate_response(&JsonAuthenticationConverter, res).unwrap();

        assert_eq!(token.access_token(), "T1");
    }

    #[test]
    fn only_created_is_a_successful_mint() {
        let res = response(200, &authentication_body("T1", "https://example.com/renew"));

        let err = evaluate_response(&JsonAuthenticationConverter, res).unwrap_err();

        assert_matches!(err, TokenClientError::Authentication { code: 200, .. });
    }

    #[test]
    fn failed_mint_keeps_code_and_body() {
        let res = response(401, "bad credentials");

        let err = evaluate_response(&JsonAuthenticationConverter, res).unwrap_err();

        assert_matches!(err, TokenClientError::Authentication { code, body } => {
            assert_eq!(code, 401);
            assert_eq!(body, "bad credentials");
        });
    }

    #[test]
    fn failed_mint_replaces_invalid_utf8_in_body() {
        let res = Response::builder()
            .status(403)
            .body(vec![b'n', b'o', 0xff])
            .unwrap();

        let err = evaluate_response(&JsonAuthenticationConverter, res).unwrap_err();

        assert_matches!(err, TokenClientError::Authentication { code, body } => {
            assert_eq!(code, 403);
            assert_eq!(body, "no\u{FFFD}");
        });
    }

    #[test]
    fn undecodable_body_is_a_decode_error() {
        let res = response(201, "{}");

        let err = evaluate_response(&JsonAuthenticationConverter, res).unwrap_err();

        assert_matches!(err, TokenClientError::Decode(_));
    }
}
