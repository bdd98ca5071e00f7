use clap::error::ErrorKind;
use clap::{Args, Error, Subcommand, ValueEnum};
use std::time::Duration;

use crate::credentials::{AppCredentials, AuthCredentials, Credentials};
use crate::http::config::{DEFAULT_HTTP_TIMEOUT, HttpConfig, ProxyConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve an authentication token, minting it from login credentials or renewing a provided one.
    RetrieveToken {
        /// Options for configuring how to authenticate.
        #[command(flatten)]
        input_auth_args: AuthInputArgs,

        /// Force a fresh mint or renew after the token is obtained.
        #[arg(long)]
        force_renew: bool,

        /// Select format how the Token should be obtained
        #[arg(long, default_value = "Plain")]
        output_token_format: OutPutTokenFormat,
    },
    /// Read a record, renewing the token once if the server rejects it.
    Read {
        /// Url of the record to read
        url: String,

        /// Accept header sent with the request
        #[arg(long, default_value = "application/vnd.uub.record+json")]
        accept: String,

        /// Options for configuring how to authenticate.
        #[command(flatten)]
        input_auth_args: AuthInputArgs,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutPutTokenFormat {
    /// Returns only the token value
    #[value(name = "Plain")]
    Plain,
    /// Returns the token and its authentication metadata in json format
    #[value(name = "Json")]
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct AuthInputArgs {
    /// Base url of the login service, `apptoken` is appended to it
    #[arg(long, requires = "login_id", requires = "app_secret", conflicts_with = "auth_token")]
    login_url: Option<String>,

    /// Login id used to mint tokens
    #[arg(long, requires = "login_url")]
    login_id: Option<String>,

    /// App secret used to mint tokens
    #[arg(long, requires = "login_url")]
    app_secret: Option<String>,

    /// Already issued authentication token
    #[arg(long)]
    auth_token: Option<String>,

    /// Url to renew the provided authentication token
    #[arg(long, requires = "auth_token")]
    renew_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct HttpArgs {
    /// Timeout in seconds for every request
    #[arg(long, global = true, default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Proxy url, HTTPS_PROXY and HTTP_PROXY are used when not set
    #[arg(long, global = true)]
    proxy: Option<String>,
}

impl AuthInputArgs {
    pub fn credentials(&self) -> Result<Credentials, Error> {
        let invalid = |e: crate::credentials::CredentialsError| {
            Error::raw(ErrorKind::InvalidValue, e.to_string())
        };

        match (&self.login_url, &self.auth_token) {
            (Some(login_url), _) => Ok(AppCredentials::new(
                login_url.as_str(),
                self.login_id.clone().unwrap_or_default(),
                self.app_secret.clone().unwrap_or_default(),
            )
            .map_err(invalid)?
            .into()),
            (None, Some(auth_token)) => {
                let credentials = match &self.renew_url {
                    Some(renew_url) => AuthCredentials::new(renew_url.as_str(), auth_token.as_str()),
                    None => AuthCredentials::without_renew_url(auth_token.as_str()),
                };
                Ok(credentials.map_err(invalid)?.into())
            }
            (None, None) => Err(Error::raw(
                ErrorKind::MissingRequiredArgument,
                "either --login-url or --auth-token is required",
            )),
        }
    }
}

impl HttpArgs {
    pub fn http_config(&self) -> Result<HttpConfig, Error> {
        let proxy = ProxyConfig::new(self.proxy.as_deref().unwrap_or_default())?
            .try_with_url_from_env()?;
        let timeout = Duration::from_secs(self.timeout_secs);

        Ok(HttpConfig::new(timeout, timeout, proxy))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        http_args: HttpArgs,
        #[command(subcommand)]
        command: Commands,
    }

    fn auth_args(args: &[&str]) -> Result<AuthInputArgs, Error> {
        let cli = TestCli::try_parse_from(
            ["cli", "retrieve-token"].iter().chain(args.iter()).copied(),
        )?;
        match cli.command {
            Commands::RetrieveToken {
                input_auth_args, ..
            } => Ok(input_auth_args),
            Commands::Read { .. } => unreachable!(),
        }
    }

    #[test]
    fn login_arguments_build_app_credentials() {
        let args = auth_args(&[
            "--login-url",
            "https://example.com/login/rest/",
            "--login-id",
            "someLoginId",
            "--app-secret",
            "someSecret",
        ])
        .unwrap();

        assert_matches!(args.credentials().unwrap(), Credentials::App(app) => {
            assert_eq!(app.login_url(), "https://example.com/login/rest/");
            assert_eq!(app.login_id(), "someLoginId");
        });
    }

    #[test]
    fn token_arguments_build_auth_credentials() {
        let fixed = auth_args(&["--auth-token", "someToken"]).unwrap();
        assert_matches!(fixed.credentials().unwrap(), Credentials::Auth(auth) => {
            assert_eq!(auth.renew_url(), None);
        });

        let renewable = auth_args(&[
            "--auth-token",
            "someToken",
            "--renew-url",
            "https://example.com/authToken/1",
        ])
        .unwrap();
        assert_matches!(renewable.credentials().unwrap(), Credentials::Auth(auth) => {
            assert_eq!(auth.renew_url(), Some("https://example.com/authToken/1"));
        });
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let args = auth_args(&[]).unwrap();
        assert_eq!(
            args.credentials().unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn login_url_needs_id_and_secret() {
        assert!(auth_args(&["--login-url", "https://example.com/login/rest/"]).is_err());
        assert!(
            auth_args(&[
                "--login-url",
                "https://example.com/",
                "--login-id",
                "id",
                "--app-secret",
                "secret",
                "--auth-token",
                "token",
            ])
            .is_err()
        );
    }

    #[test]
    fn http_arguments_build_config() {
        let cli = TestCli::try_parse_from([
            "cli",
            "--timeout-secs",
            "9",
            "--proxy",
            "http://localhost:8888",
            "retrieve-token",
            "--auth-token",
            "t",
        ])
        .unwrap();

        let config = cli.http_args.http_config().unwrap();

        assert_eq!(config.timeout, Duration::from_secs(9));
        assert_eq!(config.proxy.url(), Some("http://localhost:8888/".to_string()));
    }
}
