use clap::Parser;
use record_session::commands::read::ReadCommand;
use record_session::commands::retrieve_token::RetrieveTokenCommand;
use record_session::dispatcher::{ResponseBody, RetryDispatcher};
use record_session::http::client::HttpClient;
use record_session::parameters::{Commands, HttpArgs, OutPutTokenFormat};
use record_session::token_client::HttpTokenClient;
use std::error::Error;
use std::io::Write;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "record-session-cli")]
struct Cli {
    /// Log authentication and retry activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(flatten)]
    http_args: HttpArgs,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let http_client = HttpClient::new(cli.http_args.http_config()?)
        .map_err(|e| format!("error creating http client: {}", e))?;

    match cli.command {
        Commands::RetrieveToken {
            input_auth_args,
            force_renew,
            output_token_format,
        } => {
            let token_client =
                HttpTokenClient::new(http_client, input_auth_args.credentials()?)?;
            let token = RetrieveTokenCommand::new(token_client).retrieve_token(force_renew)?;
            match output_token_format {
                OutPutTokenFormat::Plain => {
                    println!("{}", token.access_token());
                }
                OutPutTokenFormat::Json => {
                    let output = serde_json::to_string_pretty(&token)?;
                    println!("{}", output);
                }
            }
            Ok(())
        }
        Commands::Read {
            url,
            accept,
            input_auth_args,
        } => {
            let token_client =
                HttpTokenClient::new(http_client.clone(), input_auth_args.credentials()?)?;
            let command = ReadCommand::new(RetryDispatcher::new(token_client, http_client));
            let response = command.read(&url, &accept)?;

            match response.body() {
                ResponseBody::Text(text) => println!("{}", text),
                ResponseBody::Binary(bytes) => std::io::stdout().write_all(bytes)?,
            }
            if !response.is_success() {
                return Err(format!("read failed with status {}", response.status()).into());
            }
            Ok(())
        }
    }
}
