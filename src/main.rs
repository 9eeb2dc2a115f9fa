use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use graphql_mold::{Client, Config, ConfigError, EndpointConfig, Response};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Executes a GraphQL document and prints the response")]
struct Cli {
    #[arg(short, long, help = "Path to config file from working directory, default: graphql-mold.json")]
    config: Option<PathBuf>,
    #[arg(short, long, help = "Profile used from config file, default: default")]
    profile: Option<String>,
    #[arg(short, long, help = "Endpoint url, override config file")]
    url: Option<String>,
    #[arg(short, long, help = "File containing the document, read from stdin when omitted")]
    file: Option<PathBuf>,
    #[arg(long, help = "Variables as a JSON object")]
    variables: Option<String>,
    #[arg(short, long, help = "Name of the operation to execute")]
    operation_name: Option<String>,
    #[arg(short, long, help = "Attach request and response details to errors")]
    debug: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no endpoint was given and no config file was found")]
    NoEndpoint,
    #[error("unable to read document")]
    Document(#[source] std::io::Error),
    #[error("variables must be a JSON object: {0}")]
    Variables(String),
    #[error("unable to write output")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("error: {}", error);
            let mut source = std::error::Error::source(&error);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::from(2)
        }
    }
}

/// Returns whether the response came back without errors.
async fn run(args: Cli) -> Result<bool, CliError> {
    let config = Config::read_optional(args.config.as_deref())?;
    let endpoint = match (&args.url, &config) {
        (Some(url), _) => EndpointConfig::new(url.clone()),
        (None, Some(config)) => config.profile(args.profile.as_deref())?.clone(),
        (None, None) => return Err(CliError::NoEndpoint),
    };
    let debug = args.debug || config.as_ref().is_some_and(|config| config.debug);

    let document = read_document(args.file)?;
    let variables = parse_variables(args.variables.as_deref())?;

    tracing::debug!(url = %endpoint.url, "executing document");
    let client = Client::from_config(&endpoint)?.with_debug(debug);
    let Response { data, errors } = client
        .exec_raw(&document, args.operation_name.as_deref(), &variables)
        .await;

    if let Some(data) = data {
        println!("{}", serde_json::to_string_pretty(&Value::Object(data))?);
    }
    for error in errors.iter() {
        eprintln!("{}", serde_json::to_string(error)?);
    }
    Ok(errors.is_empty())
}

fn read_document(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(CliError::Document),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).map_err(CliError::Document)?;
            Ok(buffer)
        }
    }
}

fn parse_variables(variables: Option<&str>) -> Result<Map<String, Value>, CliError> {
    let Some(variables) = variables else {
        return Ok(Map::new());
    };
    match serde_json::from_str(variables) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CliError::Variables(format!("found {}", other))),
        Err(error) => Err(CliError::Variables(error.to_string())),
    }
}
