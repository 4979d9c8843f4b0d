//! waypost - route API requests from the command line.
//!
//! Builds a [`Router`](waypost::Router) from configuration and prints
//! routed responses as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use waypost::config::{Config, Credentials};
use waypost::{RoutedRequest, Router, WaypostError};

/// Waypost - API routing and caching core.
#[derive(Parser)]
#[command(name = "waypost")]
#[command(version = waypost::PKG_VERSION)]
#[command(about = "Route requests across upstream API providers")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// NewsAPI key.
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true, global = true)]
    newsapi_key: Option<String>,

    /// GitHub token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    github_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Route one request and print the response.
    Route {
        category: String,
        action: String,
        /// Request parameter as key=value. Values parse as JSON when they can.
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
    /// Route with fallback providers tried in order.
    Fallback {
        category: String,
        action: String,
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
        /// Fallback provider ids, comma-separated.
        #[arg(long, value_delimiter = ',', required = true)]
        via: Vec<String>,
    },
    /// List registered providers with usage and rate-limit state.
    Providers,
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn request(category: String, action: String, params: Vec<(String, Value)>) -> RoutedRequest {
    RoutedRequest::new(category, action).parameters(params.into_iter().collect::<Map<_, _>>())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waypost=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let credentials = Credentials {
        newsapi_key: args.newsapi_key,
        github_token: args.github_token,
    };
    let router = config.into_builder(&credentials)?.build()?;

    info!(
        version = waypost::PKG_VERSION,
        providers = router.registry().len(),
        "waypost ready"
    );

    let output = match args.command {
        Command::Route {
            category,
            action,
            params,
        } => serde_json::to_value(router.route(&request(category, action, params)).await)?,
        Command::Fallback {
            category,
            action,
            params,
            via,
        } => {
            let response = router
                .route_with_fallback(&request(category, action, params), via.as_slice())
                .await?;
            serde_json::to_value(response)?
        }
        Command::Providers => providers(&router)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn providers(router: &Router) -> Result<Value, WaypostError> {
    let registry = router.registry();
    let entries = registry
        .providers()
        .into_iter()
        .map(|p| -> Result<Value, WaypostError> {
            Ok(json!({
                "provider": serde_json::to_value(p.as_ref())?,
                "usage": serde_json::to_value(registry.usage(&p.id))?,
                "rateLimit": serde_json::to_value(registry.rate_limit_status(&p.id))?,
            }))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(entries))
}
