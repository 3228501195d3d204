use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use integration_hub::features::builtin_catalog;
use integration_hub::manifest::ManifestLoader;
use integration_hub::observability::TracingLogger;
use integration_hub::registry::{DryRunHost, ModuleResolver, RegistrationEngine};

const X_CORRELATION_ID: &str = "x-correlation-id";

#[derive(Parser)]
#[command(name = "hub-cli")]
#[command(about = "Management CLI for the integration hub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dry-run registration of a manifest against the built-in modules
    Check {
        #[arg(short, long, default_value = "routes.json")]
        manifest: PathBuf,
    },
    /// Call the hub index and show the correlation id it answered with
    Ping {
        #[arg(short, long, default_value = "http://localhost:8790/api")]
        url: String,

        /// Correlation id to send; the hub generates one when omitted
        #[arg(short, long)]
        correlation_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { manifest } => {
            let engine = RegistrationEngine::new(
                ModuleResolver::new(builtin_catalog()).into(),
                TracingLogger::new("hub-cli"),
            );
            let mut host = DryRunHost::new();
            let report = engine.register_from(&ManifestLoader::from_path(&manifest), &mut host);

            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.manifest_error.is_some() || !report.skipped.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Ping { url, correlation_id } => {
            let mut headers = HeaderMap::new();
            if let Some(id) = correlation_id {
                headers.insert(X_CORRELATION_ID, HeaderValue::from_str(&id)?);
            }

            let res = reqwest::Client::new()
                .get(url.trim_end_matches('/'))
                .headers(headers)
                .send()
                .await?;

            let echoed = res
                .headers()
                .get(X_CORRELATION_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<missing>")
                .to_string();
            println!("X-Correlation-ID: {}", echoed);
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: hub returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
