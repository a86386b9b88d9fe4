//! propagation-guard
//!
//! Operator tool for the endpoint-aware propagation policy.
//!
//! # Architecture Overview
//!
//! ```text
//!   guard.toml ──▶ config ──▶ RouteTable (live, hot-reloadable)
//!                    │              │
//!                    ▼              ▼
//!              Propagation ◀── RouteClassifier
//!            (trust_all │ disable_all │ public_endpoints)
//!                    │
//!     inbound ───────┼──▶ extract ──▶ Context (neutral on public routes)
//!     outbound ◀─────┴─── inject (always standard W3C)
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use opentelemetry::baggage::BaggageExt;
use opentelemetry::trace::TraceContextExt;
use serde_json::{json, Value};

use propagation_guard::config::{self, ConfigWatcher, GuardConfig};
use propagation_guard::observability::{logging, metrics};
use propagation_guard::propagation::{Propagation, TextMapCarrier};
use propagation_guard::routing::{RouteClassifier, RouteTable};

#[derive(Parser)]
#[command(name = "propagation-guard")]
#[command(about = "Inspect and exercise the trace context propagation policy", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "guard.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and summarize routes
    Check,
    /// Classify request paths as public or trusted
    Classify {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Run inbound extraction for a request path with the given headers
    Extract {
        path: String,
        /// Inbound header as `name=value` (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
    /// Watch the configuration file and republish routes on change
    Watch,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load_config(&cli.config)?;
    logging::init_logging(&config.observability)?;
    metrics::describe_metrics();

    tracing::debug!(
        config = ?cli.config,
        mode = %config.propagation.mode,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let table = Arc::new(RouteTable::new());
    table.publish_config(&config.routes)?;
    let propagation = Propagation::from_config(&config.propagation, table.clone());

    match cli.command {
        Commands::Check => print_json(&summary(&config))?,
        Commands::Classify { paths } => {
            let classifier = RouteClassifier::new(table.clone())
                .with_unpublished(config.propagation.unpublished_routes);
            let results: Vec<Value> = paths
                .iter()
                .map(|path| json!({ "path": path, "classification": classifier.classify(path) }))
                .collect();
            print_json(&Value::Array(results))?;
        }
        Commands::Extract { path, headers } => {
            let headers: HashMap<String, String> = headers.into_iter().collect();
            let cx = propagation.extract(&TextMapCarrier::new(&headers).with_path(&path));

            let span = cx.span();
            let span_context = span.span_context();
            let baggage: HashMap<String, String> = cx
                .baggage()
                .iter()
                .map(|(k, (v, _))| (k.to_string(), v.to_string()))
                .collect();

            print_json(&json!({
                "path": path,
                "mode": propagation.mode().as_str(),
                "trace_id": span_context.is_valid().then(|| span_context.trace_id().to_string()),
                "span_id": span_context.is_valid().then(|| span_context.span_id().to_string()),
                "baggage": baggage,
            }))?;
        }
        Commands::Watch => {
            let (watcher, updates) = ConfigWatcher::new(&cli.config);
            let _watcher = watcher.run()?;
            let reloader = config::spawn_route_reloader(table.clone(), propagation.mode(), updates);

            tracing::info!(mode = %propagation.mode(), "Watching configuration; Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
            reloader.abort();
            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}

fn summary(config: &GuardConfig) -> Value {
    let routes: Vec<Value> = config
        .routes
        .iter()
        .map(|r| json!({ "name": r.name, "pattern": r.pattern, "order": r.order, "public": r.public }))
        .collect();
    json!({
        "mode": config.propagation.mode.as_str(),
        "unpublished_routes": config.propagation.unpublished_routes,
        "public_routes": config.public_route_count(),
        "routes": routes,
    })
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
