use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use owo_colors::OwoColorize;
use serde_json::json;

use crate::config::{self, ProfileConfig};
use crate::valuation::client::{ValuationClient, build_payload};
use crate::valuation::provider::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, ProviderConfig, ValuationError, is_api_key_present,
};
use crate::valuation::request::ValuationRequest;

#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    /// Startup profile JSON file ('-' or omitted reads stdin).
    pub input: Option<PathBuf>,
    /// Model identifier (env: VAL_MODEL).
    #[arg(long)]
    pub model: Option<String>,
    /// Chat-completions endpoint URL (env: VAL_ENDPOINT).
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Request timeout in seconds (env: VAL_TIMEOUT).
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Config profile to load.
    #[arg(long)]
    pub profile: Option<String>,
    /// Output mode: text or json (env: VAL_OUTPUT).
    #[arg(long)]
    pub output: Option<String>,
    /// Shorthand for --output json.
    #[arg(long)]
    pub json: bool,
    /// Also write the JSON body to this file.
    #[arg(long)]
    pub save: Option<PathBuf>,
    /// Print the outbound request as JSON without calling the provider.
    #[arg(long)]
    pub dry_run: bool,
    /// Print token usage and latency on stderr.
    #[arg(long)]
    pub show_usage: bool,
    /// Print resolution diagnostics on stderr.
    #[arg(long)]
    pub verbose: bool,
    /// Suppress non-fatal stderr output.
    #[arg(long)]
    pub quiet: bool,
    /// Print version and build metadata.
    #[arg(long)]
    pub version: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

pub async fn run(args: EstimateArgs) -> Result<(), String> {
    if args.version {
        println!(
            "valuator {} (commit: {}, built: {})",
            env!("CARGO_PKG_VERSION"),
            env!("VAL_GIT_SHA"),
            env!("VAL_BUILD_TS"),
        );
        return Ok(());
    }

    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };

    let model = resolve_string(args.model.clone(), "VAL_MODEL", profile.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let endpoint = resolve_string(args.endpoint.clone(), "VAL_ENDPOINT", profile.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let timeout_secs = resolve_timeout(args.timeout, profile.timeout)?;
    let output = resolve_output(&args, &profile)?;

    let request = read_request(args.input.as_deref())?;
    request.validate().map_err(|err| err.to_string())?;

    let payload = build_payload(&model, &request);

    if args.verbose && !args.quiet {
        let timeout_display = timeout_secs
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".to_string());
        eprintln!(
            "endpoint={endpoint} model={model} timeout_secs={timeout_display} api_key_present={}",
            is_api_key_present()
        );
    }

    if args.dry_run {
        let body = json!({
            "dry_run": true,
            "model": model,
            "endpoint": endpoint,
            "output": output.as_str(),
            "messages": serde_json::to_value(&payload.messages).map_err(internal)?,
            "request": serde_json::to_value(&payload).map_err(internal)?,
        })
        .to_string();
        println!("{body}");
        if let Some(path) = &args.save {
            save_body(path, &body)?;
        }
        if args.show_usage && !args.quiet {
            eprintln!("usage: unavailable latency_ms=0 (dry-run)");
        }
        return Ok(());
    }

    let provider_config = ProviderConfig {
        endpoint,
        model,
        timeout_secs,
    };
    let client = ValuationClient::from_env(provider_config).map_err(|err| err.to_string())?;

    let started = Instant::now();
    let response = client
        .calculate(&request)
        .await
        .map_err(|err| err.to_string())?;
    let latency_ms = started.elapsed().as_millis();

    let body = serde_json::to_string(&response.result).map_err(internal)?;
    match output {
        OutputMode::Json => println!("{body}"),
        OutputMode::Text => {
            match response.result.valuation {
                Some(valuation) => println!("{} {valuation}", "Valuation:".bold()),
                None => println!(
                    "{} {}",
                    "Valuation:".bold(),
                    "model declined to estimate".dimmed()
                ),
            }
            println!("{} {}", "Analysis:".bold(), response.result.analysis);
        }
    }
    if let Some(path) = &args.save {
        save_body(path, &body)?;
    }

    if args.show_usage && !args.quiet {
        match response.usage {
            Some(usage) => eprintln!(
                "usage: prompt={} completion={} total={} latency_ms={latency_ms}",
                count(usage.prompt_tokens),
                count(usage.completion_tokens),
                count(usage.total_tokens),
            ),
            None => eprintln!("usage: unavailable latency_ms={latency_ms}"),
        }
    }

    Ok(())
}

fn internal(err: serde_json::Error) -> String {
    ValuationError::Internal {
        message: err.to_string(),
    }
    .to_string()
}

fn count(value: Option<u32>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// CLI flag > environment > profile.
fn resolve_string(
    cli: Option<String>,
    env_key: &str,
    profile: Option<String>,
) -> Option<String> {
    if let Some(value) = cli {
        return Some(value);
    }
    if let Ok(value) = env::var(env_key) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    profile
}

fn resolve_timeout(cli: Option<u64>, profile: Option<u64>) -> Result<Option<u64>, String> {
    if let Some(value) = cli {
        return Ok(Some(value));
    }
    if let Ok(raw) = env::var("VAL_TIMEOUT") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed
                .parse::<u64>()
                .map(Some)
                .map_err(|_| format!("Invalid VAL_TIMEOUT '{trimmed}'. Expected whole seconds."));
        }
    }
    Ok(profile)
}

fn resolve_output(args: &EstimateArgs, profile: &ProfileConfig) -> Result<OutputMode, String> {
    if args.json {
        return Ok(OutputMode::Json);
    }
    if let Some(value) = &args.output {
        return parse_output(value)
            .ok_or_else(|| format!("Invalid output '{value}'. Supported values: text, json."));
    }
    if let Ok(raw) = env::var("VAL_OUTPUT") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return parse_output(trimmed).ok_or_else(|| {
                format!("Invalid VAL_OUTPUT '{trimmed}'. Supported values: text, json.")
            });
        }
    }
    if let Some(value) = &profile.output {
        return parse_output(value).ok_or_else(|| {
            format!("Invalid profile output '{value}'. Supported values: text, json.")
        });
    }
    Ok(OutputMode::Text)
}

fn parse_output(value: &str) -> Option<OutputMode> {
    match value {
        "text" => Some(OutputMode::Text),
        "json" => Some(OutputMode::Json),
        _ => None,
    }
}

fn read_request(input: Option<&Path>) -> Result<ValuationRequest, String> {
    let raw = match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path).map_err(|err| {
            format!("Failed to read startup profile '{}': {err}", path.display())
        })?,
        _ => io::read_to_string(io::stdin())
            .map_err(|err| format!("Failed to read startup profile from stdin: {err}"))?,
    };
    serde_json::from_str(&raw).map_err(|err| format!("Failed to parse startup profile: {err}"))
}

fn save_body(path: &Path, body: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, body)
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))
}
