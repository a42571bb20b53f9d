//! attend-cli - command-line frontend for the Attend translation service
//!
//! # Subcommands
//! - `translate <sentence> [--json] [--local] [--config PATH] [--explain]`
//! - `status` - show server health

use attend_core::{AttendConfig, ExtractedContext, PostgresRenderer, QueryRenderer, Translator};
use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:5001";
const DEFAULT_CONFIG: &str = "attend.toml";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "attend-cli",
    version,
    about = "Attend - translate attendance questions into SQL"
)]
struct Cli {
    /// Attend HTTP server URL (overrides ATTEND_HTTP_URL env var)
    #[arg(long, env = "ATTEND_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Translate one sentence into SQL
    Translate {
        /// Sentence to translate
        sentence: String,

        /// Print the full `{"sql", "query"}` response as JSON
        #[arg(long)]
        json: bool,

        /// Translate in-process instead of calling the server
        #[arg(long)]
        local: bool,

        /// Config file used by --local
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: String,

        /// Print what the extractor found before the result
        #[arg(long, requires = "local")]
        explain: bool,
    },

    /// Show Attend server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

/// The translate response from POST /translate
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub sql: String,
    pub query: serde_json::Value,
}

// ============================================================================
// Output Formatting
// ============================================================================

/// Human-readable (`false`) or pretty JSON (`true`) rendering of a translate body.
pub fn format_translation(body: &serde_json::Value, json_output: bool) -> anyhow::Result<String> {
    if json_output {
        return Ok(serde_json::to_string_pretty(body)?);
    }

    let resp: TranslateResponse = serde_json::from_value(body.clone())?;
    let intent = resp.query["intent"].as_str().unwrap_or("?");
    let predicates = resp.query["predicates"]
        .as_array()
        .map(|p| p.len())
        .unwrap_or(0);

    Ok(format!(
        "{}\n\nIntent:     {}\nPredicates: {}",
        resp.sql, intent, predicates
    ))
}

pub fn format_context(context: &ExtractedContext) -> String {
    let mut lines = vec![
        format!(
            "Date entity:  {}",
            context.date_entity.as_deref().unwrap_or("(none)")
        ),
        format!("Time phrases: {}", join_or_none(&context.time_phrases)),
        format!("Entity times: {}", join_or_none(&context.entity_times)),
    ];

    for (kind, text) in &context.named_references {
        lines.push(format!("{:<13} {}", format!("{}:", kind.label()), text));
    }

    lines.join("\n")
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

// ============================================================================
// Translation Paths
// ============================================================================

/// In-process translation; returns the same body shape as POST /translate.
fn translate_local(
    translator: &Translator,
    config: &AttendConfig,
    sentence: &str,
) -> anyhow::Result<serde_json::Value> {
    let query = translator.translate(sentence)?;
    let sql = PostgresRenderer::new(&config.schema).render(&query);
    Ok(serde_json::json!({
        "sql": sql,
        "query": query,
    }))
}

fn translate_remote(server: &str, sentence: &str) -> anyhow::Result<serde_json::Value> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let url = format!("{}/translate", server);
    let resp = match client
        .post(&url)
        .json(&serde_json::json!({ "query": sentence }))
        .send()
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("attend-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    let status = resp.status();
    let body: serde_json::Value = resp.json().unwrap_or_default();
    if !status.is_success() {
        eprintln!(
            "attend-cli: server returned {}: {}",
            status,
            body["error"].as_str().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }

    Ok(body)
}

fn do_translate(
    server: &str,
    sentence: &str,
    json_output: bool,
    local: bool,
    config_path: &str,
    explain: bool,
) -> anyhow::Result<()> {
    let body = if local {
        let config = AttendConfig::load(config_path)?;
        let translator = Translator::from_config(&config);
        if explain {
            let context = translator.extract_context(sentence)?;
            println!("{}\n", format_context(&context));
        }
        translate_local(&translator, &config, sentence)?
    } else {
        translate_remote(server, sentence)?
    };

    println!("{}", format_translation(&body, json_output)?);
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server);
    let resp = client.get(&url).send();

    match resp {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Attend server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:       {}", body["version"].as_str().unwrap_or("?"));
            println!("Extractor:     {}", body["extractor"].as_str().unwrap_or("?"));
        }
        Ok(r) => {
            let status = r.status();
            let body: serde_json::Value = r.json().unwrap_or_default();
            eprintln!(
                "attend-cli: server unhealthy (HTTP {}): {}",
                status,
                body["error"].as_str().unwrap_or("unknown")
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("attend-cli: cannot reach {} - {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Translate {
            sentence,
            json,
            local,
            config,
            explain,
        } => do_translate(&server, &sentence, json, local, &config, explain),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("attend-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
