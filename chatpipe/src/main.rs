// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use chatpipe::backend::ReqwestAgentBackend;
use chatpipe::config;
use chatpipe::render::{self, TerminalRenderer};
use chatpipe::session::{ChatSession, SessionOptions, SubmitOutcome};

use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chatpipe", about = "Chat with a streaming agent from the terminal")]
struct Cli {
    /// Path to the chatpipe.yaml config file (optional)
    #[arg(long, default_value = "chatpipe.yaml", env = "CHATPIPE_CONFIG")]
    config: String,

    /// Agent server base URL, overrides the config file
    #[arg(long, env = "CHATPIPE_ENDPOINT")]
    endpoint: Option<String>,

    /// Agent id, overrides the config file
    #[arg(long, env = "CHATPIPE_AGENT")]
    agent: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = config::FileSource {
        path: std::path::PathBuf::from(&cli.config),
        required: false,
    };
    let mut config = match config::load_config(&source) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if let Some(endpoint) = cli.endpoint.as_deref() {
        config.endpoint = match config::validate_endpoint(endpoint) {
            Ok(e) => e,
            Err(e) => {
                tracing::error!("invalid --endpoint: {e}");
                std::process::exit(1);
            }
        };
    }
    if let Some(agent) = cli.agent {
        config.agent_id = agent;
    }

    let backend = match ReqwestAgentBackend::from_config(&config) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!("failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        url = backend.stream_url(),
        history = ?config.history,
        on_malformed_frame = ?config.on_malformed_frame,
        "chatpipe ready"
    );

    let stdout = Arc::new(Mutex::new(std::io::stdout()));
    let mut session = ChatSession::new(Arc::new(backend), SessionOptions::from(&config))
        .with_observer(Box::new(TerminalRenderer::new(stdout.clone())));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&stdout);

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("failed to read stdin: {e}");
                break;
            }
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => {
                print!("{}", render::format_transcript(session.entries()));
                continue;
            }
            _ => {}
        }

        if let SubmitOutcome::Failed { error, .. } = session.submit(&line).await {
            eprintln!("error: {error}");
        }
    }
}

fn print_prompt(stdout: &Mutex<std::io::Stdout>) {
    if let Ok(mut out) = stdout.lock() {
        let _ = write!(out, "> ");
        let _ = out.flush();
    }
}
