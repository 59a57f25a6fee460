use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use eatwise::{logging, AppConfig, Pipeline, PipelineRuntime};

const VOICE_PREFIX: &str = "/voice ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging
    logging::init();

    // 2. Config + collaborators
    let config = AppConfig::from_env().context("reading configuration")?;
    let runtime = PipelineRuntime::new();
    runtime
        .initialize(Pipeline::from_config(&config))
        .context("initializing pipeline")?;
    tracing::info!(location = %config.location, model = %config.model, "EatWise ready");

    // 3. Console loop
    println!("Ask about food, log a meal, find groceries or a restaurant. Prefix with '/voice ' for audio. 'quit' exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let (query, voice) = match line.strip_prefix(VOICE_PREFIX) {
            Some(rest) => (rest.trim(), true),
            None => (line, false),
        };

        let state = runtime.invoke(query, voice).await?;
        println!("[{}]\n{}", state.intent(), state.response_text());
        if let Some(path) = state.audio_path() {
            println!("[audio] {}", path);
        }
        if let Some(err) = state.error() {
            tracing::warn!("turn completed with diagnostics: {}", err);
        }
    }

    Ok(())
}
