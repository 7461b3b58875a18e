// ABOUTME: Interactive command-line front end for the nutrition assistant
// ABOUTME: Reads user lines from stdin, runs one agent turn per line and prints the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Assistant CLI
//!
//! ```text
//! nutrition-assistant --meal-plan plan.txt --preferences prefs.txt
//! ```
//!
//! Type a message and press enter. `exit`, `quit` or end of input ends the
//! session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pierre_nutrition_assistant::{
    agent::{read_context_file, NutritionAssistant},
    config::{AssistantConfig, LogLevel},
    logging::LoggingConfig,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "nutrition-assistant")]
#[command(about = "Pierre Nutrition Assistant - food stats, recipes and shopping lists")]
struct Args {
    /// File containing the user's meal plan
    #[arg(long)]
    meal_plan: Option<PathBuf>,

    /// File containing the user's food preferences
    #[arg(long)]
    preferences: Option<PathBuf>,

    /// Session id (generated when omitted)
    #[arg(long)]
    session: Option<String>,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::from_env();
    if args.verbose {
        logging = logging.with_level(LogLevel::Debug);
    }
    logging.init()?;

    let mut config = AssistantConfig::from_env().context("Failed to load configuration")?;
    if let Some(model) = args.model {
        config = config.with_model(model);
    }

    let meal_plan = match args.meal_plan {
        Some(ref path) => read_context_file(path).await?,
        None => String::new(),
    };
    let preferences = match args.preferences {
        Some(ref path) => read_context_file(path).await?,
        None => String::new(),
    };

    let assistant = NutritionAssistant::from_config(&config)?;
    let session_id = match args.session {
        Some(id) => {
            assistant.start_session(&id, &meal_plan, &preferences).await?;
            id
        }
        None => assistant.start_new_session(&meal_plan, &preferences).await?,
    };
    let agent = assistant.agent();
    info!(
        %session_id,
        model = %config.llm.model,
        tools = ?agent.tools().tool_names(),
        max_steps = agent.config().max_steps,
        "Session ready"
    );

    run_repl(&assistant, &session_id).await
}

async fn run_repl(assistant: &NutritionAssistant, session_id: &str) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            break;
        }

        let outcome = assistant.send(session_id, text).await?;
        stdout
            .write_all(format!("assistant> {}\n", outcome.reply).as_bytes())
            .await?;
    }

    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
