//! llmstream - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use llmstream::bedrock::{stream_chat, BedrockClient, ChatParams};
use llmstream::cli::{Args, Commands, Config};
use llmstream::ollama::{ChatRequest, GenerateRequest, OllamaClient, StreamItem};
use llmstream::pricing::{self, BEDROCK_PRICING, OLLAMA_PRICING};
use llmstream::{logging, Message, MessageContent};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;

    logging::init(args.log_level().unwrap_or(config.logging.level.as_str()));

    match args.command {
        Commands::Chat {
            prompt,
            model,
            max_tokens,
            candidates,
            system,
        } => {
            let model = model.unwrap_or_else(|| config.bedrock.default_model.clone());
            let params = ChatParams::new(model)
                .max_tokens(max_tokens.unwrap_or(config.bedrock.max_tokens))
                .candidates(candidates);
            run_bedrock_chat(&config, params, system, prompt).await
        }
        Commands::Generate {
            prompt,
            model,
            system,
            no_stream,
        } => {
            let client = OllamaClient::with_base_url(&config.ollama_url())?;
            let model = model.unwrap_or_else(|| config.ollama.default_model.clone());
            let mut request = GenerateRequest::new(model, prompt);
            if let Some(system) = system {
                request = request.system(system);
            }

            if no_stream {
                println!("{}", client.generate(&request).await?);
                return Ok(());
            }
            let stream = client.generate_stream(&request).await?;
            print_fragments(stream).await
        }
        Commands::OllamaChat {
            prompt,
            model,
            system,
        } => {
            let client = OllamaClient::with_base_url(&config.ollama_url())?;
            let mut messages = Vec::new();
            if let Some(system) = system {
                messages.push(Message::system(system));
            }
            messages.push(Message::user(prompt));

            let model = model.unwrap_or_else(|| config.ollama.default_model.clone());
            let request = ChatRequest::new(model, messages);
            let stream = client.chat_stream(&request).await?;
            print_fragments(stream).await
        }
        Commands::Models => {
            let client = OllamaClient::with_base_url(&config.ollama_url())?;
            let models = client.list_models().await?;
            if models.is_empty() {
                println!("No models installed. Pull one with: llmstream pull <name>");
            }
            for model in models {
                println!("{:<40} {}", model.name.bold(), model.description().dimmed());
            }
            Ok(())
        }
        Commands::Pull { name } => {
            let client = OllamaClient::with_base_url(&config.ollama_url())?;
            pull(&client, &name).await
        }
        Commands::Embed { prompt, model } => {
            let client = OllamaClient::with_base_url(&config.ollama_url())?;
            let model = model.unwrap_or_else(|| config.ollama.default_model.clone());
            let embedding = client.embeddings(&model, &prompt).await?;
            println!("{}", serde_json::to_string(&embedding)?);
            Ok(())
        }
        Commands::Pricing => {
            for (model, price) in BEDROCK_PRICING.iter().chain(OLLAMA_PRICING.iter()) {
                println!("{:<48} {}", model.bold(), price);
            }
            Ok(())
        }
    }
}

/// Stream a Bedrock reply, printing the first candidate as it grows
async fn run_bedrock_chat(
    config: &Config,
    params: ChatParams,
    system: Option<String>,
    prompt: String,
) -> Result<()> {
    let client = BedrockClient::from_region(&config.bedrock.region).await;

    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));

    let mut snapshots = stream_chat(&client, messages, &params).await?;
    let mut printed = 0;
    let mut last = None;
    let mut stdout = std::io::stdout();

    while let Some(snapshot) = snapshots.next().await {
        let snapshot = snapshot?;
        if let Some(reply) = snapshot.last() {
            let text = reply.text();
            write!(stdout, "{}", &text[printed..])?;
            stdout.flush()?;
            printed = text.len();
        }
        last = Some(snapshot);
    }
    println!();

    if let Some(MessageContent::Candidates(slots)) =
        last.as_ref().and_then(|s| s.last()).map(|m| &m.content)
    {
        for (i, slot) in slots.iter().enumerate().skip(1) {
            println!("\n{}\n{}", format!("--- candidate {} ---", i + 1).cyan(), slot);
        }
    }
    if let Some(price) = pricing::lookup(&params.model) {
        println!("{}", format!("Pricing: {}", price).dimmed());
    }
    Ok(())
}

/// Print Ollama fragments as they arrive, then the generation statistics
async fn print_fragments(mut stream: llmstream::ollama::ItemStream) -> Result<()> {
    let mut stdout = std::io::stdout();

    while let Some(item) = stream.next().await {
        match item? {
            StreamItem::Fragment(text) => {
                write!(stdout, "{}", text)?;
                stdout.flush()?;
            }
            StreamItem::Done(completion) => {
                println!("\n\n{} {}", "Generation stats:".cyan(), completion.stats);
            }
        }
    }
    Ok(())
}

/// Pull a model with a progress bar
async fn pull(client: &OllamaClient, name: &str) -> Result<()> {
    println!("Pulling model {}...", name.bold());
    let mut progress = client.pull_model(name).await?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("=>-"),
    );

    while let Some(update) = progress.next().await {
        let update = update?;
        if let Some(pct) = update.percentage() {
            pb.set_position(pct as u64);
        }
        pb.set_message(update.describe());
    }

    pb.finish_with_message("done");
    println!("{}", "Model pull completed!".green());
    Ok(())
}
