//! Command-line argument parsing for llmstream
//!
//! Provides clap-based CLI with one subcommand per adapter operation and
//! verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// llmstream - Stream model output from Bedrock or a local Ollama daemon
#[derive(Parser, Debug)]
#[command(name = "llmstream")]
#[command(version)]
#[command(about = "Stream model output from AWS Bedrock or a local Ollama daemon", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: default (info), -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Stream a chat reply from Bedrock
    Chat {
        /// Prompt text
        prompt: String,

        /// Bedrock model id (config default if omitted)
        #[arg(short, long)]
        model: Option<String>,

        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Number of candidate slots to display
        #[arg(short = 'n', long, default_value_t = 1)]
        candidates: usize,

        /// System instruction
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Generate text with a local Ollama model
    Generate {
        /// Prompt text
        prompt: String,

        /// Ollama model (config default if omitted)
        #[arg(short, long)]
        model: Option<String>,

        /// System text
        #[arg(short, long)]
        system: Option<String>,

        /// Wait for the full response instead of streaming
        #[arg(long)]
        no_stream: bool,
    },

    /// Stream a chat reply from a local Ollama model
    OllamaChat {
        /// Prompt text
        prompt: String,

        /// Ollama model (config default if omitted)
        #[arg(short, long)]
        model: Option<String>,

        /// System instruction
        #[arg(short, long)]
        system: Option<String>,
    },

    /// List installed Ollama models
    Models,

    /// Pull (download) an Ollama model
    Pull {
        /// Model name, e.g. qwen2.5-coder:3b
        name: String,
    },

    /// Print the embedding vector for a prompt
    Embed {
        /// Prompt text
        prompt: String,

        /// Ollama model (config default if omitted)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show the price table
    Pricing,
}

impl Args {
    /// Log filter implied by the verbosity flags, if they override the config
    pub fn log_level(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
