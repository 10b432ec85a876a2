use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info, warn};

use prompt_template::config::{self, Config, STDOUT_PATH};
use prompt_template::logging;
use prompt_template::validators::{validate_file_exists, validate_output_parent};
use prompt_template::{RenderRequest, render};

/// Render a documents/history/question prompt from the built-in template.
#[derive(Debug, Parser)]
#[command(name = "prompt-template", version, about)]
struct Cli {
    /// JSON or TOML file holding `documents`, `history` and `question`
    #[arg(long, value_name = "FILE", conflicts_with_all = ["documents", "history", "question", "question_file"])]
    request: Option<String>,

    /// File whose contents fill the documents section
    #[arg(long, value_name = "FILE")]
    documents: Option<String>,

    /// File whose contents fill the history section
    #[arg(long, value_name = "FILE")]
    history: Option<String>,

    /// Question text
    #[arg(long, value_name = "TEXT", conflicts_with = "question_file")]
    question: Option<String>,

    /// File whose contents fill the question section
    #[arg(long, value_name = "FILE")]
    question_file: Option<String>,

    /// Write the prompt to FILE instead of stdout (`-` forces stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,
}

/// Validates an input path and returns it with `~` expanded.
fn resolve_input(label: &str, path: &str) -> Result<PathBuf> {
    if let Some(error) = validate_file_exists(path) {
        bail!("--{}: {}: {}", label, error, path);
    }
    Ok(Config::expand_tilde(path))
}

fn read_input(label: &str, path: &str) -> Result<String> {
    let expanded = resolve_input(label, path)?;
    fs::read_to_string(&expanded)
        .with_context(|| format!("Failed to read {} from {}", label, expanded.display()))
}

fn build_request(cli: &Cli) -> Result<RenderRequest> {
    if let Some(ref path) = cli.request {
        return RenderRequest::load(&resolve_input("request", path)?);
    }

    let documents = match cli.documents {
        Some(ref path) => read_input("documents", path)?,
        None => String::new(),
    };
    let history = match cli.history {
        Some(ref path) => read_input("history", path)?,
        None => String::new(),
    };
    let question = match (&cli.question, &cli.question_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_input("question-file", path)?,
        (None, None) => String::new(),
    };

    Ok(RenderRequest::new(documents, history, question))
}

/// The `--output` flag wins over `paths.output`; `-` on either means stdout.
fn resolve_output(flag: Option<&str>, config: &Config) -> Option<PathBuf> {
    match flag {
        Some(STDOUT_PATH) => None,
        Some(path) => Some(Config::expand_tilde(path)),
        None => config.output_path(),
    }
}

fn write_prompt(prompt: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(error) = validate_output_parent(&path.to_string_lossy()) {
                bail!("--output: {}: {}", error, path.display());
            }
            fs::write(path, prompt)
                .with_context(|| format!("Failed to write prompt to {}", path.display()))?;
            info!(path = ?path, bytes = prompt.len(), "prompt_written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start_time = Instant::now();

    let logging_context = match logging::init(&config::resolve_log_level()) {
        Ok(ctx) => {
            logging::cleanup_old_logs(&ctx.log_directory);
            Some(ctx)
        }
        Err(e) => {
            eprintln!("warning: logging disabled: {}", e);
            None
        }
    };

    let loaded_config = config::load_config();

    debug!(
        config_path = %loaded_config.config_path.display(),
        status = ?loaded_config.status,
        "config_loaded"
    );
    if let Some(ref message) = loaded_config.project_error {
        eprintln!("warning: {}", message);
    }

    let request = build_request(&cli)?;
    info!(
        documents_len = request.documents.len(),
        history_len = request.history.len(),
        question_len = request.question.len(),
        "request_loaded"
    );

    for (field, section) in request.delimiter_collisions() {
        warn!(
            field = field.tag(),
            delimiter = section.close_tag(),
            "input_contains_delimiter"
        );
    }

    let prompt = render(&request);
    debug!(bytes = prompt.len(), "prompt_rendered");

    let output = resolve_output(cli.output.as_deref(), &loaded_config.config);
    write_prompt(&prompt, output.as_deref())?;

    if let Some(ctx) = logging_context {
        info!(
            session_id = %ctx.session_id,
            duration_secs = start_time.elapsed().as_secs_f64(),
            "session_end"
        );
    }

    Ok(())
}
