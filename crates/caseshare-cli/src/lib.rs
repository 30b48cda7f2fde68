use anyhow::Context;
use caseshare_api_client::BatchProgress;
use serde::Serialize;

/// Shorten a file name for progress lines, appending "..." if truncated.
pub fn truncate_name(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Writes one line per progress change to stderr, keeping stdout for JSON.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    pub fn line(file_name: &str, percent: u8, status: &str) -> String {
        format!("{:<40} {:>3}%  {}", truncate_name(file_name, 40), percent, status)
    }
}

impl BatchProgress for ConsoleProgress {
    fn file_progress(&self, file_name: &str, percent: u8, status: &str) {
        eprintln!("{}", Self::line(file_name, percent, status));
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Initialize tracing for the CLI; logs go to stderr.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
