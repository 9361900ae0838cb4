//! The `market-vision analyze` command.

use clap::Args;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use market_vision_core::{
    ClientState, Config, GeminiClient, HttpRelayClient, LocalRelay, Orchestrator, Relay,
    RelayClient,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::credential::{ConfigFileStore, BUILD_TIME_KEY};
use super::render::format_analysis;
use super::theme::{market_vision_theme, print_banner};

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Chart image (jpeg, png, webp, gif, bmp, heic)
    pub image: PathBuf,

    /// Relay analyze URL; the relay runs in-process when neither this nor
    /// `[client] relay_url` is set
    #[arg(long, env = "MARKET_VISION_RELAY_URL")]
    pub relay_url: Option<String>,

    /// Print the raw analysis JSON instead of the formatted report
    #[arg(long)]
    pub json: bool,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let relay = relay_client(args.relay_url.as_deref(), config);
    let store = ConfigFileStore::new(Config::default_path());
    let mut orchestrator = Orchestrator::new(relay, Box::new(store), BUILD_TIME_KEY);

    if !orchestrator.has_credential() {
        let key = prompt_for_key()?;
        // A failed save has already been logged; the key still works for this run.
        let _ = orchestrator.set_credential(key);
    }

    let path = expand_path(&args.image);
    orchestrator.select_image(&path).await?;
    tracing::debug!(
        "Selected {} ({} bytes of data URI)",
        path.display(),
        orchestrator.image().map_or(0, |image| image.len())
    );

    let spinner = spinner();
    let mut states = orchestrator.subscribe();
    let watcher = {
        let spinner = spinner.clone();
        tokio::spawn(async move {
            while states.changed().await.is_ok() {
                if *states.borrow() == ClientState::Loading {
                    spinner.enable_steady_tick(Duration::from_millis(100));
                }
            }
        })
    };

    orchestrator.analyze().await;
    watcher.abort();
    spinner.finish_and_clear();

    match orchestrator.state() {
        ClientState::Success => {
            let Some(analysis) = orchestrator.analysis() else {
                anyhow::bail!("Analysis finished without a result");
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(analysis)?);
            } else {
                print!("{}", format_analysis(analysis));
            }
            Ok(())
        }
        ClientState::Error => {
            anyhow::bail!(
                "{}",
                orchestrator.error().unwrap_or("Failed to analyze image")
            )
        }
        state => anyhow::bail!("Analysis did not run (state: {state:?})"),
    }
}

/// HTTP relay when a URL is configured, otherwise an in-process relay.
fn relay_client(flag: Option<&str>, config: &Config) -> Arc<dyn RelayClient> {
    match flag.or(config.client.relay_url.as_deref()) {
        Some(url) => {
            tracing::debug!("Using relay at {url}");
            Arc::new(HttpRelayClient::new(url))
        }
        None => {
            tracing::debug!(
                "Using in-process relay ({} via {})",
                config.gemini.model,
                config.gemini.endpoint
            );
            let model = GeminiClient::from_config(&config.gemini);
            Arc::new(LocalRelay::new(Relay::new(Arc::new(model))))
        }
    }
}

fn prompt_for_key() -> anyhow::Result<String> {
    if !console::Term::stderr().features().is_attended() {
        anyhow::bail!(
            "No Gemini API key configured.\n  \
             Run `market-vision key set <KEY>` or build with MARKET_VISION_GEMINI_API_KEY set."
        );
    }

    print_banner();
    let key: String = Password::with_theme(&market_vision_theme())
        .with_prompt("Gemini API key")
        .interact()?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("An API key is required to analyze charts");
    }
    Ok(key.to_string())
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Analyzing chart...");
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_tilde() {
        let home = std::env::var("HOME").unwrap_or_default();
        let expanded = expand_path(Path::new("~/charts/eurusd.png"));
        assert_eq!(expanded, PathBuf::from(format!("{home}/charts/eurusd.png")));
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(
            expand_path(Path::new("charts/eurusd.png")),
            PathBuf::from("charts/eurusd.png")
        );
    }
}
