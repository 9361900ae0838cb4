//! The `market-vision key` command: manage the stored Gemini API key.

use clap::{Args, Subcommand};
use dialoguer::Password;
use market_vision_core::{Config, CredentialStore};

use super::credential::{mask_key, ConfigFileStore, BUILD_TIME_KEY};
use super::theme::market_vision_theme;

/// Arguments for the `key` command.
#[derive(Args, Debug)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Store a key (prompts when KEY is omitted)
    Set {
        /// The Gemini API key
        key: Option<String>,
    },

    /// Show the key in use, masked
    Show,

    /// Remove the stored key
    Clear,
}

/// Execute the key command.
pub async fn execute(args: KeyArgs) -> anyhow::Result<()> {
    let mut store = ConfigFileStore::new(Config::default_path());

    match args.command {
        KeyCommand::Set { key } => {
            let key = match key {
                Some(key) => key,
                None => Password::with_theme(&market_vision_theme())
                    .with_prompt("Gemini API key")
                    .interact()?,
            };
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("Refusing to store an empty key; use `market-vision key clear`");
            }
            store.save(key)?;
            println!("API key saved to {}", store.path().display());
            if BUILD_TIME_KEY.is_some_and(|k| !k.is_empty()) {
                eprintln!("Note: this build carries a default key, which takes precedence.");
            }
        }

        KeyCommand::Show => match describe(BUILD_TIME_KEY, store.load().as_deref()) {
            Some(line) => println!("{line}"),
            None => println!("No API key configured"),
        },

        KeyCommand::Clear => {
            store.save("")?;
            println!("Stored API key removed");
        }
    }

    Ok(())
}

/// Which key is in effect and where it comes from.
fn describe(build_time: Option<&str>, stored: Option<&str>) -> Option<String> {
    match (build_time.filter(|k| !k.is_empty()), stored) {
        (Some(key), _) => Some(format!("{} (built in)", mask_key(key))),
        (None, Some(key)) => Some(format!("{} (config file)", mask_key(key))),
        (None, None) => None,
    }
}
