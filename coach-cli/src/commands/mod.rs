//! Subcommand implementations.

pub mod chat;
pub mod completion;
pub mod config;
pub mod documents;
pub mod language;
pub mod resources;
pub mod status;
pub mod upload;

use anyhow::{Context, Result};
use colored::Colorize;
use shared::{
    config::{client::ClientConfig, preferences::PreferenceStore},
    language::Translator,
    models::Notice,
};

use crate::api::CoachClient;

/// Settings resolved once at startup and handed to every command.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub translator: Translator,
    pub preferences: PreferenceStore,
}

impl AppContext {
    /// Client for the configured server.
    ///
    /// # Errors
    /// Fails when the server URL cannot host the API.
    pub fn client(&self) -> Result<CoachClient> {
        CoachClient::new(&self.config).context("failed to build the API client")
    }
}

/// Formats a notice in its kind's colour.
pub(crate) fn styled_notice(notice: &Notice) -> String {
    if notice.is_error() {
        notice.text.red().to_string()
    } else {
        notice.text.green().to_string()
    }
}

pub(crate) fn print_notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{}", styled_notice(notice));
    } else {
        println!("{}", styled_notice(notice));
    }
}
