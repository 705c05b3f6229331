//! Terminal client for the RRC Support Coach.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use dotenv::dotenv;
use shared::{
    config::{client::ClientConfig, preferences::PreferenceStore},
    language::{Locale, Translator},
};
use tracing::debug;
use url::Url;

mod api;
mod commands;
mod debounce;
#[cfg(test)]
mod test_support;
mod tracer;

use commands::{AppContext, chat::ChatArgs, resources::ResourcesArgs};

/// Support Coach CLI
#[derive(Parser, Debug)]
#[command(name = "coach", version)]
#[command(about = "Chat with the support coach, manage its documents, and browse resources", long_about = None)]
struct Cli {
    /// Configuration file (YAML or JSON); defaults to the platform config directory
    #[arg(long, short = 'C', global = true, env = "COACH_CONFIG")]
    config: Option<PathBuf>,

    /// Backend root URL, overriding the configuration
    #[arg(long, global = true)]
    server: Option<Url>,

    /// Interface language for this run (en or es)
    #[arg(long, global = true)]
    lang: Option<Locale>,

    /// Model provider to request
    #[arg(long, global = true)]
    provider: Option<String>,

    /// File holding saved preferences such as the language
    #[arg(long, global = true, env = "COACH_PREFERENCES")]
    preferences: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the support coach
    Chat(ChatArgs),

    /// Upload a .txt or .pdf document for the coach to search
    Upload {
        /// Document to upload
        path: Option<PathBuf>,
    },

    /// Show backend health, document count and providers
    Status,

    /// Remove every uploaded document
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Browse the resource directory
    Resources(ResourcesArgs),

    /// Show the language menu or save a preferred language
    Lang {
        /// Language code to save (en or es)
        code: Option<String>,
    },

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml or json)
        #[arg(long, short, default_value = "yaml")]
        format: String,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell to generate the script for
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

fn build_context(cli: &Cli) -> Result<AppContext> {
    let mut config = ClientConfig::load_config(cli.config.clone())
        .context("failed to load configuration")?;
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(provider) = &cli.provider {
        config.provider = Some(provider.clone());
    }
    config.validate()?;

    let preferences = match &cli.preferences {
        Some(path) => PreferenceStore::new(path),
        None => PreferenceStore::open_default()
            .unwrap_or_else(|_| PreferenceStore::new("coach-preferences.json")),
    };
    let locale = preferences.resolve_language(cli.lang, config.language);

    Ok(AppContext {
        config,
        translator: Translator::new(locale),
        preferences,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(*shell);
            return Ok(());
        }
        Commands::Config { format } => {
            return commands::config::generate_config(format, &std::env::current_dir()?);
        }
        _ => {}
    }

    let ctx = build_context(&cli)?;
    tracer::init_tracing(&ctx.config.log_level);
    debug!(
        server = %ctx.config.server_url,
        locale = %ctx.translator.locale(),
        "configuration resolved"
    );

    match cli.command {
        Commands::Chat(args) => commands::chat::run(&ctx, args).await,
        Commands::Upload { path } => commands::upload::run(&ctx, path.as_deref()).await,
        Commands::Status => commands::status::run(&ctx).await,
        Commands::Clear { yes } => commands::documents::run(&ctx, yes).await,
        Commands::Resources(args) => commands::resources::run(&ctx, args).await,
        Commands::Lang { code } => commands::language::run(&ctx, code.as_deref()),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}
