//! Backend health and document-count reporting.

use colored::Colorize;
use shared::{
    language::Translator,
    models::{HealthResponse, ProviderSelection, StatusBadge},
};
use tracing::{debug, warn};

use crate::api::{ApiError, CoachClient};

/// Snapshot of what the status bar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub badge: StatusBadge,
    pub documents: Option<u64>,
    pub rag_enabled: Option<bool>,
    pub providers: ProviderSelection,
}

impl StatusReport {
    /// Nothing known yet; the state before the first check.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            badge: StatusBadge::Offline,
            documents: None,
            rag_enabled: None,
            providers: ProviderSelection::default(),
        }
    }

    /// Applies the outcome of a health check.
    pub fn apply_health(
        &mut self,
        outcome: Result<HealthResponse, ApiError>,
        preferred_provider: Option<&str>,
    ) {
        match outcome {
            Ok(health) => {
                self.badge = StatusBadge::from_health(&health);
                if self.badge == StatusBadge::Online {
                    self.documents = Some(health.documents_count);
                }
                self.rag_enabled = health.rag_enabled;
                self.providers = ProviderSelection::from_health(&health, preferred_provider);
            }
            Err(err) if err.is_unreachable() => {
                self.badge = StatusBadge::Offline;
            }
            Err(err) => {
                debug!(error = %err, "health check returned an unusable answer");
                self.badge = StatusBadge::Error;
            }
        }
    }

    /// Applies the outcome of a count refresh. Failures leave the count as is.
    pub fn apply_count(&mut self, outcome: Result<u64, ApiError>) {
        match outcome {
            Ok(count) => self.documents = Some(count),
            Err(err) => warn!(error = %err, "document count refresh failed"),
        }
    }

    /// Lines for the status bar.
    #[must_use]
    pub fn render(&self, translator: Translator) -> Vec<String> {
        let badge = self.badge.label(translator);
        let badge = match self.badge {
            StatusBadge::Online => badge.green(),
            StatusBadge::Error => badge.yellow(),
            StatusBadge::Offline => badge.red(),
        };
        let documents = self
            .documents
            .map_or_else(|| "-".to_string(), |count| count.to_string());

        let mut lines = vec![
            format!("{}: {badge}", translator.t("statusLabel")),
            format!("{}: {documents}", translator.t("documentsLabel")),
        ];
        if let Some(selected) = &self.providers.selected {
            lines.push(format!("{}: {selected}", translator.t("providerLabel")));
        }
        if !self.providers.available.is_empty() {
            lines.push(format!(
                "{}: {}",
                translator.t("providersAvailable"),
                self.providers.available.join(", ")
            ));
        }
        if let Some(enabled) = self.rag_enabled {
            let key = if enabled { "ragEnabled" } else { "ragDisabled" };
            lines.push(translator.t(key));
        }
        lines
    }
}

/// Runs the health check and the count refresh concurrently.
pub async fn check_status(client: &CoachClient, preferred_provider: Option<&str>) -> StatusReport {
    let (health, count) = tokio::join!(client.health(), client.document_count());
    let mut report = StatusReport::unknown();
    report.apply_health(health, preferred_provider);
    report.apply_count(count);
    report
}

pub(crate) fn print_report(report: &StatusReport, translator: Translator) {
    for line in report.render(translator) {
        println!("{line}");
    }
}

/// `coach status`.
///
/// # Errors
/// Fails only when the client cannot be constructed.
pub async fn run(ctx: &super::AppContext) -> anyhow::Result<()> {
    let client = ctx.client()?;
    debug!(api = %client.api_base(), "checking backend status");
    let report = check_status(&client, ctx.config.provider.as_deref()).await;
    print_report(&report, ctx.translator);
    Ok(())
}
