//! Removing every indexed document from the backend.

use std::io;

use shared::{language::Translator, models::Notice};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use super::{
    status::{StatusReport, check_status},
    upload::failure_notice,
};
use crate::api::CoachClient;

/// Notice to show and, after a success, the refreshed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearOutcome {
    pub notice: Notice,
    pub status: Option<StatusReport>,
}

/// Sends `DELETE /api/documents`. Callers confirm first.
pub async fn clear_documents(
    client: &CoachClient,
    translator: Translator,
    preferred_provider: Option<&str>,
) -> ClearOutcome {
    match client.clear_documents().await {
        Ok(response) => {
            info!(
                message = response.message.as_deref().unwrap_or(""),
                "documents cleared"
            );
            let status = check_status(client, preferred_provider).await;
            ClearOutcome {
                notice: Notice::success(translator.t("clearSuccess")),
                status: Some(status),
            }
        }
        Err(err) => ClearOutcome {
            notice: failure_notice(&err, translator, "clearFailed"),
            status: None,
        },
    }
}

/// Asks the y/N question on stdout and reads one answer from `input`.
/// End of input counts as no.
pub(crate) async fn confirm<R>(prompt: &str, input: &mut R) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{prompt} [y/N] ").as_bytes()).await?;
    stdout.flush().await?;
    let mut answer = String::new();
    input.read_line(&mut answer).await?;
    Ok(is_yes(&answer))
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    )
}

/// `coach clear [--yes]`.
///
/// # Errors
/// Fails when the client cannot be built, the prompt cannot be read, or the
/// backend refuses.
pub async fn run(ctx: &super::AppContext, assume_yes: bool) -> anyhow::Result<()> {
    let translator = ctx.translator;
    let mut stdin = BufReader::new(tokio::io::stdin());
    if !assume_yes && !confirm(&translator.t("clearConfirm"), &mut stdin).await? {
        println!("{}", translator.t("clearCancelled"));
        return Ok(());
    }

    let client = ctx.client()?;
    let outcome = clear_documents(&client, translator, ctx.config.provider.as_deref()).await;
    super::print_notice(&outcome.notice);
    if let Some(status) = &outcome.status {
        super::status::print_report(status, translator);
    }
    if outcome.notice.is_error() {
        anyhow::bail!("documents were not cleared");
    }
    Ok(())
}
