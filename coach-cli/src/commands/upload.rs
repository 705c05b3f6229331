//! Document upload.

use std::path::Path;

use shared::{language::Translator, models::Notice};
use tracing::info;

use super::status::{StatusReport, check_status};
use crate::api::{ApiError, CoachClient};

/// What an upload attempt produced: the notice to show and, after a
/// success, the refreshed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub notice: Notice,
    pub status: Option<StatusReport>,
}

/// Uploads `path` for indexing.
///
/// Without a path nothing is sent. Backend error details are shown
/// verbatim; every other failure gets the generic message.
pub async fn upload_document(
    client: &CoachClient,
    path: Option<&Path>,
    translator: Translator,
    preferred_provider: Option<&str>,
) -> UploadOutcome {
    let Some(path) = path else {
        return UploadOutcome {
            notice: Notice::error(translator.t("uploadSelectFile")),
            status: None,
        };
    };

    match client.upload(path).await {
        Ok(response) => {
            info!(
                file = %response.filename,
                chunks = response.chunks_created,
                "document uploaded"
            );
            let chunks = response.chunks_created.to_string();
            let notice = Notice::success(translator.format(
                "uploadSuccess",
                &[("filename", response.filename.as_str()), ("chunks", chunks.as_str())],
            ));
            let status = check_status(client, preferred_provider).await;
            UploadOutcome {
                notice,
                status: Some(status),
            }
        }
        Err(err) => UploadOutcome {
            notice: failure_notice(&err, translator, "uploadFailed"),
            status: None,
        },
    }
}

/// `"Error: {detail}"` when the backend explained itself, else the
/// translated `fallback_key`.
pub(crate) fn failure_notice(err: &ApiError, translator: Translator, fallback_key: &str) -> Notice {
    match err.detail() {
        Some(detail) => Notice::error(translator.format("uploadErrorDetail", &[("detail", detail)])),
        None => Notice::error(translator.t(fallback_key)),
    }
}

/// `coach upload [PATH]`.
///
/// # Errors
/// Fails only when the client cannot be constructed.
pub async fn run(ctx: &super::AppContext, path: Option<&Path>) -> anyhow::Result<()> {
    let client = ctx.client()?;
    if path.is_some() {
        println!("{}", ctx.translator.t("uploadInProgress"));
    }
    let outcome = upload_document(
        &client,
        path,
        ctx.translator,
        ctx.config.provider.as_deref(),
    )
    .await;
    super::print_notice(&outcome.notice);
    if let Some(status) = &outcome.status {
        super::status::print_report(status, ctx.translator);
    }
    if outcome.notice.is_error() {
        anyhow::bail!("upload did not complete");
    }
    Ok(())
}
