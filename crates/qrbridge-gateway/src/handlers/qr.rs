use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use qrbridge_core::{MappingId, Repository};
use qrbridge_qr::{export_file_name, render, to_pdf, to_png, ExportFormat, QrError};
use tracing::{debug, warn};

pub async fn qr_png_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Response> {
    export(&state, MappingId::new(id), ExportFormat::Png).await
}

pub async fn qr_pdf_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Response> {
    export(&state, MappingId::new(id), ExportFormat::Pdf).await
}

async fn export<R: Repository>(
    state: &AppState<R>,
    id: MappingId,
    format: ExportFormat,
) -> Result<Response> {
    let mapping = state.console().service().get_mapping(id).await?;
    let group = match mapping.group_name.as_deref() {
        Some(name) => state
            .console()
            .groups()
            .await?
            .into_iter()
            .find(|g| g.name == name),
        None => None,
    };
    let logo = state.logo_for(group.as_ref()).await;

    let target = mapping.random_link.to_redirect_url(state.domain());
    let mut options = state.settings().render.clone();
    options.logo = logo;

    let bytes = tokio::task::spawn_blocking(move || {
        let rendered = match render(&target, &options) {
            Err(QrError::Logo(e)) => {
                warn!(error = %e, "logo is unreadable, rendering without it");
                options.logo = None;
                render(&target, &options)
            }
            other => other,
        }?;
        match format {
            ExportFormat::Png => to_png(&rendered),
            ExportFormat::Pdf => to_pdf(&rendered),
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("qr export task failed: {e}")))??;

    let file_name = export_file_name(&mapping.random_link, format);
    debug!(id = %id, file_name = %file_name, bytes = bytes.len(), "exported qr code");
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
