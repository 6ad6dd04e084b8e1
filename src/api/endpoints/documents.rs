//! Document intake, listing, viewing, and per-document analysis state.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::analysis::{AnalysisJob, AnnualReportMetrics, KidDocument, TracingObserver};
use crate::documents::{DocumentKind, DocumentSummary};

/// PDF files start with this magic; anything else is rejected before it
/// ever reaches the analysis service.
const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: Uuid,
    pub status: &'static str,
}

/// One listing entry, enriched with the live job snapshot and the
/// headline figures the front-end cards show.
#[derive(Debug, Serialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub summary: DocumentSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisJob>,
    /// Summary risk indicator (1-7), for KIDs with a finished analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<u8>,
    /// Sum of all cost percentages, for KIDs with a finished analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_costs: Option<f64>,
    /// Company name, for annual reports with a finished analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl DocumentView {
    fn build(ctx: &ApiContext, summary: DocumentSummary) -> Self {
        let result = summary
            .has_result
            .then(|| ctx.core.documents.result(summary.id).ok().flatten())
            .flatten();

        let (mut risk_level, mut total_costs, mut company) = (None, None, None);
        if let Some(result) = result {
            match summary.kind {
                DocumentKind::Kid => {
                    let doc = KidDocument::from_value(result);
                    risk_level = doc.risk_level();
                    total_costs = Some(doc.total_costs());
                }
                DocumentKind::AnnualReport => {
                    let metrics = AnnualReportMetrics::from_value(result);
                    company = metrics.company_info.and_then(|c| c.name);
                }
            }
        }

        Self {
            analysis: ctx.core.jobs.snapshot(summary.id),
            risk_level,
            total_costs,
            company,
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentView>,
}

/// `POST /api/documents` — multipart upload (field `file`, optional field
/// `kind`). Registers the document and starts the analysis lifecycle in
/// the background; progress is observable through the analysis endpoint.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut kind = DocumentKind::Kid;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        // Field accessors consume the field, so the name is copied first.
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field
                    .file_name()
                    .unwrap_or("document.pdf")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                file = Some((name, data.to_vec()));
            }
            Some("kind") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                kind = DocumentKind::from_str(&text)
                    .ok_or_else(|| ApiError::BadRequest(format!("Unknown document kind: {text}")))?;
            }
            _ => {}
        }
    }

    let (name, bytes) = file.ok_or_else(|| ApiError::BadRequest("Missing file field".into()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".into()));
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ApiError::BadRequest("Uploaded file is not a PDF".into()));
    }

    let id = ctx.core.documents.insert(&name, kind, bytes.clone())?;
    ctx.core.jobs.register(id);
    tracing::info!(document = %id, file = name, %kind, "Document registered");

    let core = ctx.core.clone();
    tokio::spawn(async move {
        match core.analysis.analyze(id, &name, bytes, &TracingObserver).await {
            Ok(()) => match core.analysis.fetch_result().await {
                Ok(result) => {
                    if let Err(e) = core.documents.set_result(id, result) {
                        tracing::warn!(document = %id, error = %e, "Result could not be stored");
                    }
                }
                Err(e) => {
                    tracing::warn!(document = %id, error = %e, "Result fetch after completion failed")
                }
            },
            Err(e) => tracing::warn!(document = %id, error = %e, "Analysis did not complete"),
        }
    });

    Ok(Json(UploadResponse {
        id,
        status: "processing",
    }))
}

/// `GET /api/documents` — all registered documents with job snapshots.
pub async fn list(State(ctx): State<ApiContext>) -> Json<DocumentListResponse> {
    let documents = ctx
        .core
        .documents
        .summaries()
        .into_iter()
        .map(|summary| DocumentView::build(&ctx, summary))
        .collect();

    Json(DocumentListResponse { documents })
}

/// `GET /api/documents/{id}/file` — raw bytes for the browser viewer.
pub async fn raw_file(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (name, bytes) = ctx.core.documents.file(id)?;
    let mime = mime_guess::from_path(&name).first_or_octet_stream();

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// `GET /api/documents/{id}/analysis` — live job state for progress
/// display. The front-end polls this while an upload is processing.
pub async fn analysis_state(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisJob>, ApiError> {
    ctx.core
        .jobs
        .snapshot(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Document not found: {id}")))
}

/// `GET /api/documents/{id}/result` — the stored structured document.
pub async fn result(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match ctx.core.documents.result(id)? {
        Some(value) => Ok(Json(value)),
        None => Err(ApiError::NotFound(
            "Analysis result not available yet".to_string(),
        )),
    }
}

/// `DELETE /api/documents/{id}`.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.core.documents.remove(id)?;
    ctx.core.jobs.remove(id);
    tracing::info!(document = %id, "Document removed");
    Ok(StatusCode::NO_CONTENT)
}
