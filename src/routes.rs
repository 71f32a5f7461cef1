use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::{AspectRatio, DurationPreset, Language, NarratorTone, VisualStyle};
use crate::gemini::{GeminiClient, GenerationError};
use crate::media::{encode_reference_media, MediaError, ReferenceFile, MAX_REFERENCE_MEDIA};
use crate::models::GenerationParameters;
use crate::pdf::generate_pdf;
use crate::progress::spawn_progress_ticker;
use crate::render::{project_view, ProjectView};
use crate::store::{ErrorReport, GenerationTicket, ProjectStore, Transition, TransitionError};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ProjectStore>,
    pub gemini: Arc<GeminiClient>,
}

/// JSON error envelope mirroring what the store holds: a stable code, a
/// message, and optional remediation guidance.
pub struct ApiError {
    status: StatusCode,
    report: ErrorReport,
}

impl ApiError {
    fn invalid(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            report: ErrorReport {
                code: "INVALID_REQUEST",
                message,
                hint: None,
            },
        }
    }

    fn busy() -> Self {
        Self {
            status: StatusCode::CONFLICT,
            report: ErrorReport {
                code: "GENERATION_IN_PROGRESS",
                message: "a generation is already in flight; wait for it to finish".to_string(),
                hint: None,
            },
        }
    }
}

impl From<&GenerationError> for ApiError {
    fn from(err: &GenerationError) -> Self {
        let status = match err {
            GenerationError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            GenerationError::EmptyResponse | GenerationError::Other(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            report: ErrorReport::from(err),
        }
    }
}

impl From<&MediaError> for ApiError {
    fn from(err: &MediaError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            report: ErrorReport {
                code: match err {
                    MediaError::TooMany(_) => "TOO_MANY_REFERENCES",
                    _ => "MEDIA_UNREADABLE",
                },
                message: err.to_string(),
                hint: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.report }))).into_response()
    }
}

/// Current project state, as the page renders it.
pub async fn get_storyboard(State(state): State<AppState>) -> Json<ProjectView> {
    Json(project_view(&state.store.snapshot()))
}

#[derive(Serialize)]
pub struct CatalogEntry {
    id: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
pub struct CatalogView {
    durations: Vec<CatalogEntry>,
    styles: Vec<CatalogEntry>,
    languages: Vec<&'static str>,
    narrator_styles: Vec<&'static str>,
    ratios: Vec<CatalogEntry>,
    max_reference_media: usize,
}

/// The fixed preset menus; the form can only pick from these.
pub async fn get_catalog() -> Json<CatalogView> {
    Json(CatalogView {
        durations: DurationPreset::ALL
            .iter()
            .map(|d| CatalogEntry {
                id: d.value(),
                label: d.label(),
            })
            .collect(),
        styles: VisualStyle::ALL
            .iter()
            .map(|s| CatalogEntry {
                id: s.id(),
                label: s.label(),
            })
            .collect(),
        languages: Language::ALL.iter().map(|l| l.as_str()).collect(),
        narrator_styles: NarratorTone::ALL.iter().map(|n| n.as_str()).collect(),
        ratios: AspectRatio::ALL
            .iter()
            .map(|r| CatalogEntry {
                id: r.value(),
                label: r.label(),
            })
            .collect(),
        max_reference_media: MAX_REFERENCE_MEDIA,
    })
}

/// One multipart submission: a `params` JSON part plus up to three `media`
/// file parts. Runs the whole generation flow and returns the new view.
pub async fn generate_storyboard(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProjectView>, ApiError> {
    let (params, files) = read_submission(&mut multipart).await?;

    tracing::info!(
        "🎬 Generating storyboard: premise {:?}, style {}, {} reference(s)",
        truncate(&params.premise, 80),
        params.style.id(),
        files.len()
    );

    // Claim the single generation slot before any work happens.
    let ticket = GenerationTicket::new();
    match state.store.apply(Transition::GenerationStarted { ticket }).await {
        Ok(_) => {}
        Err(TransitionError::GenerationBusy) => return Err(ApiError::busy()),
        Err(e) => return Err(ApiError::invalid(e.to_string())),
    }
    // Aborted on drop, so the timer never outlives the generation.
    let _ticker = spawn_progress_ticker(state.store.clone());

    let media = match encode_reference_media(&files) {
        Ok(media) => media,
        Err(e) => {
            let api_err = ApiError::from(&e);
            fail_generation(&state, ticket, api_err.report.clone()).await;
            return Err(api_err);
        }
    };

    match state.gemini.generate_storyboard(&params, &media).await {
        Ok(storyboard) => {
            let next = state
                .store
                .apply(Transition::GenerationSucceeded {
                    ticket,
                    storyboard,
                    at: Utc::now(),
                })
                .await
                .map_err(|e| ApiError::invalid(e.to_string()))?;
            Ok(Json(project_view(&next)))
        }
        Err(e) => {
            tracing::error!("❌ Generation failed: {}", e);
            let api_err = ApiError::from(&e);
            fail_generation(&state, ticket, api_err.report.clone()).await;
            Err(api_err)
        }
    }
}

async fn fail_generation(state: &AppState, ticket: GenerationTicket, error: ErrorReport) {
    if let Err(e) = state
        .store
        .apply(Transition::GenerationFailed { ticket, error })
        .await
    {
        tracing::error!("failed to record generation failure: {}", e);
    }
}

async fn read_submission(
    multipart: &mut Multipart,
) -> Result<(GenerationParameters, Vec<ReferenceFile>), ApiError> {
    let mut params: Option<GenerationParameters> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "params" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::invalid(format!("unreadable params part: {e}")))?;
                params = Some(
                    serde_json::from_str(&raw)
                        .map_err(|e| ApiError::invalid(format!("invalid params: {e}")))?,
                );
            }
            "media" => {
                let name = field.file_name().unwrap_or("reference").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid(format!("unreadable media part: {e}")))?;
                files.push(ReferenceFile {
                    name,
                    content_type,
                    bytes,
                });
            }
            other => {
                return Err(ApiError::invalid(format!("unexpected field '{other}'")));
            }
        }
    }

    let params = params.ok_or_else(|| ApiError::invalid("missing params part".to_string()))?;
    if params.premise.trim().is_empty() {
        return Err(ApiError::invalid("premise must not be empty".to_string()));
    }
    // An over-cap selection never starts a generation; the set is rejected
    // as a whole.
    if files.len() > MAX_REFERENCE_MEDIA {
        return Err(ApiError::from(&MediaError::TooMany(files.len())));
    }
    Ok((params, files))
}

#[derive(Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    confirm: bool,
}

/// Destructive reset, gated by explicit confirmation. Without
/// `confirm=true` nothing happens.
pub async fn reset_storyboard(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<ProjectView>, ApiError> {
    if !query.confirm {
        return Err(ApiError::invalid(
            "reset is destructive; resend with ?confirm=true to proceed".to_string(),
        ));
    }
    match state.store.apply(Transition::ProjectCleared).await {
        Ok(next) => {
            tracing::info!("🗑️ Project cleared");
            Ok(Json(project_view(&next)))
        }
        Err(TransitionError::GenerationBusy) => Err(ApiError::busy()),
        Err(e) => Err(ApiError::invalid(e.to_string())),
    }
}

/// Print/export: the current result as a PDF document.
pub async fn export_pdf(State(state): State<AppState>) -> Response {
    let snapshot = state.store.snapshot();
    if snapshot.data.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let pdf_bytes = generate_pdf(&snapshot.data);
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        "application/pdf".parse().unwrap(),
    );
    headers.insert(
        axum::http::header::CONTENT_DISPOSITION,
        "attachment; filename=\"verticalcine_storyboard.pdf\""
            .parse()
            .unwrap(),
    );
    (StatusCode::OK, headers, pdf_bytes).into_response()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max).collect::<String>())
    }
}
