use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{debug, instrument};

use nutri_track_domain::remote::FoodImage;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::sync::AnalysisResponse;

/// Largest accepted photo upload
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_FIELD: &str = "image";

/// Recognize the foods in a photo (multipart field `image`). Nothing is
/// logged; accepted results go to `POST /api/v1/meals/from-analysis`.
#[utoipa::path(
    post,
    path = "/api/v1/analysis",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Photo in the `image` field"),
    responses(
        (status = 200, description = "Analysis finished, possibly with nothing detected", body = AnalysisResponse),
        (status = 400, description = "Missing or empty image", body = ErrorResponse),
        (status = 502, description = "The analysis service failed", body = ErrorResponse),
        (status = 503, description = "The analysis service is unreachable or timed out", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[instrument(skip(state, multipart))]
pub async fn analyze_food(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let image = read_image(multipart).await?;
    debug!("Received {} ({} bytes)", image.file_name, image.bytes.len());

    let outcome = state.app.analysis.analyze(image).await?;
    Ok(Json(outcome.into()))
}

async fn read_image(mut multipart: Multipart) -> Result<FoodImage, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("photo.jpg").to_string();
        let content_type = field.content_type().unwrap_or("image/jpeg").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read the image: {}", e)))?;

        return Ok(FoodImage {
            bytes: bytes.to_vec(),
            file_name,
            content_type,
        });
    }

    Err(ApiError::BadRequest(format!("Missing `{}` field", IMAGE_FIELD)))
}
