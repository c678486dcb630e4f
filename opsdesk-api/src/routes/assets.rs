/// Asset endpoints
///
/// # Endpoints
///
/// - `POST /api/assets`: create
/// - `GET /api/assets`: list, most recently touched first;
///   `?expand=created_by` joins the creator's `{name, email}`
/// - `PUT /api/assets/:id`: partial update (merge)
/// - `DELETE /api/assets/:id`: delete outright
///
/// Every endpoint requires a verified token. There is no per-asset
/// ownership check: any authenticated caller may edit or delete any asset.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AppJson,
};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use opsdesk_shared::{
    auth::middleware::AuthUser,
    models::asset::{Asset, CreateAsset, UpdateAsset},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListAssetsQuery {
    /// `expand=created_by` joins the creator's name and email onto each
    /// record
    pub expand: Option<String>,
}

/// Response of the delete endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Confirmation text
    pub message: String,
}

/// Create an asset
///
/// `name`, `ip_address`, and `type` are required; everything else falls
/// back to its declared default. The creator is the verified caller and
/// cannot be chosen by the request.
///
/// # Errors
///
/// - `400 Bad Request`: missing or empty required field
/// - `500 Internal Server Error`: store fault
pub async fn create_asset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(req): AppJson<CreateAsset>,
) -> ApiResult<Json<Asset>> {
    req.validate()?;

    let asset = Asset::create(&state.db, req, auth.user_id).await?;

    Ok(Json(asset))
}

/// List all assets, ordered by `last_updated` descending
///
/// No pagination and no filtering; the listing is a full scan by design.
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<ListAssetsQuery>,
) -> ApiResult<Response> {
    let response = match query.expand.as_deref() {
        Some("created_by") => Json(Asset::list_with_creator(&state.db).await?).into_response(),
        _ => Json(Asset::list(&state.db).await?).into_response(),
    };

    Ok(response)
}

/// Partially update an asset
///
/// Merges only the fields present in the body; absent fields keep their
/// stored values, and `last_updated` is refreshed regardless. The stored
/// device credential is written whenever the `password` key is present
/// (an explicit empty string clears it) and untouched when the key is
/// absent.
///
/// # Errors
///
/// - `400 Bad Request`: present field fails validation
/// - `404 Not Found`: id does not resolve
/// - `500 Internal Server Error`: store fault
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateAsset>,
) -> ApiResult<Json<Asset>> {
    req.validate()?;

    let asset = Asset::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Asset not found".to_string()))?;

    Ok(Json(asset))
}

/// Delete an asset
///
/// Removal is unconditional and does not clean up handoff references.
///
/// # Errors
///
/// - `404 Not Found`: id does not resolve
/// - `500 Internal Server Error`: store fault
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = Asset::delete(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Asset not found".to_string()));
    }

    Ok(Json(DeleteResponse {
        message: "Asset removed".to_string(),
    }))
}
