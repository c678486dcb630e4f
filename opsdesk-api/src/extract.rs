/// Request extractors
///
/// [`AppJson`] wraps `axum::Json` so that body rejections (malformed JSON,
/// missing required fields, wrong types) are converted into the unified
/// [`ApiError`](crate::error::ApiError) shape instead of axum's default
/// plaintext rejection. Handlers take `AppJson<T>` wherever they would
/// take `Json<T>`; the typed, validated struct exists before any handler
/// logic runs.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON body extractor with unified error responses
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
