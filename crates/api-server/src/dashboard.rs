use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "dashboard/"]
pub struct DashboardAssets;

/// Serves the single-page dashboard that calls `/api/analyze`.
pub async fn index() -> Response {
    match DashboardAssets::get("index.html") {
        Some(file) => Html(file.data.into_owned()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain")],
            "dashboard not bundled",
        )
            .into_response(),
    }
}
