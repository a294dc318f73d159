//! Index page handler
//!
//! Serves the embedded analysis form as the index page.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::assets::StaticAssets;

/// Serve the index page from embedded static assets
pub async fn index() -> impl IntoResponse {
    match StaticAssets::get_asset("static/index.html") {
        Some(file) => {
            let content = String::from_utf8_lossy(&file.data);
            Html(content.into_owned()).into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>500 Internal Server Error</h1><p>Page not found</p>".to_string()),
        )
            .into_response(),
    }
}
