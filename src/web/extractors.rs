//! Request extractors

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use super::middleware::REQUEST_ID_HEADER;
use crate::errors::AppError;

/// JSON body extractor whose rejections surface as `400 {"error": ...}`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Request context information
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub real_ip: Option<String>,
    pub request_id: String,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        };

        let real_ip = header("x-real-ip")
            .or_else(|| header("x-forwarded-for"))
            .map(|s| s.split(',').next().unwrap_or(&s).trim().to_string());

        Ok(Self {
            user_agent: header("user-agent"),
            real_ip,
            request_id: header(REQUEST_ID_HEADER).unwrap_or_else(|| Uuid::new_v4().to_string()),
        })
    }
}
