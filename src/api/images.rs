//! Static images referenced by outgoing mail

use actix_files::NamedFile;
use actix_web::{get, mime, web, HttpRequest, HttpResponse};
use tracing::warn;

use super::errors::{ApiError, ApiResult};
use crate::state::AppState;

/// Signature image embedded in the contact email
#[get("/signatures")]
pub async fn get_signature(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let path = state.settings.signature_path();

    match NamedFile::open_async(&path).await {
        Ok(file) => Ok(file.set_content_type(mime::IMAGE_PNG).into_response(&req)),
        Err(e) => {
            warn!("Signature image {} unavailable: {}", path.display(), e);
            Err(ApiError::NotFound)
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_signature);
}
