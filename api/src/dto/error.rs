use actix_web::HttpResponse;
use validator::ValidationErrors;

use hl_shared::{error_codes, ErrorResponse};

/// 400 response listing the offending fields
pub fn validation_error_response(errors: ValidationErrors) -> HttpResponse {
    let fields: Vec<String> = errors
        .errors()
        .keys()
        .map(|field| field.to_string())
        .collect();

    tracing::debug!(?fields, "Request validation failed");
    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request").add_detail("fields", fields),
    )
}
