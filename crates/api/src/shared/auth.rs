use crate::error::DosewatchError;
use actix_web::HttpRequest;
use dosewatch_infra::DosewatchContext;

/// Every route except the health check requires the `x-api-key` header
pub fn protect_route(req: &HttpRequest, ctx: &DosewatchContext) -> Result<(), DosewatchError> {
    let api_key = match req.headers().get("x-api-key") {
        Some(api_key) => match api_key.to_str() {
            Ok(api_key) => api_key,
            Err(_) => {
                return Err(DosewatchError::Unauthorized(
                    "Malformed api key provided".to_string(),
                ))
            }
        },
        None => {
            return Err(DosewatchError::Unauthorized(
                "Unable to find api-key in x-api-key header".to_string(),
            ))
        }
    };

    if api_key == ctx.config.api_key {
        Ok(())
    } else {
        Err(DosewatchError::Unauthorized(
            "Invalid api-key provided in x-api-key header".to_string(),
        ))
    }
}
