//! JSON body extractor that validates before the handler runs.
//!
//! Malformed bodies and failed `validator` rules both come back in the
//! failure envelope with `validation_error`, never as a bare text rejection.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// `Json<T>` plus `T::validate()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::Validation("Expected Content-Type: application/json".to_string())
        }
        JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
        JsonRejection::JsonSyntaxError(_) => {
            ApiError::Validation("Request body is not valid JSON".to_string())
        }
        other => ApiError::Validation(other.body_text()),
    }
}
