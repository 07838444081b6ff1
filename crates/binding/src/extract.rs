//! axum integration
//!
//! [`Valid<T>`] binds and validates a request with the [`Binder`] found in
//! router state; [`BindError`] turns into a JSON error response.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::binder::Binder;
use crate::engine::Validate;
use crate::error::BindError;
use crate::shape::Describe;

/// Extractor for a decoded and validated request target.
///
/// The binder comes from router state, which must provide `Arc<Binder>`
/// through [`FromRef`]. Use [`global::current`](crate::global::current) as
/// that state to share the process-wide binder.
///
/// # Example
///
/// ```ignore
/// async fn create(Valid(order): Valid<CreateOrder>) -> impl IntoResponse {
///     // order passed every rule
/// }
///
/// let app = Router::new()
///     .route("/orders", post(create))
///     .with_state(Arc::new(binder));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Describe + Validate + Send,
    Arc<Binder>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BindError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let binder = Arc::<Binder>::from_ref(state);
        binder.bind_and_validate(req).await.map(Valid)
    }
}

impl IntoResponse for BindError {
    fn into_response(self) -> Response {
        match self {
            Self::Decode(error) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": error.to_string() }))).into_response()
            }
            Self::Invalid(error) => (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response(),
            Self::Contract(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, FieldErrors, ResolveError, ValidationError};
    use rstest::rstest;

    fn decode_error() -> BindError {
        let error = serde_json::from_str::<u8>("x").unwrap_err();
        BindError::Decode(DecodeError::Json(error))
    }

    #[rstest]
    #[case(decode_error(), StatusCode::BAD_REQUEST)]
    #[case(
        BindError::Invalid(ValidationError::with_fields(FieldErrors::new())),
        StatusCode::UNPROCESSABLE_ENTITY
    )]
    #[case(BindError::Contract(ResolveError::EmptyPath), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_codes(#[case] error: BindError, #[case] expected: StatusCode) {
        assert_eq!(error.into_response().status(), expected);
    }
}
