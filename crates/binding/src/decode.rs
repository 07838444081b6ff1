//! Request payload decoding
//!
//! `GET` requests and form content types are decoded from form pairs (body
//! first, then the query string); everything else is read as a JSON body.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, header};
use multer::{Constraints, Multipart, SizeLimit};
use serde::de::DeserializeOwned;

use crate::config::BindConfig;
use crate::error::DecodeError;
use crate::form;
use crate::shape::Describe;

/// How a request payload is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// JSON request body
    Json,
    /// URL-encoded body plus query string
    UrlEncoded,
    /// Multipart text parts plus query string
    Multipart,
    /// Query string only
    Query,
}

impl Strategy {
    /// Picks the strategy for a method and `Content-Type`.
    ///
    /// ```rust
    /// use axum::http::Method;
    /// use nebula_binding::decode::Strategy;
    ///
    /// assert_eq!(Strategy::select(&Method::GET, Some("application/json")), Strategy::Query);
    /// assert_eq!(Strategy::select(&Method::POST, None), Strategy::Json);
    /// assert_eq!(
    ///     Strategy::select(&Method::PUT, Some("application/x-www-form-urlencoded")),
    ///     Strategy::UrlEncoded
    /// );
    /// ```
    pub fn select(method: &Method, content_type: Option<&str>) -> Self {
        let content_type = content_type.unwrap_or_default();

        if method == Method::GET {
            Self::Query
        } else if content_type.contains("multipart/form-data") {
            Self::Multipart
        } else if content_type.contains("urlencoded") {
            Self::UrlEncoded
        } else {
            Self::Json
        }
    }
}

/// Decodes `request` into `T` without validating it.
pub async fn decode<T>(request: Request, config: &BindConfig) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Describe,
{
    let (parts, body) = request.into_parts();
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let strategy = Strategy::select(&parts.method, content_type);

    tracing::debug!(?strategy, method = %parts.method, "decoding request");

    let mut pairs = match strategy {
        Strategy::Json => {
            let bytes = read_body(body, config.max_body_bytes).await?;
            return serde_json::from_slice(&bytes).map_err(DecodeError::Json);
        }
        Strategy::UrlEncoded => {
            let bytes = read_body(body, config.max_body_bytes).await?;
            url::form_urlencoded::parse(&bytes).into_owned().collect()
        }
        Strategy::Multipart => {
            let content_type = content_type.unwrap_or_default();
            multipart_pairs(content_type, body, config.max_body_bytes).await?
        }
        Strategy::Query => Vec::new(),
    };

    if let Some(query) = parts.uri.query() {
        pairs.extend(url::form_urlencoded::parse(query.as_bytes()).into_owned());
    }
    tracing::trace!(pairs = pairs.len(), "collected form values");

    let tree = form::build(T::shape(), &pairs);
    serde_json::from_value(tree).map_err(DecodeError::Form)
}

async fn read_body(body: Body, limit: usize) -> Result<axum::body::Bytes, DecodeError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(DecodeError::Body)
}

async fn multipart_pairs(
    content_type: &str,
    body: Body,
    limit: usize,
) -> Result<Vec<(String, String)>, DecodeError> {
    let boundary = multer::parse_boundary(content_type)?;
    let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(limit as u64));
    let mut multipart = Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    let mut pairs = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            tracing::trace!(name = ?field.name(), "skipping multipart file part");
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let text = field.text().await?;
        pairs.push((name, text));
    }

    Ok(pairs)
}
