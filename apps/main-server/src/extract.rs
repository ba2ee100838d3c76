//! Request extractors that report rejections as [`ServerError`].
//!
//! axum's built-in extractors answer malformed input with plain-text bodies
//! and a mix of 400/415/422 statuses. These wrappers route every rejection
//! through [`ServerError::Validation`] so clients always get a 422 with the
//! usual JSON error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ServerError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct Payload<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct PathParam<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServerError))]
pub struct QueryParams<T>(pub T);
