//! HTTP Basic-auth extractors.
//!
//! Credentials are `email:password`; the password is checked against the
//! account's argon2 PHC hash. A header that is present but wrong is always a
//! 401, even on routes where authentication is optional.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use stitch_core::store::SocialStore;
use uuid::Uuid;

use crate::{
  AppState,
  error::{ApiError, BAD_CREDENTIALS, NOT_AUTHENTICATED},
};

/// The verified identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
  pub profile_id: Uuid,
}

/// A caller on routes that also serve anonymous requests.
#[derive(Debug, Clone, Copy)]
pub struct MaybeCaller(pub Option<Caller>);

impl MaybeCaller {
  pub fn profile_id(&self) -> Option<Uuid> { self.0.map(|c| c.profile_id) }
}

/// Verify the `Authorization` header, if any.
///
/// `Ok(None)` means no header was sent.
pub async fn verify<S: SocialStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Option<Caller>, ApiError> {
  let Some(header_val) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };
  let rejected = || ApiError::Unauthorized(BAD_CREDENTIALS);

  let encoded = header_val
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or_else(rejected)?;

  let decoded = B64.decode(encoded.trim()).map_err(|_| rejected())?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| rejected())?;
  let (email, password) = creds.split_once(':').ok_or_else(rejected)?;

  let stored = store
    .credentials(email.to_owned())
    .await
    .map_err(|e| ApiError::Core(e.into()))?
    .ok_or_else(rejected)?;

  let parsed_hash = PasswordHash::new(&stored.password_hash).map_err(|_| rejected())?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| rejected())?;

  Ok(Some(Caller { profile_id: stored.profile_id }))
}

impl<S: SocialStore + 'static> FromRequestParts<AppState<S>> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify(&parts.headers, state.store.as_ref())
      .await?
      .ok_or(ApiError::Unauthorized(NOT_AUTHENTICATED))
  }
}

impl<S: SocialStore + 'static> FromRequestParts<AppState<S>> for MaybeCaller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(MaybeCaller(verify(&parts.headers, state.store.as_ref()).await?))
  }
}
