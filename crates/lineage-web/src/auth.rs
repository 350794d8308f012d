//! Shared-password gate: argon2 verification, session cookies and the
//! [`Authenticated`] extractor.
//!
//! A successful login issues a random token that is kept in memory and handed
//! to the browser as the `lineage_session` cookie. Sessions expire after
//! [`SESSION_TTL`]; restarting the server drops every session.

use std::{
  collections::HashMap,
  sync::Mutex,
  time::{Duration, Instant},
};

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, header, request::Parts},
  middleware::Next,
  response::Response,
};
use lineage_chart::ChartRenderer;
use lineage_core::store::RecordStore;
use rand_core::{OsRng, RngCore as _};

use crate::{AppState, error::Error};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "lineage_session";

/// The password accepted by this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Check a submitted password against the configured hash.
pub fn verify_password(password: &str, config: &AuthConfig) -> Result<(), Error> {
  let parsed_hash =
    PasswordHash::new(&config.password_hash).map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// How long a session stays valid after login.
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Tokens of the sessions currently logged in, with their issue time.
pub struct Sessions {
  ttl:    Duration,
  tokens: Mutex<HashMap<String, Instant>>,
}

impl Default for Sessions {
  fn default() -> Self { Self::with_ttl(SESSION_TTL) }
}

impl Sessions {
  pub fn with_ttl(ttl: Duration) -> Self {
    Self { ttl, tokens: Mutex::new(HashMap::new()) }
  }

  /// Start a new session and return its token. Expired sessions are
  /// dropped on the way.
  pub fn issue(&self) -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    let now = Instant::now();
    let mut tokens = self.lock();
    tokens.retain(|_, issued| now.duration_since(*issued) < self.ttl);
    tokens.insert(token.clone(), now);
    token
  }

  pub fn contains(&self, token: &str) -> bool {
    self
      .lock()
      .get(token)
      .is_some_and(|issued| issued.elapsed() < self.ttl)
  }

  pub fn revoke(&self, token: &str) { self.lock().remove(token); }

  /// Number of sessions held, expired or not.
  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
    // The map stays consistent even if a holder panicked.
    self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

/// `Set-Cookie` value that installs `token`.
pub fn session_cookie(token: &str) -> String {
  format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that removes the session cookie.
pub fn cleared_cookie() -> String {
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// The session token carried by the request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value)
    .filter(|value| !value.is_empty())
}

/// Whether the client would rather be sent to the login page than get a 401.
fn wants_html(headers: &HeaderMap) -> bool {
  headers
    .get(header::ACCEPT)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|accept| accept.contains("text/html"))
}

/// Validate the session cookie in `headers`, returning its token.
pub fn check_session(headers: &HeaderMap, sessions: &Sessions) -> Result<String, Error> {
  match session_token(headers) {
    Some(token) if sessions.contains(token) => Ok(token.to_owned()),
    _ if wants_html(headers) => Err(Error::LoginRequired),
    _ => Err(Error::Unauthorized),
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Proof that the request carries a live session. Every gated handler takes
/// one of these.
pub struct Authenticated {
  pub token: String,
}

impl<S, R> FromRequestParts<AppState<S, R>> for Authenticated
where
  S: RecordStore + 'static,
  R: ChartRenderer + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, R>,
  ) -> Result<Self, Self::Rejection> {
    let token = check_session(&parts.headers, &state.sessions)?;
    Ok(Authenticated { token })
  }
}

/// Middleware guarding routers that cannot take the extractor themselves,
/// such as the nested JSON API.
pub async fn require_session<S, R>(
  State(state): State<AppState<S, R>>,
  req: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: RecordStore + 'static,
  R: ChartRenderer + 'static,
{
  check_session(req.headers(), &state.sessions)?;
  Ok(next.run(req).await)
}
