//! Browser front end for Lineage.
//!
//! Exposes an axum [`Router`] serving the login gate, the ingestion form, the
//! rendered family chart and the nested JSON API, backed by any
//! [`RecordStore`] and [`ChartRenderer`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;

pub use error::Error;

use std::{ops::RangeInclusive, path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  middleware,
  routing::{get, post},
};
use lineage_api::{ApiState, api_router};
use lineage_chart::{ChartRenderer, GraphvizRenderer};
use lineage_core::{
  person::{DEFAULT_BIRTH_YEAR, DEFAULT_BIRTH_YEARS},
  store::RecordStore,
};
use lineage_photo::PhotoDir;
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, Sessions, require_session};
use handlers::{chart, login, people, tree};

/// Largest accepted request body; photo uploads are the only big ones.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LINEAGE_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  /// Heading shown on every page.
  #[serde(default = "default_title")]
  pub title:              String,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_photo_dir")]
  pub photo_dir:          PathBuf,
  pub password_hash:      String,
  /// Graphviz executable used to draw the chart.
  #[serde(default = "default_dot_program")]
  pub dot_program:        PathBuf,
  #[serde(default = "default_birth_year_min")]
  pub birth_year_min:     i32,
  #[serde(default = "default_birth_year_max")]
  pub birth_year_max:     i32,
  #[serde(default = "default_birth_year")]
  pub birth_year_default: i32,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8501 }
fn default_title() -> String { "Family Tree".into() }
fn default_store_path() -> PathBuf { "lineage.db".into() }
fn default_photo_dir() -> PathBuf { "photos".into() }
fn default_dot_program() -> PathBuf { "dot".into() }
fn default_birth_year_min() -> i32 { *DEFAULT_BIRTH_YEARS.start() }
fn default_birth_year_max() -> i32 { *DEFAULT_BIRTH_YEARS.end() }
fn default_birth_year() -> i32 { DEFAULT_BIRTH_YEAR }

impl ServerConfig {
  /// A configuration with every default filled in.
  pub fn with_password_hash(password_hash: impl Into<String>) -> Self {
    Self {
      host:               default_host(),
      port:               default_port(),
      title:              default_title(),
      store_path:         default_store_path(),
      photo_dir:          default_photo_dir(),
      password_hash:      password_hash.into(),
      dot_program:        default_dot_program(),
      birth_year_min:     default_birth_year_min(),
      birth_year_max:     default_birth_year_max(),
      birth_year_default: default_birth_year(),
    }
  }

  pub fn birth_years(&self) -> RangeInclusive<i32> {
    self.birth_year_min..=self.birth_year_max
  }

  /// The pre-selected birth year, pulled into range if misconfigured.
  pub fn initial_birth_year(&self) -> i32 {
    self
      .birth_year_default
      .clamp(self.birth_year_min, self.birth_year_max.max(self.birth_year_min))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, R = GraphvizRenderer> {
  pub store:    Arc<S>,
  pub renderer: Arc<R>,
  pub photos:   Arc<PhotoDir>,
  pub config:   Arc<ServerConfig>,
  pub auth:     Arc<AuthConfig>,
  pub sessions: Arc<Sessions>,
  /// Serializes ingestion (next id, photo, append) across the form and the
  /// JSON API.
  pub ingest:   Arc<Mutex<()>>,
}

impl<S, R> AppState<S, R> {
  pub fn new(store: S, renderer: R, config: ServerConfig) -> Self {
    Self {
      store:    Arc::new(store),
      renderer: Arc::new(renderer),
      photos:   Arc::new(PhotoDir::new(config.photo_dir.clone())),
      auth:     Arc::new(AuthConfig { password_hash: config.password_hash.clone() }),
      config:   Arc::new(config),
      sessions: Arc::new(Sessions::default()),
      ingest:   Arc::new(Mutex::new(())),
    }
  }

  /// State for the nested JSON API, sharing this app's store and ingest lock.
  pub fn api_state(&self) -> ApiState<S> {
    ApiState {
      store:       Arc::clone(&self.store),
      birth_years: self.config.birth_years(),
      ingest:      Arc::clone(&self.ingest),
    }
  }
}

impl<S, R> Clone for AppState<S, R> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      renderer: Arc::clone(&self.renderer),
      photos:   Arc::clone(&self.photos),
      config:   Arc::clone(&self.config),
      auth:     Arc::clone(&self.auth),
      sessions: Arc::clone(&self.sessions),
      ingest:   Arc::clone(&self.ingest),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`].
pub fn router<S, R>(state: AppState<S, R>) -> Router
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  R: ChartRenderer + 'static,
{
  let api = api_router(state.api_state()).layer(middleware::from_fn_with_state(
    state.clone(),
    require_session::<S, R>,
  ));

  Router::new()
    .route("/login",     get(login::form::<S, R>).post(login::submit::<S, R>))
    .route("/logout",    post(login::logout::<S, R>))
    .route("/",          get(tree::index::<S, R>))
    .route("/people",    post(people::create::<S, R>))
    .route("/chart.png", get(chart::png::<S, R>))
    .route("/chart.svg", get(chart::svg::<S, R>))
    .route("/chart.dot", get(chart::dot::<S, R>))
    .nest_service("/api", api)
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use lineage_chart::ChartFormat;
  use lineage_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use tempfile::TempDir;
  use tower::ServiceExt as _;

  use super::*;

  /// Echoes the DOT it is given so tests can inspect what would be drawn.
  struct EchoRenderer;

  impl ChartRenderer for EchoRenderer {
    async fn render(&self, dot: &str, format: ChartFormat) -> lineage_chart::Result<Vec<u8>> {
      Ok(format!("{}\n{dot}", format.extension()).into_bytes())
    }
  }

  const BOUNDARY: &str = "lineage-test-boundary";

  struct Harness {
    state:   AppState<SqliteStore, EchoRenderer>,
    _photos: TempDir,
  }

  async fn harness(password: &str) -> Harness {
    let photos = tempfile::tempdir().unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    let mut config = ServerConfig::with_password_hash(hash);
    config.photo_dir = photos.path().to_path_buf();
    let store = SqliteStore::open_in_memory().await.unwrap();

    Harness { state: AppState::new(store, EchoRenderer, config), _photos: photos }
  }

  async fn send(state: &AppState<SqliteStore, EchoRenderer>, req: Request<Body>) -> Response {
    router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  async fn login(state: &AppState<SqliteStore, EchoRenderer>, password: &str) -> Response {
    let req = Request::builder()
      .method("POST")
      .uri("/login")
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from(format!("password={password}")))
      .unwrap();
    send(state, req).await
  }

  async fn session_cookie(state: &AppState<SqliteStore, EchoRenderer>) -> String {
    let resp = login(state, "secret").await;
    let set_cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
  }

  fn get_with(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
      .uri(uri)
      .header(header::COOKIE, cookie)
      .header(header::ACCEPT, "text/html")
      .body(Body::empty())
      .unwrap()
  }

  fn multipart(fields: &[(&str, &str)], photo: Option<&[u8]>) -> Body {
    let mut body = Vec::new();
    for (name, value) in fields {
      body.extend_from_slice(
        format!(
          "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
      );
    }
    if let Some(photo) = photo {
      body.extend_from_slice(
        format!(
          "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"p.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
      );
      body.extend_from_slice(photo);
      body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
  }

  async fn add_person(
    state: &AppState<SqliteStore, EchoRenderer>,
    cookie: &str,
    fields: &[(&str, &str)],
    photo: Option<&[u8]>,
  ) -> Response {
    let req = Request::builder()
      .method("POST")
      .uri("/people")
      .header(header::COOKIE, cookie)
      .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
      .body(multipart(fields, photo))
      .unwrap();
    send(state, req).await
  }

  // ── Gate ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn anonymous_browser_is_sent_to_login() {
    let h = harness("secret").await;
    let req = Request::builder()
      .uri("/")
      .header(header::ACCEPT, "text/html")
      .body(Body::empty())
      .unwrap();
    let resp = send(&h.state, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
  }

  #[tokio::test]
  async fn anonymous_api_call_is_401() {
    let h = harness("secret").await;
    let req = Request::builder().uri("/api/people").body(Body::empty()).unwrap();
    let resp = send(&h.state, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn wrong_password_shows_the_form_again() {
    let h = harness("secret").await;
    let resp = login(&h.state, "guess").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(!resp.headers().contains_key(header::SET_COOKIE));
    let html = body_text(resp).await;
    assert!(html.contains("name=\"password\""), "{html}");
    assert!(html.contains("Incorrect password"), "{html}");
  }

  #[tokio::test]
  async fn login_then_logout() {
    let h = harness("secret").await;
    let resp = login(&h.state, "secret").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    let cookie = session_cookie(&h.state).await;
    assert!(cookie.starts_with("lineage_session="));

    let resp = send(&h.state, get_with("/", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
      .method("POST")
      .uri("/logout")
      .header(header::COOKIE, &cookie)
      .body(Body::empty())
      .unwrap();
    let resp = send(&h.state, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = send(&h.state, get_with("/", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  }

  // ── Pages ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_tree_shows_info_and_no_chart() {
    let h = harness("secret").await;
    let cookie = session_cookie(&h.state).await;

    let html = body_text(send(&h.state, get_with("/", &cookie)).await).await;
    assert!(html.contains("Family Tree"));
    assert!(html.contains("No one has been added yet"), "{html}");
    assert!(!html.contains("<img"));

    let resp = send(&h.state, get_with("/chart.png", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn form_ingestion_feeds_pickers_and_chart() {
    let h = harness("secret").await;
    let cookie = session_cookie(&h.state).await;

    let resp = add_person(
      &h.state,
      &cookie,
      &[("name", "Ali"), ("gender", "male"), ("birth_year", "1340"), ("parent", ""), ("spouse", "")],
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/?added=1");

    let resp = add_person(
      &h.state,
      &cookie,
      &[("name", "Zahra <Z>"), ("gender", "female"), ("birth_year", "1365"), ("parent", "1-Ali"), ("spouse", "")],
      None,
    )
    .await;
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/?added=2");

    let html = body_text(send(&h.state, get_with("/?added=2", &cookie)).await).await;
    assert!(html.contains("1-Ali"));
    assert!(html.contains("2-Zahra &lt;Z&gt;"), "{html}");
    assert!(html.contains("src=\"/chart.png\""));
    assert!(html.contains("Added"));

    let dot = body_text(send(&h.state, get_with("/chart.dot", &cookie)).await).await;
    assert!(dot.contains("\"1\" -> \"2\";"), "{dot}");

    let people = h.state.store.load_all().await.unwrap();
    assert_eq!(people[1].parent.as_str(), "1");
  }

  #[tokio::test]
  async fn blank_name_writes_nothing() {
    let h = harness("secret").await;
    let cookie = session_cookie(&h.state).await;

    let resp = add_person(
      &h.state,
      &cookie,
      &[("name", "   "), ("gender", "female"), ("birth_year", "1370")],
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    assert_eq!(h.state.store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn out_of_range_birth_year_is_rejected() {
    let h = harness("secret").await;
    let cookie = session_cookie(&h.state).await;

    let resp = add_person(
      &h.state,
      &cookie,
      &[("name", "Old"), ("gender", "male"), ("birth_year", "1100")],
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.state.store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn undecodable_photo_still_adds_the_person() {
    let h = harness("secret").await;
    let cookie = session_cookie(&h.state).await;

    let resp = add_person(
      &h.state,
      &cookie,
      &[("name", "Maryam"), ("gender", "female"), ("birth_year", "1370")],
      Some(b"definitely not an image"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let people = h.state.store.load_all().await.unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].photo_path, None);
  }

  // ── Chart ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn chart_is_cached_by_etag() {
    let h = harness("secret").await;
    let cookie = session_cookie(&h.state).await;
    add_person(&h.state, &cookie, &[("name", "A"), ("gender", "male"), ("birth_year", "1350")], None)
      .await;

    let resp = send(&h.state, get_with("/chart.svg", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/svg+xml");
    let etag = resp.headers().get(header::ETAG).unwrap().clone();
    assert!(body_text(resp).await.starts_with("svg\n"));

    let mut req = get_with("/chart.svg", &cookie);
    req.headers_mut().insert(header::IF_NONE_MATCH, etag.clone());
    let resp = send(&h.state, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

    add_person(&h.state, &cookie, &[("name", "B"), ("gender", "female"), ("birth_year", "1352")], None)
      .await;
    let mut req = get_with("/chart.svg", &cookie);
    req.headers_mut().insert(header::IF_NONE_MATCH, etag);
    let resp = send(&h.state, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_is_reachable_with_a_session() {
    let h = harness("secret").await;
    let cookie = session_cookie(&h.state).await;
    add_person(&h.state, &cookie, &[("name", "A"), ("gender", "male"), ("birth_year", "1350")], None)
      .await;

    let req = Request::builder()
      .uri("/api/people/1")
      .header(header::COOKIE, &cookie)
      .body(Body::empty())
      .unwrap();
    let resp = send(&h.state, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("\"name\":\"A\""));
  }
}
