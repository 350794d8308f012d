//! lineage server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite record store and the photo directory, and serves the family tree
//! over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `password_hash` in config.toml:
//!
//! ```
//! cargo run -p lineage-web --bin lineage -- --hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use lineage_chart::GraphvizRenderer;
use lineage_core::store::RecordStore as _;
use lineage_store_sqlite::SqliteStore;
use lineage_web::{AppState, ServerConfig};
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Lineage family tree server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LINEAGE"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.photo_dir = expand_tilde(&server_cfg.photo_dir);

  anyhow::ensure!(
    server_cfg.birth_year_min <= server_cfg.birth_year_max,
    "birth_year_min ({}) is greater than birth_year_max ({})",
    server_cfg.birth_year_min,
    server_cfg.birth_year_max,
  );

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;
  let people = store.count().await.context("failed to count records")?;

  let renderer = GraphvizRenderer::new(server_cfg.dot_program.clone());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(store, renderer, server_cfg);

  state
    .photos
    .ensure()
    .with_context(|| format!("failed to create photo directory {:?}", state.photos.root()))?;

  tracing::info!(
    people,
    photos = %state.photos.root().display(),
    dot = %state.renderer.program().display(),
    "store opened"
  );

  let app = lineage_web::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
