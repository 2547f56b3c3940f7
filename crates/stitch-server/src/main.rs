//! Stitch Space server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid by
//! `STITCH_*` environment variables, opens the SQLite store, and serves the
//! JSON API under `api_prefix`.
//!
//! # Operator commands
//!
//! ```text
//! stitch-server create-account ada@example.com Ada Lovelace < password.txt
//! stitch-server feature 0f8e... [--off]
//! ```

use std::{
  io::{self, BufRead, Write},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::Router;
use clap::{Parser, Subcommand};
use rand_core::OsRng;
use serde::Deserialize;
use stitch_api::{ApiConfig, AppState};
use stitch_core::{profile::NewAccount, store::SocialStore};
use stitch_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Stitch Space API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API. This is the default.
  Serve,

  /// Register an account and its profile; the password is read from stdin.
  CreateAccount {
    email:      String,
    first_name: String,
    last_name:  String,
  },

  /// Mark a piece as featured, or clear the flag with `--off`.
  Feature {
    piece_id: Uuid,
    #[arg(long)]
    off:      bool,
  },
}

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ServerConfig {
  host:              String,
  port:              u16,
  store_path:        PathBuf,
  api_prefix:        String,
  default_page_size: u32,
  max_page_size:     u32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let api = ApiConfig::default();
    Self {
      host:              "127.0.0.1".to_owned(),
      port:              8000,
      store_path:        PathBuf::from("~/.local/share/stitch/stitch.db"),
      api_prefix:        "/api".to_owned(),
      default_page_size: api.default_page_size,
      max_page_size:     api.max_page_size,
    }
  }
}

impl ServerConfig {
  fn api(&self) -> ApiConfig {
    ApiConfig {
      default_page_size: self.default_page_size.min(self.max_page_size),
      max_page_size:     self.max_page_size,
    }
  }
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
  let server_cfg = load_config(cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(server_cfg, store).await,
    Command::CreateAccount { email, first_name, last_name } => {
      create_account(&store, email, first_name, last_name).await
    }
    Command::Feature { piece_id, off } => {
      let piece = store
        .set_featured(piece_id, !off)
        .await
        .with_context(|| format!("failed to update piece {piece_id}"))?;
      tracing::info!(piece = %piece.piece_id, featured = piece.featured, "featured flag set");
      Ok(())
    }
  }
}

fn load_config(path: PathBuf) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("STITCH").try_parsing(true))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

async fn serve(server_cfg: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg.api()),
  };

  let api = stitch_api::router(state);
  let prefix = server_cfg.api_prefix.trim_end_matches('/');
  let app = if prefix.is_empty() {
    Router::new().merge(api)
  } else {
    Router::new().nest(prefix, api)
  }
  .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}{prefix}/");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn create_account(
  store: &SqliteStore,
  email: String,
  first_name: String,
  last_name: String,
) -> anyhow::Result<()> {
  let email = email.trim().to_owned();
  anyhow::ensure!(email.contains('@'), "{email:?} is not an email address");

  let password = read_password()?;
  anyhow::ensure!(!password.is_empty(), "password must not be empty");

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();

  let profile = store
    .register(NewAccount { email: email.clone(), first_name, last_name, password_hash })
    .await
    .with_context(|| format!("failed to register {email}"))?;

  tracing::info!(profile = %profile.profile_id, %email, "account created");
  println!("{}", profile.profile_id);
  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
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
