use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Book catalog with mood, pace, hero and style filters.
#[derive(Parser, Debug, Clone)]
#[command(name = "bookhunt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "BOOKHUNT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the server (default if no command given).
    Serve {
        /// Address to bind the server to.
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Storage backend override ("sqlite" or "file").
        #[arg(long)]
        backend: Option<Backend>,
    },

    /// Initialize database and create default config.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },

    /// Copy records from the fallback files into the database.
    Import,

    /// List books from the API in the terminal.
    Browse {
        /// API base URL (overrides config).
        #[arg(long)]
        api: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Only show favorite books.
        #[arg(long)]
        favorites_only: bool,
    },

    /// Toggle a book in the local favorites list.
    Fav {
        /// Book ID.
        id: String,
    },
}

/// Filter flags shared by terminal commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Atmosphere (exact match).
    #[arg(long)]
    pub atmosphere: Option<String>,
    /// Pace (exact match).
    #[arg(long)]
    pub pace: Option<String>,
    /// Hero archetype (exact match).
    #[arg(long)]
    pub hero: Option<String>,
    /// Style (exact match).
    #[arg(long)]
    pub style: Option<String>,
    /// Search in title, author and description.
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite database.
    Sqlite,
    /// JSON files (seed dataset and comments file).
    File,
}

impl Backend {
    /// Backend name as used in config and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::File => "file",
        }
    }
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage selection.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// File locations.
    #[serde(default)]
    pub files: FilesConfig,

    /// Catalog listing configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Terminal client configuration.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Page title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Maximum request body size (cover uploads).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            title: default_title(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        4000,
    )
}

fn default_title() -> String {
    "BookHunt".to_string()
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

/// Storage selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Preferred backend.
    #[serde(default = "default_backend")]
    pub backend: Backend,

    /// Use the file backend when the database cannot be opened at startup.
    #[serde(default = "default_fallback_to_file")]
    pub fallback_to_file: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            fallback_to_file: default_fallback_to_file(),
        }
    }
}

fn default_backend() -> Backend {
    Backend::Sqlite
}

fn default_fallback_to_file() -> bool {
    true
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/bookhunt.db")
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Seed dataset, also the file backend's book store.
    #[serde(default = "default_seed")]
    pub seed: PathBuf,

    /// Comments file used by the file backend.
    #[serde(default = "default_comments")]
    pub comments: PathBuf,

    /// Directory for uploaded covers (served at /uploads).
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// Directory for static assets (served at /assets).
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Cover URL used when a book has none.
    #[serde(default = "default_cover")]
    pub default_cover: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            comments: default_comments(),
            uploads_dir: default_uploads_dir(),
            assets_dir: default_assets_dir(),
            default_cover: default_cover(),
        }
    }
}

fn default_seed() -> PathBuf {
    PathBuf::from("frontend/db/seed.json")
}

fn default_comments() -> PathBuf {
    PathBuf::from("data/comments.json")
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("frontend/assets")
}

/// Default cover URL.
pub fn default_cover() -> String {
    "/assets/covers/tihie.svg".to_string()
}

/// Catalog listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Maximum number of books returned by the listing.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

fn default_list_limit() -> usize {
    100
}

/// Terminal client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Local favorites file.
    #[serde(default = "default_favorites_path")]
    pub favorites: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            favorites: default_favorites_path(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_favorites_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("bookhunt").join("favorites.json"))
        .unwrap_or_else(|| PathBuf::from("favorites.json"))
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("bookhunt.toml"),
            dirs::config_dir()
                .map(|p| p.join("bookhunt").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/bookhunt/config.toml"),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# bookhunt configuration

[server]
bind = "0.0.0.0:4000"
title = "BookHunt"
# Maximum upload size in bytes
max_upload_bytes = 5242880

[storage]
# Backend: "sqlite" or "file"
backend = "sqlite"
# Switch to the file backend if the database cannot be opened at startup
fallback_to_file = true

[database]
# path = "/var/lib/bookhunt/bookhunt.db"

[files]
seed = "frontend/db/seed.json"
comments = "data/comments.json"
uploads_dir = "data/uploads"
assets_dir = "frontend/assets"
default_cover = "/assets/covers/tihie.svg"

[catalog]
list_limit = 100

[client]
api_url = "http://localhost:4000"
# favorites = "~/.local/share/bookhunt/favorites.json"
"#
        .to_string()
    }
}
