use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Personal reading log with a month-grouped gallery.
#[derive(Parser, Debug, Clone)]
#[command(name = "leio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "LEIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the web interface (default if no command given).
    Serve {
        /// Address to bind the server to.
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Book log commands.
    Book {
        /// Book subcommand action.
        #[command(subcommand)]
        action: BookCommand,
    },

    /// Render a placeholder cover to a PNG file.
    Cover {
        /// Book title.
        #[arg(short, long, default_value = "")]
        title: String,
        /// Author name.
        #[arg(short, long, default_value = "")]
        author: String,
        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,
        /// Seed for the colour picks (random if omitted).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Create a default config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Book subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum BookCommand {
    /// Record a book you have read.
    Add {
        /// Book title.
        #[arg(short, long)]
        title: String,
        /// Author name.
        #[arg(short, long)]
        author: String,
        /// Reading month (YYYY-MM or YYYY-MM-DD).
        #[arg(short, long)]
        month: String,
        /// Rating from 1 to 5.
        #[arg(short, long, default_value = "5")]
        rating: String,
        /// Short synopsis.
        #[arg(short, long)]
        synopsis: String,
        /// Publication year.
        #[arg(short, long)]
        year: Option<String>,
        /// Cover image file (a placeholder is generated if omitted).
        #[arg(long)]
        cover: Option<PathBuf>,
    },

    /// List books, optionally for one month.
    List {
        /// Reading month (YYYY-MM or YYYY-MM-DD).
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List reading months, most recent first.
    Months,

    /// Show one book.
    Show {
        /// Book ID.
        id: String,
    },
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cover configuration.
    #[serde(default)]
    pub covers: CoverConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Site title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Largest accepted upload, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            title: default_title(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    /// Upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        8080,
    )
}

fn default_title() -> String {
    "Leio".to_string()
}

fn default_max_upload_mb() -> usize {
    10
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Key the collection is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            key: default_storage_key(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/leio.db")
}

fn default_storage_key() -> String {
    crate::library::DEFAULT_STORAGE_KEY.to_string()
}

/// Cover configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverConfig {
    /// Placeholder width in pixels (height is 1.5x).
    #[serde(default = "default_cover_width")]
    pub width: u32,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            width: default_cover_width(),
        }
    }
}

fn default_cover_width() -> u32 {
    crate::cover::placeholder::DEFAULT_WIDTH
}

impl CoverConfig {
    /// Placeholder options for this configuration.
    pub fn placeholder_options(&self) -> crate::cover::PlaceholderOptions {
        crate::cover::PlaceholderOptions {
            width: self.width.clamp(60, 1200),
        }
    }
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
            PathBuf::from("leio.toml"),
            dirs::config_dir()
                .map(|p| p.join("leio").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/leio/config.toml"),
        ];

        candidates
            .into_iter()
            .find(|p| !p.as_os_str().is_empty() && p.exists())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# leio configuration

[server]
bind = "127.0.0.1:8080"
title = "Leio"
# Largest accepted cover upload
max_upload_mb = 10

[storage]
# path = "/var/lib/leio/leio.db"
# Key the book collection is stored under
key = "leio-books"

[covers]
# Placeholder cover width in pixels (height is 1.5x)
width = 300
"#
        .to_string()
    }
}
