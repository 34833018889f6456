//! Configuration management for imgpress.
//!
//! Settings come from command-line arguments or environment variables, with
//! defaults for everything:
//!
//! - `IMGPRESS_HOST` - Server bind address (default: 0.0.0.0)
//! - `IMGPRESS_PORT` - Server port (default: 8888)
//! - `IMGPRESS_UPLOAD_DIR` - Content root for derivatives (default: uploads)
//! - `PUBLIC_URL` - Host portion of returned URLs (default: http://localhost:8888)
//! - `IMGPRESS_MAX_BODY_SIZE` - Upload request limit in bytes (default: 20 MiB)
//! - `IMGPRESS_TARGET_SIZE` - Derivative byte budget (default: 1 MiB)
//! - `IMGPRESS_CACHE_MAX_AGE` - Cache-Control max-age for derivatives (default: 3600)
//! - `IMGPRESS_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use imgpress::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! println!("Derivatives served from {}", config.public_base_url());
//! ```

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::compress::DEFAULT_TARGET_BYTES;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8888;

/// Default content root, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Public URL used when `PUBLIC_URL` is unset or empty.
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8888";

/// Default upload request limit (20 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 20 * 1024 * 1024;

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// imgpress - compress uploaded images under a byte budget and serve them.
#[derive(Parser, Debug, Clone)]
#[command(name = "imgpress")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IMGPRESS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IMGPRESS_PORT")]
    pub port: u16,

    /// Directory derivatives are written to and served from.
    #[arg(long, default_value = DEFAULT_UPLOAD_DIR, env = "IMGPRESS_UPLOAD_DIR")]
    pub upload_dir: PathBuf,

    /// Public base URL used to build derivative URLs.
    ///
    /// Falls back to http://localhost:8888 when unset or empty.
    #[arg(long, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Maximum upload request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE, env = "IMGPRESS_MAX_BODY_SIZE")]
    pub max_body_size: usize,

    /// Byte budget for stored derivatives.
    #[arg(long, default_value_t = DEFAULT_TARGET_BYTES, env = "IMGPRESS_TARGET_SIZE")]
    pub target_size: usize,

    /// HTTP Cache-Control max-age in seconds for served derivatives.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "IMGPRESS_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IMGPRESS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(
                "Upload directory is required. Set --upload-dir or IMGPRESS_UPLOAD_DIR".to_string(),
            );
        }

        if self.max_body_size == 0 {
            return Err("max_body_size must be greater than 0".to_string());
        }
        if self.target_size == 0 {
            return Err("target_size must be greater than 0".to_string());
        }
        if self.target_size > self.max_body_size {
            return Err(format!(
                "target_size ({}) must not exceed max_body_size ({})",
                self.target_size, self.max_body_size
            ));
        }

        if let Some(public_url) = self.public_url.as_deref().filter(|u| !u.is_empty()) {
            let parsed = Url::parse(public_url)
                .map_err(|e| format!("PUBLIC_URL '{}' is not a valid URL: {}", public_url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!(
                    "PUBLIC_URL '{}' must use http or https",
                    public_url
                ));
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL for derivative links, without trailing `/`.
    pub fn public_base_url(&self) -> String {
        resolve_public_base_url(self.public_url.as_deref())
    }

    /// Content root as an absolute path, resolved against the working directory.
    pub fn upload_root(&self) -> std::io::Result<PathBuf> {
        if self.upload_dir.is_absolute() {
            Ok(self.upload_dir.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.upload_dir))
        }
    }
}

/// Pick the public base URL: `public_url` if non-empty, else the default,
/// with trailing `/` removed.
pub fn resolve_public_base_url(public_url: Option<&str>) -> String {
    public_url
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_PUBLIC_URL)
        .trim_end_matches('/')
        .to_string()
}

// =============================================================================
// Tests
// =============================================================================
