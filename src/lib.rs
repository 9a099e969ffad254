//! Spotify stats and genre-seeded recommendations.
//!
//! This library backs a small web application (and a companion CLI) that lets a
//! user log in with a Spotify account, look at their top tracks, artists, genres
//! and albums, and ask for a short list of track recommendations seeded by the
//! genres of their favourite artists.
//!
//! # Modules
//!
//! - `api` - HTTP handlers and page rendering for the web app
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types shared across the crate
//! - `management` - Per-session state and token lifecycle
//! - `recommendations` - The recommendation builder and its dedup memory
//! - `server` - axum routers for the web app and the CLI login callback
//! - `spotify` - Spotify accounts and Web API clients
//! - `stats` - Dashboard data (top tracks, artists, genres, albums)
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotrec::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> spotrec::Res<()> {
//!     config::load_env().await?;
//!     cli::serve(None, Default::default()).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod recommendations;
pub mod server;
pub mod spotify;
pub mod stats;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the CLI edge where errors from different layers meet and only
/// need to be reported. Library code returns the typed errors from
/// [`error`].
///
/// # Example
///
/// ```
/// use spotrec::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Logged in as {}", identity.display_name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal failures in the binary's startup path. Request handlers and
/// library code report problems with [`warning!`] and recover.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Search for genre {} failed: {}", genre, e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
