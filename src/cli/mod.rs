//! # CLI Module
//!
//! Command-line entry points of spotrec.
//!
//! - [`serve`] - runs the web app
//! - [`top`] - prints the user's top tracks, artists, genres and albums
//! - [`recommend`] - prints a genre-seeded recommendation list
//!
//! `top` and `recommend` log in interactively: the authorize URL is opened in
//! the browser and a temporary callback server on `SERVER_ADDRESS` receives
//! the code. The token is kept in memory for the duration of the command only.
//!
//! ## Usage
//!
//! ```bash
//! spotrec serve                              # web app on SERVER_ADDRESS
//! spotrec top --time-range short             # last four weeks
//! spotrec recommend --round-robin --cap 20   # mix genres, longer list
//! ```

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

mod auth;
mod recommend;
mod serve;
mod top;

pub use recommend::recommend;
pub use serve::serve;
pub use top::top;

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
