pub mod backup;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod favicon;
pub mod model;
pub mod reconcile;
pub mod settings;

use colored::Colorize;

pub use config::AppConfig;
pub use data::Database;
pub use error::{CoreError, Result};

pub fn print_banner() {
    println!(
        "{}",
        r#"
  _              _
 | |_ ___   ___ | |_ __   __ ___   __
 | __/ _ \ / _ \| | '_ \ / _` \ \ / /
 | || (_) | (_) | | | | | (_| |\ V /
  \__\___/ \___/|_|_| |_|\__,_| \_/
"#
        .bright_cyan()
        .bold()
    );
    println!(
        "  {} {}\n",
        "tool navigation backend".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
