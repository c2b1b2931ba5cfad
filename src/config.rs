use std::env;
use std::path::PathBuf;

use crate::cli::{Args, ColorChoice};

/// Resolved once at startup and passed by reference from then on. `paths`
/// is the `PATH` cache used for external calls.
pub struct AppConfig {
    pub verbose: bool,
    pub color_enabled: bool,
    pub paths: Vec<PathBuf>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr),
        };

        AppConfig {
            verbose: args.verbose,
            color_enabled,
            paths: split_path(&env::var("PATH").unwrap_or_default()),
        }
    }
}

/// Split on `:` preserving empty segments; an empty segment means the
/// current directory, as the shells treat it.
pub fn split_path(path: &str) -> Vec<PathBuf> {
    path.split(':').map(PathBuf::from).collect()
}
