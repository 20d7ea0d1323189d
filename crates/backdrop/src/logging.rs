//! File logging; the terminal itself belongs to the renderer.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use directories::ProjectDirs;
use env_logger::{Builder, Env, Target};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BACKDROP_LOG";

/// Path of the log file inside the platform data directory.
pub fn log_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "backdrop").map(|dirs| dirs.data_dir().join("backdrop.log"))
}

/// Send `log` output to the log file. Logging stays off if the file can't be opened.
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(dir) = path.parent()
        && fs::create_dir_all(dir).is_err()
    {
        return;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    Builder::from_env(Env::default().filter_or(LOG_ENV, "warn"))
        .target(Target::Pipe(Box::new(file)))
        .init();
}
