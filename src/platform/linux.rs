// Startpage platform paths for Linux
// Config: $XDG_CONFIG_HOME/startpage or ~/.config/startpage
// Data:   $XDG_DATA_HOME/startpage or ~/.local/share/startpage

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "startpage";

pub fn get_config_dir() -> PathBuf {
    resolve(env::var("XDG_CONFIG_HOME").ok(), env::var("HOME").ok(), &[".config"])
}

pub fn get_data_dir() -> PathBuf {
    resolve(env::var("XDG_DATA_HOME").ok(), env::var("HOME").ok(), &[".local", "share"])
}

/// Picks `$XDG_*/startpage` when the XDG variable is set and non-empty,
/// otherwise `<home>/<fallback...>/startpage`.
fn resolve(xdg: Option<String>, home: Option<String>, fallback: &[&str]) -> PathBuf {
    match xdg.filter(|v| !v.is_empty()) {
        Some(base) => PathBuf::from(base).join(APP_DIR),
        None => {
            let mut path = PathBuf::from(home.unwrap_or_else(|| String::from("/tmp")));
            for part in fallback {
                path.push(part);
            }
            path.join(APP_DIR)
        }
    }
}
