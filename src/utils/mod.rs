use std::env;
use std::path::PathBuf;

#[cfg(target_os = "macos")]
const PLATFORM: &str = "macos";

#[cfg(target_os = "windows")]
const PLATFORM: &str = "windows";

#[cfg(target_os = "linux")]
const PLATFORM: &str = "linux";

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
const PLATFORM: &str = "unknown";

const APP_DIR_NAME: &str = "crackalgo";

/// Per-user data directory, e.g. `~/.local/share/crackalgo` on Linux
pub fn get_app_data_dir() -> PathBuf {
    let base = if cfg!(target_os = "windows") {
        env::var_os("LOCALAPPDATA").map(PathBuf::from)
    } else if cfg!(target_os = "macos") {
        env::var_os("HOME").map(|home| PathBuf::from(home).join("Library/Application Support"))
    } else {
        env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share")))
    };

    base.unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn get_database_path(file_name: &str) -> PathBuf {
    get_app_data_dir().join(file_name)
}

pub fn get_platform() -> &'static str {
    PLATFORM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_end_with_app_dir() {
        assert!(get_app_data_dir().ends_with(APP_DIR_NAME));
        assert!(get_database_path("crackalgo.db").ends_with("crackalgo/crackalgo.db"));
        assert!(!get_platform().is_empty());
    }
}
