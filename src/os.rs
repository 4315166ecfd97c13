//! Platform path helpers

use regex::Regex;
use std::sync::OnceLock;

static DRIVE_PREFIX: OnceLock<Regex> = OnceLock::new();

fn drive_prefix() -> &'static Regex {
    DRIVE_PREFIX.get_or_init(|| Regex::new(r"^([A-Za-z]):\\").unwrap())
}

/// Rewrite a Windows drive path (`C:\Photos\trip`) into its WSL mount
/// form (`/mnt/c/Photos/trip`). Anything else passes through untouched.
pub fn windows_path_to_wsl(path: &str) -> String {
    match drive_prefix().captures(path) {
        Some(caps) => {
            let drive = caps[1].to_lowercase();
            let rest = path[3..].replace('\\', "/");
            format!("/mnt/{}/{}", drive, rest)
        }
        None => path.to_string(),
    }
}

/// Normalize interactive path input: on Linux, Windows-style paths are
/// assumed to point into a WSL mount.
pub fn normalize_input_path(input: &str) -> String {
    let trimmed = input.trim();
    if cfg!(target_os = "linux") && trimmed.contains(':') && trimmed.contains('\\') {
        windows_path_to_wsl(trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_path_to_wsl() {
        assert_eq!(
            windows_path_to_wsl(r"C:\Photos\Trip 2024"),
            "/mnt/c/Photos/Trip 2024"
        );
        assert_eq!(windows_path_to_wsl(r"d:\archive"), "/mnt/d/archive");
        assert_eq!(windows_path_to_wsl("/home/me/photos"), "/home/me/photos");
        assert_eq!(windows_path_to_wsl("relative/path"), "relative/path");
    }
}
