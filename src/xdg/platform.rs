//! Platform strategies for default directory computation.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::os::env::Env;

/// How macOS defaults should be laid out.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum DirectoryMode {
    /// Same defaults as Linux, like `~/.config`.
    #[default]
    Unix = 0,
    /// Apple's native layout in `~/Library/...`.
    Native = 1,
}

impl DirectoryMode {
    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Native,
            _ => Self::Unix,
        }
    }
}

/// Closed set of platform strategies.
///
/// Selected once (see [`Platform::current`]) and then consulted for both the home directory
/// strategy and the default directories, so accessors never branch on the OS themselves.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Platform {
    /// Linux, the BSDs and any other non-Apple Unix.
    Unix,
    /// Windows family.
    Windows,
    /// macOS with [`DirectoryMode::Unix`].
    MacOsUnix,
    /// macOS with [`DirectoryMode::Native`].
    MacOsNative,
}

impl Platform {
    /// Strategy for the compilation target. `mode` only matters on macOS.
    pub const fn current(mode: DirectoryMode) -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            match mode {
                DirectoryMode::Unix => Self::MacOsUnix,
                DirectoryMode::Native => Self::MacOsNative,
            }
        } else {
            Self::Unix
        }
    }

    /// Whether the home directory is resolved the Windows way.
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Separator joining entries of `XDG_DATA_DIRS` and `XDG_CONFIG_DIRS`.
    pub const fn list_separator(self) -> char {
        match self {
            Self::Windows => ';',
            Self::Unix | Self::MacOsUnix | Self::MacOsNative => ':',
        }
    }

    /// Whether process-wide defaults are computed once and reused.
    ///
    /// Windows defaults depend on `%LOCALAPPDATA%` and friends, so they are recomputed.
    pub const fn memoizes(self) -> bool {
        !self.is_windows()
    }

    /// Compute default directories for a user living in `home`.
    ///
    /// `env` is only consulted on Windows, for its known-folder variables.
    pub fn defaults(self, home: &Path, uid: Option<u32>, env: &Env) -> Defaults {
        match self {
            Self::Unix | Self::MacOsUnix => unix_defaults(self, home, uid),
            Self::MacOsNative => native_defaults(home),
            Self::Windows => windows_defaults(home, env),
        }
    }

    /// Join `entries` with [`Platform::list_separator`].
    pub fn join_paths<I>(self, entries: I) -> OsString
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let separator = self.list_separator().to_string();
        let mut joined = OsString::new();
        for (index, entry) in entries.into_iter().enumerate() {
            if index > 0 {
                joined.push(&separator);
            }
            joined.push(entry.as_ref());
        }
        joined
    }

    /// Split a search path on [`Platform::list_separator`], skipping empty entries.
    pub fn split_paths(self, value: &OsStr) -> Vec<PathBuf> {
        let separator = self.list_separator() as u8;
        value
            .as_encoded_bytes()
            .split(|byte| *byte == separator)
            .filter(|entry| !entry.is_empty())
            // SAFETY: the separator is ASCII, so every entry starts and ends on a boundary of
            // the original encoded string.
            .map(|entry| PathBuf::from(unsafe { OsStr::from_encoded_bytes_unchecked(entry) }))
            .collect()
    }
}

/// Default directories, used whenever the matching environmental variable is unset or empty.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Defaults {
    /// Default for `$XDG_DATA_HOME`.
    pub data_home: PathBuf,
    /// Default for `$XDG_CONFIG_HOME`.
    pub config_home: PathBuf,
    /// Default for `$XDG_STATE_HOME`.
    pub state_home: PathBuf,
    /// Default for `$XDG_DATA_DIRS`, joined with [`Platform::list_separator`].
    pub data_dirs: OsString,
    /// Default for `$XDG_CONFIG_DIRS`, joined with [`Platform::list_separator`].
    pub config_dirs: OsString,
    /// Default for `$XDG_CACHE_HOME`.
    pub cache_home: PathBuf,
    /// Default for `$XDG_RUNTIME_DIR`.
    pub runtime_dir: PathBuf,
}

fn unix_defaults(platform: Platform, home: &Path, uid: Option<u32>) -> Defaults {
    let runtime_dir = match uid {
        Some(uid) => Path::new("/run/user").join(uid.to_string()),
        None => PathBuf::from("/tmp"),
    };
    Defaults {
        data_home: home.join(".local").join("share"),
        config_home: home.join(".config"),
        state_home: home.join(".local").join("state"),
        data_dirs: platform.join_paths(["/usr/local/share", "/usr/share"]),
        config_dirs: OsString::from("/etc/xdg"),
        cache_home: home.join(".cache"),
        runtime_dir,
    }
}

// https://developer.apple.com/library/archive/documentation/FileManagement/Conceptual/FileSystemProgrammingGuide/MacOSXDirectories/MacOSXDirectories.html
fn native_defaults(home: &Path) -> Defaults {
    let library = home.join("Library");
    let data_home = library.join("Application Support");
    let config_home = library.join("Preferences");
    Defaults {
        data_dirs: data_home.clone().into_os_string(),
        config_dirs: config_home.clone().into_os_string(),
        cache_home: library.join("Caches"),
        runtime_dir: data_home.clone(),
        state_home: data_home.clone(),
        data_home,
        config_home,
    }
}

fn known_folder(env: &Env, key: &str, fallback: impl FnOnce() -> PathBuf) -> PathBuf {
    env.get_non_empty(key)
        .map(PathBuf::from)
        .unwrap_or_else(fallback)
}

fn windows_defaults(home: &Path, env: &Env) -> Defaults {
    let local = known_folder(env, "LOCALAPPDATA", || home.join("AppData").join("Local"));
    let roaming = known_folder(env, "APPDATA", || home.join("AppData").join("Roaming"));
    let program_data = known_folder(env, "PROGRAMDATA", || PathBuf::from("C:\\ProgramData"));
    let temp = known_folder(env, "TEMP", || local.join("Temp"));
    Defaults {
        data_dirs: program_data.clone().into_os_string(),
        config_dirs: program_data.into_os_string(),
        cache_home: local.join("cache"),
        state_home: local.clone(),
        runtime_dir: temp,
        config_home: roaming,
        data_home: local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> PathBuf {
        Path::new("/home").join("gopher")
    }

    fn no_env() -> Env {
        Env::new_from(Default::default())
    }

    #[test]
    fn mode_defaults_to_unix() {
        assert_eq!(DirectoryMode::default(), DirectoryMode::Unix);
        assert_eq!(DirectoryMode::from_u8(DirectoryMode::Native as u8), DirectoryMode::Native);
        assert_eq!(DirectoryMode::from_u8(DirectoryMode::Unix as u8), DirectoryMode::Unix);
    }

    #[test]
    fn current_platform_matches_target() {
        let platform = Platform::current(DirectoryMode::Native);
        if cfg!(windows) {
            assert_eq!(platform, Platform::Windows);
        } else if cfg!(target_os = "macos") {
            assert_eq!(platform, Platform::MacOsNative);
            assert_eq!(Platform::current(DirectoryMode::Unix), Platform::MacOsUnix);
        } else {
            assert_eq!(platform, Platform::Unix);
            assert_eq!(Platform::current(DirectoryMode::Unix), Platform::Unix);
        }
    }

    #[test]
    fn unix_defaults_follow_xdg() {
        let defaults = Platform::Unix.defaults(&home(), Some(1000), &no_env());
        assert_eq!(defaults.data_home, home().join(".local/share"));
        assert_eq!(defaults.config_home, home().join(".config"));
        assert_eq!(defaults.state_home, home().join(".local/state"));
        assert_eq!(defaults.data_dirs, "/usr/local/share:/usr/share");
        assert_eq!(defaults.config_dirs, "/etc/xdg");
        assert_eq!(defaults.cache_home, home().join(".cache"));
        assert_eq!(defaults.runtime_dir, PathBuf::from("/run/user/1000"));
    }

    #[test]
    fn data_dirs_default_has_exactly_two_entries() {
        let defaults = Platform::Unix.defaults(&home(), Some(1000), &no_env());
        assert_eq!(
            Platform::Unix.split_paths(&defaults.data_dirs),
            [PathBuf::from("/usr/local/share"), PathBuf::from("/usr/share")]
        );
    }

    #[test]
    fn unknown_uid_falls_back_to_tmp() {
        let defaults = Platform::Unix.defaults(&home(), None, &no_env());
        assert_eq!(defaults.runtime_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn macos_unix_mode_matches_unix() {
        assert_eq!(
            Platform::MacOsUnix.defaults(&home(), Some(501), &no_env()),
            Platform::Unix.defaults(&home(), Some(501), &no_env())
        );
    }

    #[test]
    fn macos_native_mode_uses_library() {
        let defaults = Platform::MacOsNative.defaults(&home(), Some(501), &no_env());
        let support = home().join("Library/Application Support");
        let preferences = home().join("Library/Preferences");
        assert_eq!(defaults.data_home, support);
        assert_eq!(defaults.config_home, preferences);
        assert_eq!(defaults.data_dirs, support.as_os_str());
        assert_eq!(defaults.config_dirs, preferences.as_os_str());
        assert_eq!(defaults.cache_home, home().join("Library/Caches"));
        assert_eq!(defaults.runtime_dir, support);
        assert_eq!(defaults.state_home, support);
    }

    #[test]
    fn windows_defaults_prefer_known_folder_variables() {
        let env: Env = [
            ("LOCALAPPDATA", "C:\\Users\\gopher\\AppData\\Local"),
            ("APPDATA", "C:\\Users\\gopher\\AppData\\Roaming"),
            ("PROGRAMDATA", "D:\\ProgramData"),
            ("TEMP", "C:\\Temp"),
        ]
        .into_iter()
        .collect();
        let defaults = Platform::Windows.defaults(Path::new("C:\\Users\\gopher"), None, &env);
        assert_eq!(defaults.data_home, PathBuf::from("C:\\Users\\gopher\\AppData\\Local"));
        assert_eq!(defaults.config_home, PathBuf::from("C:\\Users\\gopher\\AppData\\Roaming"));
        assert_eq!(defaults.data_dirs, "D:\\ProgramData");
        assert_eq!(defaults.config_dirs, "D:\\ProgramData");
        assert_eq!(defaults.runtime_dir, PathBuf::from("C:\\Temp"));
    }

    #[test]
    fn windows_defaults_fall_back_to_home() {
        let env: Env = [("LOCALAPPDATA", "")].into_iter().collect();
        let defaults = Platform::Windows.defaults(&home(), None, &env);
        let local = home().join("AppData").join("Local");
        assert_eq!(defaults.data_home, local);
        assert_eq!(defaults.config_home, home().join("AppData").join("Roaming"));
        assert_eq!(defaults.state_home, local);
        assert_eq!(defaults.cache_home, local.join("cache"));
        assert_eq!(defaults.runtime_dir, local.join("Temp"));
        assert_eq!(defaults.data_dirs, "C:\\ProgramData");
    }

    #[test]
    fn separators_follow_platform() {
        assert_eq!(Platform::Unix.join_paths(["/a", "/b"]), "/a:/b");
        assert_eq!(Platform::Windows.join_paths(["C:\\a", "D:\\b"]), "C:\\a;D:\\b");
        assert_eq!(Platform::Unix.join_paths(Vec::<&str>::new()), "");
    }

    #[test]
    fn split_skips_empty_entries() {
        assert_eq!(
            Platform::Unix.split_paths(OsStr::new("/a::/b:")),
            [PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert_eq!(
            Platform::Windows.split_paths(OsStr::new("C:\\a;D:\\b")),
            [PathBuf::from("C:\\a"), PathBuf::from("D:\\b")]
        );
        assert!(Platform::Unix.split_paths(OsStr::new("")).is_empty());
    }

    #[test]
    fn only_windows_skips_memoization() {
        assert!(Platform::Unix.memoizes());
        assert!(Platform::MacOsUnix.memoizes());
        assert!(Platform::MacOsNative.memoizes());
        assert!(!Platform::Windows.memoizes());
    }
}
