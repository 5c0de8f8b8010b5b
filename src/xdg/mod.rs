//! XDG Base Directory Specification support.
//!
//! Implements <https://specifications.freedesktop.org/basedir-spec/0.8/> with platform-specific
//! defaults for Windows and macOS. Every accessor returns the matching environmental variable
//! verbatim when it is set and non-empty, and a default from [`Defaults`] otherwise.
//!
//! ```rust,no_run
//! # use basedir::xdg::{BaseDirs, DirectoryMode};
//! let dirs = BaseDirs::builder().mode(DirectoryMode::Native).build();
//!
//! let config = dirs.config_home().join("my-app");
//! for dir in dirs.config_dirs_list() {
//!     println!("{}", dir.join("my-app").display());
//! }
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::home::HomeResolver;
use crate::os::command_ext::SystemCommandRunner;
use crate::os::env::Env;
use crate::os::user::{self, UserIdentity};

mod platform;

pub use platform::{Defaults, DirectoryMode, Platform};

pub(crate) const XDG_DATA_HOME: &str = "XDG_DATA_HOME";
pub(crate) const XDG_CONFIG_HOME: &str = "XDG_CONFIG_HOME";
pub(crate) const XDG_STATE_HOME: &str = "XDG_STATE_HOME";
pub(crate) const XDG_DATA_DIRS: &str = "XDG_DATA_DIRS";
pub(crate) const XDG_CONFIG_DIRS: &str = "XDG_CONFIG_DIRS";
pub(crate) const XDG_CACHE_HOME: &str = "XDG_CACHE_HOME";
pub(crate) const XDG_RUNTIME_DIR: &str = "XDG_RUNTIME_DIR";

/// Resolved base directories for one user and one environment.
///
/// Everything it depends on is fixed at construction (see [`BaseDirsBuilder`]), so unlike the
/// process-wide functions in [`crate::global`] a different [`DirectoryMode`] simply means a
/// different [`BaseDirs`].
#[derive(Debug, Clone)]
pub struct BaseDirs {
    env: Env,
    home: PathBuf,
    platform: Platform,
    defaults: Defaults,
}

impl BaseDirs {
    /// Base directories of the running process, in [`DirectoryMode::Unix`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring [`BaseDirs`] explicitly.
    pub fn builder() -> BaseDirsBuilder {
        BaseDirsBuilder::default()
    }

    /// Assemble from already resolved parts.
    pub fn from_parts(env: Env, home: PathBuf, platform: Platform, defaults: Defaults) -> Self {
        Self {
            env,
            home,
            platform,
            defaults,
        }
    }

    /// Home directory the defaults were derived from. Empty if it could not be resolved.
    pub fn home_dir(&self) -> &Path {
        &self.home
    }

    /// Platform the defaults were computed for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Defaults used for every unset or empty variable.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    fn lookup(&self, key: &str) -> Option<PathBuf> {
        self.env.get_non_empty(key).map(PathBuf::from)
    }

    fn lookup_list(&self, key: &str) -> Option<OsString> {
        self.env.get_non_empty(key).map(|value| value.to_os_string())
    }

    /// `$XDG_DATA_HOME`, defaulting to `~/.local/share`.
    pub fn data_home(&self) -> PathBuf {
        self.lookup(XDG_DATA_HOME)
            .unwrap_or_else(|| self.defaults.data_home.clone())
    }

    /// `$XDG_CONFIG_HOME`, defaulting to `~/.config`.
    pub fn config_home(&self) -> PathBuf {
        self.lookup(XDG_CONFIG_HOME)
            .unwrap_or_else(|| self.defaults.config_home.clone())
    }

    /// `$XDG_STATE_HOME`, defaulting to `~/.local/state`.
    pub fn state_home(&self) -> PathBuf {
        self.lookup(XDG_STATE_HOME)
            .unwrap_or_else(|| self.defaults.state_home.clone())
    }

    /// `$XDG_DATA_DIRS`, defaulting to `/usr/local/share:/usr/share`.
    ///
    /// Entries are joined with [`Platform::list_separator`]; see
    /// [`data_dirs_list`](BaseDirs::data_dirs_list) for the split form.
    pub fn data_dirs(&self) -> OsString {
        self.lookup_list(XDG_DATA_DIRS)
            .unwrap_or_else(|| self.defaults.data_dirs.clone())
    }

    /// `$XDG_CONFIG_DIRS`, defaulting to `/etc/xdg`.
    pub fn config_dirs(&self) -> OsString {
        self.lookup_list(XDG_CONFIG_DIRS)
            .unwrap_or_else(|| self.defaults.config_dirs.clone())
    }

    /// `$XDG_CACHE_HOME`, defaulting to `~/.cache`.
    pub fn cache_home(&self) -> PathBuf {
        self.lookup(XDG_CACHE_HOME)
            .unwrap_or_else(|| self.defaults.cache_home.clone())
    }

    /// `$XDG_RUNTIME_DIR`, defaulting to `/run/user/$UID`.
    ///
    /// The default directory is not guaranteed to exist, nor to have `0700` permissions.
    pub fn runtime_dir(&self) -> PathBuf {
        self.lookup(XDG_RUNTIME_DIR)
            .unwrap_or_else(|| self.defaults.runtime_dir.clone())
    }

    /// [`data_dirs`](BaseDirs::data_dirs) split into separate directories, in preference order.
    pub fn data_dirs_list(&self) -> Vec<PathBuf> {
        self.platform.split_paths(&self.data_dirs())
    }

    /// [`config_dirs`](BaseDirs::config_dirs) split into separate directories, in preference order.
    pub fn config_dirs_list(&self) -> Vec<PathBuf> {
        self.platform.split_paths(&self.config_dirs())
    }
}

impl Default for BaseDirs {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`BaseDirs`].
///
/// Anything left unset is taken from the running process: [`Env::new`], [`UserIdentity::current`]
/// and [`Platform::current`].
#[derive(Debug, Clone, Default)]
pub struct BaseDirsBuilder {
    env: Option<Env>,
    home: Option<PathBuf>,
    uid: Option<u32>,
    mode: DirectoryMode,
    platform: Option<Platform>,
}

impl BaseDirsBuilder {
    /// Read variables from `env` instead of the process environment.
    pub fn env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    /// Use `home` instead of running [`HomeResolver`].
    pub fn home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// User id for the `/run/user/$UID` runtime default.
    pub fn uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Layout of macOS defaults. Ignored, if [`platform`](BaseDirsBuilder::platform) is set.
    pub fn mode(mut self, mode: DirectoryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Compute defaults for `platform`, regardless of the target OS.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Resolve whatever was left unset and compute the defaults.
    pub fn build(self) -> BaseDirs {
        let env = self.env.unwrap_or_default();
        let platform = self
            .platform
            .unwrap_or_else(|| Platform::current(self.mode));

        // The user database is only consulted for what wasn't injected.
        let identity = match (&self.home, self.uid) {
            (Some(_), Some(_)) => UserIdentity::default(),
            _ => UserIdentity::current().unwrap_or_else(|_err| {
                #[cfg(feature = "tracing")]
                tracing::debug!("user identity lookup failed: {_err}");
                UserIdentity {
                    home: None,
                    uid: user::current_uid(),
                }
            }),
        };
        let home = self.home.unwrap_or_else(|| {
            HomeResolver::new(env.clone(), identity.home, platform, SystemCommandRunner::new())
                .dir()
        });
        let uid = self.uid.or(identity.uid);

        let defaults = platform.defaults(&home, uid, &env);
        #[cfg(feature = "tracing")]
        tracing::debug!(?platform, ?defaults, "computed default directories");
        BaseDirs::from_parts(env, home, platform, defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::assert_none;

    const HOME: &str = "/home/gopher";

    fn dirs(platform: Platform, vars: &[(&str, &str)]) -> BaseDirs {
        BaseDirs::builder()
            .env(vars.iter().copied().collect())
            .home(HOME)
            .uid(1000)
            .platform(platform)
            .build()
    }

    fn unix(vars: &[(&str, &str)]) -> BaseDirs {
        dirs(Platform::Unix, vars)
    }

    fn home() -> PathBuf {
        PathBuf::from(HOME)
    }

    #[test]
    fn set_variables_pass_through_verbatim() {
        let platforms = [
            Platform::Unix,
            Platform::Windows,
            Platform::MacOsUnix,
            Platform::MacOsNative,
        ];
        for platform in platforms {
            let dirs = dirs(
                platform,
                &[
                    (XDG_DATA_HOME, "/tmp/xdg/.local/share"),
                    (XDG_CONFIG_HOME, "/tmp/config"),
                    (XDG_STATE_HOME, "/tmp/state"),
                    (XDG_DATA_DIRS, "/opt/local/share"),
                    (XDG_CONFIG_DIRS, "/var/etc/xdg"),
                    (XDG_CACHE_HOME, "/tmp/cache"),
                    (XDG_RUNTIME_DIR, "/tmp/user/1000"),
                ],
            );
            assert_eq!(dirs.data_home(), PathBuf::from("/tmp/xdg/.local/share"));
            assert_eq!(dirs.config_home(), PathBuf::from("/tmp/config"));
            assert_eq!(dirs.state_home(), PathBuf::from("/tmp/state"));
            assert_eq!(dirs.data_dirs(), "/opt/local/share");
            assert_eq!(dirs.config_dirs(), "/var/etc/xdg");
            assert_eq!(dirs.cache_home(), PathBuf::from("/tmp/cache"));
            assert_eq!(dirs.runtime_dir(), PathBuf::from("/tmp/user/1000"));
        }
    }

    #[test]
    fn unset_variables_use_defaults() {
        let dirs = unix(&[]);
        assert_eq!(dirs.data_home(), home().join(".local/share"));
        assert_eq!(dirs.config_home(), home().join(".config"));
        assert_eq!(dirs.state_home(), home().join(".local/state"));
        assert_eq!(dirs.data_dirs(), "/usr/local/share:/usr/share");
        assert_eq!(dirs.config_dirs(), "/etc/xdg");
        assert_eq!(dirs.cache_home(), home().join(".cache"));
        assert_eq!(dirs.runtime_dir(), PathBuf::from("/run/user/1000"));
    }

    #[test]
    fn empty_variables_are_treated_as_unset() {
        let empty = [
            (XDG_DATA_HOME, ""),
            (XDG_CONFIG_HOME, ""),
            (XDG_STATE_HOME, ""),
            (XDG_DATA_DIRS, ""),
            (XDG_CONFIG_DIRS, ""),
            (XDG_CACHE_HOME, ""),
            (XDG_RUNTIME_DIR, ""),
        ];
        let with_empty = unix(&empty);
        let without = unix(&[]);
        assert_eq!(with_empty.data_home(), without.data_home());
        assert_eq!(with_empty.config_home(), without.config_home());
        assert_eq!(with_empty.state_home(), without.state_home());
        assert_eq!(with_empty.data_dirs(), without.data_dirs());
        assert_eq!(with_empty.config_dirs(), without.config_dirs());
        assert_eq!(with_empty.cache_home(), without.cache_home());
        assert_eq!(with_empty.runtime_dir(), without.runtime_dir());
        assert!(!with_empty.cache_home().as_os_str().is_empty());
    }

    #[test]
    fn empty_cache_home_uses_home_from_environment() {
        let dirs = BaseDirs::builder()
            .env([("XDG_CACHE_HOME", ""), ("HOME", "/home/alice")].into_iter().collect())
            .uid(1000)
            .platform(Platform::Unix)
            .build();
        assert_eq!(dirs.home_dir(), Path::new("/home/alice"));
        assert_eq!(dirs.cache_home(), PathBuf::from("/home/alice/.cache"));
    }

    #[test]
    fn custom_config_dirs_are_returned_verbatim() {
        let dirs = unix(&[(XDG_CONFIG_DIRS, "/custom/xdg")]);
        assert_eq!(dirs.config_dirs(), "/custom/xdg");
        assert_eq!(dirs.config_dirs_list(), [PathBuf::from("/custom/xdg")]);
    }

    #[test]
    fn native_mode_collapses_search_paths() {
        let dirs = dirs(Platform::MacOsNative, &[]);
        assert_eq!(dirs.data_dirs(), dirs.data_home().into_os_string());
        assert_eq!(dirs.config_dirs(), dirs.config_home().into_os_string());
        assert_eq!(dirs.cache_home(), home().join("Library/Caches"));
        assert_eq!(dirs.runtime_dir(), dirs.data_home());
    }

    #[test]
    fn mode_selects_macos_layout_only_on_macos() {
        let dirs = BaseDirs::builder()
            .env(Env::new_from(Default::default()))
            .home(HOME)
            .uid(501)
            .mode(DirectoryMode::Native)
            .build();
        if cfg!(target_os = "macos") {
            assert_eq!(dirs.platform(), Platform::MacOsNative);
            assert_eq!(dirs.config_home(), home().join("Library/Preferences"));
        } else {
            assert_eq!(dirs.platform(), Platform::current(DirectoryMode::Unix));
        }
    }

    #[test]
    fn explicit_platform_wins_over_mode() {
        let dirs = BaseDirs::builder()
            .env(Env::new_from(Default::default()))
            .home(HOME)
            .uid(501)
            .mode(DirectoryMode::Native)
            .platform(Platform::MacOsUnix)
            .build();
        assert_eq!(dirs.config_home(), home().join(".config"));
    }

    #[test]
    fn default_data_dirs_split_into_two_entries() {
        let dirs = unix(&[]);
        assert_eq!(
            dirs.data_dirs_list(),
            [PathBuf::from("/usr/local/share"), PathBuf::from("/usr/share")]
        );
    }

    #[test]
    fn windows_lists_split_on_semicolon() {
        let dirs = dirs(Platform::Windows, &[(XDG_DATA_DIRS, "C:\\a;D:\\b")]);
        assert_eq!(
            dirs.data_dirs_list(),
            [PathBuf::from("C:\\a"), PathBuf::from("D:\\b")]
        );
    }

    #[test]
    fn accessors_are_idempotent() {
        let dirs = unix(&[(XDG_CONFIG_HOME, "/tmp/config")]);
        assert_eq!(dirs.data_home(), dirs.data_home());
        assert_eq!(dirs.config_home(), dirs.config_home());
        assert_eq!(dirs.data_dirs(), dirs.data_dirs());
        assert_eq!(dirs.runtime_dir(), dirs.runtime_dir());
    }

    #[test]
    fn unresolved_home_yields_relative_defaults() {
        let dirs = BaseDirs::from_parts(
            Env::new_from(Default::default()),
            PathBuf::new(),
            Platform::Unix,
            Platform::Unix.defaults(Path::new(""), Some(1000), &Env::new_from(Default::default())),
        );
        assert!(dirs.home_dir().as_os_str().is_empty());
        assert_eq!(dirs.cache_home(), PathBuf::from(".cache"));
        assert_none!(dirs.env.get_non_empty(XDG_CACHE_HOME));
    }
}
