//! Process-wide accessors.
//!
//! Each function reads its environmental variable on every call, and falls back to defaults
//! computed once per process on Unix and macOS (Windows defaults are recomputed, as they depend
//! on the environment).
//!
//! # Known limitation
//!
//! The defaults are computed under whatever [`DirectoryMode`] is current at the first call.
//! Calling [`set_directory_mode`] afterwards has no effect until [`reset_defaults`] is called.
//! Build a [`BaseDirs`](crate::xdg::BaseDirs) instead, if the mode isn't known up front.
//!
//! ```rust,no_run
//! use basedir::{DirectoryMode, set_directory_mode};
//!
//! // Must happen before anything asks for a directory.
//! set_directory_mode(DirectoryMode::Native);
//! let cache = basedir::cache_home().join("my-app");
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::home::HomeResolver;
use crate::os::command_ext::SystemCommandRunner;
use crate::os::env::Env;
use crate::os::user::{self, UserIdentity};
use crate::xdg::{
    Defaults, DirectoryMode, Platform, XDG_CACHE_HOME, XDG_CONFIG_DIRS, XDG_CONFIG_HOME,
    XDG_DATA_DIRS, XDG_DATA_HOME, XDG_RUNTIME_DIR, XDG_STATE_HOME,
};

static MODE: AtomicU8 = AtomicU8::new(DirectoryMode::Unix as u8);

static DEFAULTS: RwLock<Option<Arc<Defaults>>> = RwLock::new(None);

static IDENTITY: OnceLock<UserIdentity> = OnceLock::new();

/// Current process-wide [`DirectoryMode`]. [`DirectoryMode::Unix`] unless changed.
pub fn directory_mode() -> DirectoryMode {
    DirectoryMode::from_u8(MODE.load(Ordering::Acquire))
}

/// Change the process-wide [`DirectoryMode`]. Only macOS defaults depend on it.
///
/// # Returns
/// `false` if defaults were already computed, in which case the new mode is stored but won't
/// be used until [`reset_defaults`].
pub fn set_directory_mode(mode: DirectoryMode) -> bool {
    MODE.store(mode as u8, Ordering::Release);
    let pending = DEFAULTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_none();
    #[cfg(feature = "tracing")]
    if !pending {
        tracing::warn!(?mode, "directory mode changed after defaults were computed, ignoring");
    }
    pending
}

/// Forget memoized defaults, so the next accessor recomputes them.
pub fn reset_defaults() {
    *DEFAULTS.write().unwrap_or_else(PoisonError::into_inner) = None;
}

fn identity() -> &'static UserIdentity {
    IDENTITY.get_or_init(|| {
        UserIdentity::current().unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!("user identity lookup failed: {_err}");
            UserIdentity {
                home: None,
                uid: user::current_uid(),
            }
        })
    })
}

fn home_resolver(env: Env, platform: Platform) -> HomeResolver {
    HomeResolver::new(
        env,
        identity().home.clone(),
        platform,
        SystemCommandRunner::new(),
    )
}

fn compute_defaults(env: &Env, platform: Platform) -> Defaults {
    let home = home_resolver(env.clone(), platform).dir();
    let defaults = platform.defaults(&home, identity().uid, env);
    #[cfg(feature = "tracing")]
    tracing::debug!(?platform, ?defaults, "computed default directories");
    defaults
}

fn defaults(env: &Env) -> Arc<Defaults> {
    let platform = Platform::current(directory_mode());
    if !platform.memoizes() {
        return Arc::new(compute_defaults(env, platform));
    }
    if let Some(defaults) = DEFAULTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Arc::clone(defaults);
    }
    let mut slot = DEFAULTS.write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have won the race between dropping the read lock and this point.
    Arc::clone(slot.get_or_insert_with(|| Arc::new(compute_defaults(env, platform))))
}

fn lookup(key: &str, default: impl FnOnce(&Defaults) -> PathBuf) -> PathBuf {
    let env = Env::new();
    match env.get_non_empty(key) {
        Some(value) => PathBuf::from(value),
        None => default(&defaults(&env)),
    }
}

fn lookup_list(key: &str, default: impl FnOnce(&Defaults) -> OsString) -> OsString {
    let env = Env::new();
    match env.get_non_empty(key) {
        Some(value) => value.to_os_string(),
        None => default(&defaults(&env)),
    }
}

/// Home directory of the current user, or an empty path if it can't be determined.
///
/// See [`HomeResolver`] for the resolution order.
pub fn home_dir() -> PathBuf {
    home_resolver(Env::new(), Platform::current(directory_mode())).dir()
}

/// `$XDG_DATA_HOME`, or its platform default.
pub fn data_home() -> PathBuf {
    lookup(XDG_DATA_HOME, |defaults| defaults.data_home.clone())
}

/// `$XDG_CONFIG_HOME`, or its platform default.
pub fn config_home() -> PathBuf {
    lookup(XDG_CONFIG_HOME, |defaults| defaults.config_home.clone())
}

/// `$XDG_STATE_HOME`, or its platform default.
pub fn state_home() -> PathBuf {
    lookup(XDG_STATE_HOME, |defaults| defaults.state_home.clone())
}

/// `$XDG_DATA_DIRS`, or its platform default, joined with the platform list separator.
pub fn data_dirs() -> OsString {
    lookup_list(XDG_DATA_DIRS, |defaults| defaults.data_dirs.clone())
}

/// `$XDG_CONFIG_DIRS`, or its platform default, joined with the platform list separator.
pub fn config_dirs() -> OsString {
    lookup_list(XDG_CONFIG_DIRS, |defaults| defaults.config_dirs.clone())
}

/// `$XDG_CACHE_HOME`, or its platform default.
pub fn cache_home() -> PathBuf {
    lookup(XDG_CACHE_HOME, |defaults| defaults.cache_home.clone())
}

/// `$XDG_RUNTIME_DIR`, or its platform default.
pub fn runtime_dir() -> PathBuf {
    lookup(XDG_RUNTIME_DIR, |defaults| defaults.runtime_dir.clone())
}

/// [`data_dirs`] split into separate directories.
pub fn data_dirs_list() -> Vec<PathBuf> {
    Platform::current(directory_mode()).split_paths(&data_dirs())
}

/// [`config_dirs`] split into separate directories.
pub fn config_dirs_list() -> Vec<PathBuf> {
    Platform::current(directory_mode()).split_paths(&config_dirs())
}
