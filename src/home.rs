//! Home directory detection.
//!
//! Resolution order:
//! 1. `$HOME`, if set and non-empty.
//! 2. On Windows: `%USERPROFILE%`, then `%HOMEDRIVE%%HOMEPATH%`, then `cmd /C echo %USERPROFILE%`.
//! 3. Elsewhere: the home directory from the user database, then `sh -c "cd && pwd"`.
//!
//! ```rust,no_run
//! # use basedir::home::HomeResolver;
//! # use basedir::os::env::Env;
//! let home = HomeResolver::system(Env::new()).dir();
//! if home.as_os_str().is_empty() {
//!     eprintln!("no home directory");
//! }
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

use crate::os::command_ext::{CommandError, CommandRunner, SystemCommandRunner};
use crate::os::env::Env;
use crate::os::user::UserIdentity;
use crate::xdg::Platform;

const UNEXPANDED_USERPROFILE: &str = "%USERPROFILE%";

/// Errors encountered when resolving the home directory.
#[derive(Debug, Error)]
pub enum HomeError {
    /// Every strategy came back empty.
    #[error("could not determine the home directory")]
    Unresolved,

    /// The shell fallback could not be run.
    #[error("home directory lookup through the shell failed: {0}")]
    Shell(#[from] CommandError),
}

/// Finds the home directory of the current user.
#[derive(Debug, Clone)]
pub struct HomeResolver<R = SystemCommandRunner> {
    env: Env,
    identity_home: Option<PathBuf>,
    platform: Platform,
    runner: R,
}

impl HomeResolver {
    /// Resolver for the running process: target platform, user database, real subprocesses.
    pub fn system(env: Env) -> Self {
        let identity_home = match UserIdentity::current() {
            Ok(identity) => identity.home,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("user identity lookup failed: {_err}");
                None
            }
        };
        Self::new(
            env,
            identity_home,
            Platform::current(Default::default()),
            SystemCommandRunner::new(),
        )
    }
}

impl<R: CommandRunner> HomeResolver<R> {
    /// Resolver with every collaborator injected.
    ///
    /// `identity_home` is the user database answer (see [`UserIdentity`]), and `platform` only
    /// decides between the Windows and the Unix strategy.
    pub fn new(env: Env, identity_home: Option<PathBuf>, platform: Platform, runner: R) -> Self {
        Self {
            env,
            identity_home,
            platform,
            runner,
        }
    }

    /// Home directory, or an empty path if it can't be determined.
    ///
    /// Callers must treat the empty path as "unresolved".
    pub fn dir(&self) -> PathBuf {
        self.resolve().unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!("{_err}");
            PathBuf::new()
        })
    }

    /// Home directory, trying every strategy in order.
    ///
    /// # Returns
    /// [`HomeError::Unresolved`] if all strategies return nothing, or [`HomeError::Shell`] if
    /// the last resort failed to run.
    pub fn resolve(&self) -> Result<PathBuf, HomeError> {
        if let Some(home) = self.env.get_non_empty("HOME") {
            #[cfg(feature = "tracing")]
            tracing::debug!(home = ?home, "home directory from $HOME");
            return Ok(PathBuf::from(home));
        }
        let from_platform = if self.platform.is_windows() {
            self.windows_env_home()
        } else {
            self.identity_home
                .clone()
                .filter(|home| !home.as_os_str().is_empty())
        };
        match from_platform {
            Some(home) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(home = ?home, "home directory from platform lookup");
                Ok(home)
            }
            None => self.shell_home(),
        }
    }

    /// Ask a shell for the home directory.
    ///
    /// This is the last step of [`HomeResolver::resolve`], exposed on its own.
    pub fn shell_home(&self) -> Result<PathBuf, HomeError> {
        let output = if self.platform.is_windows() {
            self.runner
                .run("cmd", &["/C", "echo", UNEXPANDED_USERPROFILE])?
        } else {
            self.runner.run("sh", &["-c", "cd && pwd"])?
        };
        // `cmd` echoes the variable reference verbatim, if it's undefined.
        if output.is_empty() || output == UNEXPANDED_USERPROFILE {
            return Err(HomeError::Unresolved);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(home = %output, "home directory from shell");
        Ok(PathBuf::from(output))
    }

    fn windows_env_home(&self) -> Option<PathBuf> {
        if let Some(profile) = self.env.get_non_empty("USERPROFILE") {
            return Some(PathBuf::from(profile));
        }
        let mut home = OsString::new();
        for key in ["HOMEDRIVE", "HOMEPATH"] {
            if let Some(part) = self.env.get_os(key) {
                home.push(part);
            }
        }
        (!home.is_empty()).then(|| PathBuf::from(home))
    }
}
