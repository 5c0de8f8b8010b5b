//! Identity of the user running the current process.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Home directory and user id as reported by the operating system.
///
/// Fields are public, so tests (or callers running on behalf of another user) can build one
/// directly instead of calling [`UserIdentity::current`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    /// Home directory from the user database, `None` if the entry has none.
    pub home: Option<PathBuf>,
    /// Numeric user id. Always `Some` on Unix, `None` on Windows.
    pub uid: Option<u32>,
}

/// Errors encountered when asking the operating system for the current user.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The user database lookup itself failed.
    #[error("user database lookup failed: {0}")]
    Lookup(#[source] io::Error),

    /// No user database entry exists for uid `UnknownUser.0`.
    #[error("there is no user with uid {0}")]
    UnknownUser(u32),

    /// The current target has no notion of user identity.
    #[error("user identity is not supported on this platform")]
    Unsupported,
}

impl UserIdentity {
    /// Query the operating system for the user running this process.
    ///
    /// On Unix this is [`getuid`](libc::getuid) followed by
    /// [`getpwuid_r`](libc::getpwuid_r). On Windows only the home directory is known.
    pub fn current() -> Result<Self, IdentityError> {
        imp::current()
    }
}

/// Numeric id of the user running this process, without consulting the user database.
///
/// Unlike [`UserIdentity::current`] this can't fail; it returns `None` on platforms without
/// numeric user ids.
pub fn current_uid() -> Option<u32> {
    #[cfg(unix)]
    {
        // SAFETY: `getuid` is always successful and has no preconditions.
        Some(unsafe { libc::getuid() })
    }
    #[cfg(not(unix))]
    {
        None
    }
}

#[cfg(unix)]
mod imp {
    use std::ffi::{CStr, OsStr};
    use std::io;
    use std::os::unix::ffi::OsStrExt;
    use std::path::PathBuf;
    use std::ptr;

    use super::{IdentityError, UserIdentity};

    const FALLBACK_BUFFER_LEN: usize = 1024;
    const MAX_BUFFER_LEN: usize = 1 << 20;

    pub(super) fn current() -> Result<UserIdentity, IdentityError> {
        // SAFETY: `getuid` is always successful and has no preconditions.
        let uid = unsafe { libc::getuid() };
        Ok(UserIdentity {
            home: passwd_home(uid)?,
            uid: Some(uid),
        })
    }

    fn initial_buffer_len() -> usize {
        // SAFETY: `sysconf` only reads a configuration value.
        let suggested = unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) };
        usize::try_from(suggested)
            .ok()
            .filter(|len| *len > 0)
            .unwrap_or(FALLBACK_BUFFER_LEN)
    }

    fn passwd_home(uid: libc::uid_t) -> Result<Option<PathBuf>, IdentityError> {
        let mut buffer = vec![0u8; initial_buffer_len()];
        loop {
            // SAFETY: `passwd` is a plain C struct, all-zero is a valid (if meaningless) value.
            let mut entry: libc::passwd = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::passwd = ptr::null_mut();
            // SAFETY: every pointer is valid for the duration of the call and `buffer.len()` is
            // the true length of `buffer`. On success `entry` points into `buffer`.
            let code = unsafe {
                libc::getpwuid_r(
                    uid,
                    &mut entry,
                    buffer.as_mut_ptr().cast(),
                    buffer.len(),
                    &mut result,
                )
            };
            if code == libc::ERANGE && buffer.len() < MAX_BUFFER_LEN {
                buffer.resize(buffer.len() * 2, 0);
                continue;
            }
            if code != 0 {
                return Err(IdentityError::Lookup(io::Error::from_raw_os_error(code)));
            }
            if result.is_null() || entry.pw_dir.is_null() {
                return Err(IdentityError::UnknownUser(uid));
            }
            // SAFETY: `pw_dir` is a NUL-terminated string stored in `buffer`, which is still alive.
            let dir = unsafe { CStr::from_ptr(entry.pw_dir) }.to_bytes();
            return Ok((!dir.is_empty()).then(|| PathBuf::from(OsStr::from_bytes(dir))));
        }
    }
}

#[cfg(windows)]
mod imp {
    use super::{IdentityError, UserIdentity};

    pub(super) fn current() -> Result<UserIdentity, IdentityError> {
        #[allow(deprecated)]
        let home = std::env::home_dir().filter(|home| !home.as_os_str().is_empty());
        Ok(UserIdentity { home, uid: None })
    }
}

#[cfg(not(any(unix, windows)))]
mod imp {
    use super::{IdentityError, UserIdentity};

    pub(super) fn current() -> Result<UserIdentity, IdentityError> {
        Err(IdentityError::Unsupported)
    }
}
