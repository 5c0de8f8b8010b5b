use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

/// Snapshot of the process environment used for directory lookups.
///
/// Lookups fall back to a case-insensitive match on Windows, where environmental variables are
/// case-insensitive (`UserProfile` and `USERPROFILE` name the same variable).
#[derive(Debug, Clone)]
pub struct Env {
    vars: HashMap<OsString, OsString>,

    normalised_vars: HashMap<OsString, OsString>,
}

impl Env {
    /// Capture the current process environment.
    pub fn new() -> Self {
        Self::new_from(std::env::vars_os().collect())
    }

    /// Create an [`Env`] holding exactly `vars`.
    pub fn new_from(vars: HashMap<OsString, OsString>) -> Self {
        Self {
            normalised_vars: Env::normalize_map(&vars),
            vars,
        }
    }

    fn normalize_key(key: impl AsRef<OsStr>) -> OsString {
        key.as_ref().to_ascii_uppercase()
    }

    fn normalize_map(vars: &HashMap<OsString, OsString>) -> HashMap<OsString, OsString> {
        vars.iter()
            .map(|(key, value)| (Env::normalize_key(key), value.clone()))
            .collect()
    }

    /// Get the raw value of `key`.
    ///
    /// # Returns
    /// `None` if `key` is not set. A variable set to the empty string is returned as
    /// `Some("")`; use [`Env::get_non_empty`] for XDG semantics.
    ///
    /// # Examples
    /// ```rust
    /// use basedir::os::env::Env;
    /// use std::ffi::OsStr;
    ///
    /// let env: Env = [("HOME", "/home/alice")].into_iter().collect();
    /// assert_eq!(env.get_os("HOME"), Some(OsStr::new("/home/alice")));
    /// assert_eq!(env.get_os("XDG_CONFIG_HOME"), None);
    /// ```
    pub fn get_os(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        match self.vars.get(key) {
            Some(value) => Some(value),
            None if cfg!(target_os = "windows") => self
                .normalised_vars
                .get(&Env::normalize_key(key))
                .map(|value| value.as_os_str()),
            None => None,
        }
    }

    /// Get the value of `key`, treating a variable set to the empty string as unset.
    ///
    /// Every XDG variable is read through this method.
    ///
    /// # Examples
    /// ```rust
    /// use basedir::os::env::Env;
    ///
    /// let env: Env = [("XDG_CACHE_HOME", "")].into_iter().collect();
    /// assert_eq!(env.get_non_empty("XDG_CACHE_HOME"), None);
    /// ```
    pub fn get_non_empty(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.get_os(key).filter(|value| !value.is_empty())
    }

}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new_from(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
