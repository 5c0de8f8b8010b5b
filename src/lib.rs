//! Basedir - home directory and XDG Base Directory resolution.
//!
//! Every directory is taken from its environmental variable when that is set and non-empty,
//! and computed from the home directory and the operating system otherwise.
//!
//! Use the free functions for the running process, or [`BaseDirs`](xdg::BaseDirs) to fix the
//! environment, home directory, user id and [`DirectoryMode`] explicitly:
//!
//! ```rust,no_run
//! # use basedir::xdg::{BaseDirs, Platform};
//! let config = basedir::config_home().join("my-app");
//!
//! let dirs = BaseDirs::builder()
//!     .home("/home/alice")
//!     .uid(1000)
//!     .platform(Platform::Unix)
//!     .build();
//! assert_eq!(dirs.runtime_dir(), std::path::Path::new("/run/user/1000"));
//! ```

pub mod global;
pub mod home;
pub mod os;
pub mod xdg;

pub use global::{
    cache_home, config_dirs, config_dirs_list, config_home, data_dirs, data_dirs_list, data_home,
    directory_mode, home_dir, reset_defaults, runtime_dir, set_directory_mode, state_home,
};
pub use xdg::DirectoryMode;
