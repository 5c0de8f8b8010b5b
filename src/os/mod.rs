//! Operating system facilities used by the resolvers.
//!
//! Provides the [`Env`](env::Env) snapshot, the current [`UserIdentity`](user::UserIdentity),
//! and the [`CommandRunner`](command_ext::CommandRunner) capability for subprocess fallbacks.

pub mod command_ext;
pub mod env;
pub mod user;
