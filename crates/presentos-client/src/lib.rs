//! The `presentos` command-line client.
//!
//! Wires the identity provider and scheduling backend together behind a
//! session controller: sign-in installs the token slot, a one-shot resolver
//! settles the calendar capability grant (consuming the consent redirect's
//! completion marker when one is pending), and the goal list loads with the
//! same captured token.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod grant;
pub mod navigator;
pub mod secret;
pub mod session;
pub mod view;

#[cfg(test)]
mod fakes;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use grant::{GrantResolver, ResolveOutcome};
pub use session::SessionController;
