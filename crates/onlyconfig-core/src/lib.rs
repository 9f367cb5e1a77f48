//! Core of the `OnlyConfig` console.
//!
//! The console is a thin view over the `OnlyConfig` REST API. This crate holds
//! the pieces with an actual contract:
//!
//! - [`SessionStore`]: the persisted `{ is_login, token }` record
//! - [`ApiEndpoint`] / [`OnlyConfigClient`]: URL resolution and the JSON calls
//! - [`Route`] / [`Console`]: route table and the centralized auth guard
//! - [`views`]: per-page state machines (load, select, submit)
//!
//! Front ends (the `onlyconfig` binary) only render what the views hold.

mod client;
mod config;
mod console;
mod endpoint;
mod error;
mod route;
mod session;
mod types;
pub mod views;

pub use client::OnlyConfigClient;
pub use config::ConsoleConfig;
pub use console::{Console, Entered};
pub use endpoint::{ApiEndpoint, BuildProfile, DEV_ORIGIN, PAGE_ORIGIN};
pub use error::ConsoleError;
pub use route::Route;
pub use session::{SESSION_KEY, SessionStore};
pub use types::{
    Application, ConfigureDetail, ConfigureKey, ConfigureRef, ContentType, EnvAndDc, EnvDcKind,
    EnvDcRegistry, Id, NamespaceConfigures, NamespaceType, NewUser, Organization,
};

pub use onlyconfig_storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
