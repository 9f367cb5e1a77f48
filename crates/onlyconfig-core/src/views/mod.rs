//! Page view models.
//!
//! Each page follows the same flow: `Loading → Loaded`, with any state able
//! to fall into "logout requested" when the backend answers 401. Failed
//! requests leave data untouched and raise an [`Alert`]; submit controls are
//! disabled while a mutation is in flight and re-enabled when it fails.

mod auth;
mod configure;
mod env_dc;
mod org;
mod usage;

pub use auth::{ChangePasswordPage, LoginPage, RegisterPage};
pub use configure::{
    AddConfigureDialog, AddNamespaceDialog, AttachEnvDcDialog, ConfigureBrowser, ConfigureFetch,
    Dialog, EditConfigureDialog, EnvDcSelection, NewApplicationDialog,
};
pub use env_dc::EnvAndDcPage;
pub use org::OrgManagementPage;
pub use usage::UsageSnippet;

use std::fmt;

use tracing::warn;

use crate::error::ConsoleError;
use crate::route::Route;

/// Data that is either still being fetched or ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Loadable<T> {
    #[default]
    Loading,
    Loaded(T),
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loading => None,
            Self::Loaded(value) => Some(value),
        }
    }
}

/// A blocking, user-facing error notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert(String);

impl Alert {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enabled state of a form's submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmitControl {
    disabled: bool,
}

impl SubmitControl {
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// Logout flag and pending alert shared by every page.
#[derive(Debug, Clone, Default)]
pub struct PageStatus {
    logout_requested: bool,
    alert: Option<Alert>,
}

impl PageStatus {
    /// Resolve a request result: `401` requests logout, any other error
    /// raises `alert`. Returns the value on success.
    pub fn settle<T>(&mut self, result: Result<T, ConsoleError>, alert: &str) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(ConsoleError::Unauthorized) => {
                self.request_logout();
                None
            }
            Err(e) => {
                warn!(error = %e, alert, "request failed");
                self.alert = Some(Alert::new(alert));
                None
            }
        }
    }

    pub fn request_logout(&mut self) {
        self.logout_requested = true;
    }

    pub fn raise(&mut self, alert: impl Into<String>) {
        self.alert = Some(Alert::new(alert));
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Dismiss the pending alert.
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    pub fn logout_requested(&self) -> bool {
        self.logout_requested
    }
}

/// Common surface of the console pages.
pub trait Page {
    /// Route the page is mounted at.
    fn route(&self) -> Route;

    fn status(&self) -> &PageStatus;

    fn status_mut(&mut self) -> &mut PageStatus;

    /// Redirect the page asks for. Defaults to `/logout` once a request came
    /// back unauthorized.
    fn navigation(&self) -> Option<Route> {
        self.status().logout_requested().then_some(Route::Logout)
    }
}

/// Identifies the selection a dependent fetch was started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Counter bumped on every selection change. A fetch result is applied only
/// if its ticket is still current.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionEpoch(u64);

impl SelectionEpoch {
    /// Invalidate every outstanding ticket.
    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn ticket(self) -> FetchTicket {
        FetchTicket(self.0)
    }

    pub fn is_current(self, ticket: FetchTicket) -> bool {
        ticket.0 == self.0
    }
}

fn take_input(input: &mut String) -> String {
    std::mem::take(input).trim().to_owned()
}
