//! Console route table.

use std::fmt;

/// A client-side route of the console.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`: configuration browser.
    Home,
    /// `/login`
    Login,
    /// `/logout`: clears the session, then redirects to `/`.
    Logout,
    /// `/register`
    Register,
    /// `/change_password`
    ChangePassword,
    /// `/env_and_dc`
    EnvAndDc,
    /// `/org_mgr`
    OrgManagement,
    /// Catch-all for any other path.
    NotFound(String),
}

impl Route {
    /// Resolve a path. Query strings, fragments and a trailing `/` are ignored.
    pub fn parse(path: &str) -> Self {
        let bare = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = bare.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        match normalized {
            "/" => Self::Home,
            "/login" => Self::Login,
            "/logout" => Self::Logout,
            "/register" => Self::Register,
            "/change_password" => Self::ChangePassword,
            "/env_and_dc" => Self::EnvAndDc,
            "/org_mgr" => Self::OrgManagement,
            _ => Self::NotFound(path.to_owned()),
        }
    }

    /// Canonical path of the route.
    pub fn path(&self) -> &str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Logout => "/logout",
            Self::Register => "/register",
            Self::ChangePassword => "/change_password",
            Self::EnvAndDc => "/env_and_dc",
            Self::OrgManagement => "/org_mgr",
            Self::NotFound(path) => path,
        }
    }

    /// Whether the route renders protected content.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::ChangePassword | Self::EnvAndDc | Self::OrgManagement
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        for route in [
            Route::Home,
            Route::Login,
            Route::Logout,
            Route::Register,
            Route::ChangePassword,
            Route::EnvAndDc,
            Route::OrgManagement,
        ] {
            assert_eq!(Route::parse(route.path()), route);
        }
    }

    #[test]
    fn ignores_trailing_slash_and_query() {
        assert_eq!(Route::parse("/env_and_dc/"), Route::EnvAndDc);
        assert_eq!(Route::parse("/login?next=/org_mgr"), Route::Login);
        assert_eq!(Route::parse(""), Route::Home);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(
            Route::parse("/admin"),
            Route::NotFound("/admin".to_owned())
        );
        assert!(!Route::parse("/admin").requires_auth());
    }

    #[test]
    fn protected_routes() {
        assert!(Route::Home.requires_auth());
        assert!(Route::OrgManagement.requires_auth());
        assert!(!Route::Login.requires_auth());
        assert!(!Route::Logout.requires_auth());
        assert!(!Route::Register.requires_auth());
    }
}
