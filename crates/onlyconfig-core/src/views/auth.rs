//! Login, registration and password change pages.

use tracing::{info, warn};

use crate::client::OnlyConfigClient;
use crate::error::ConsoleError;
use crate::route::Route;
use crate::types::NewUser;
use crate::views::{Page, PageStatus, SubmitControl};

const PASSWORD_MISMATCH: &str = "password mismatch";

/// The only client-side check: a password and its confirmation must match.
fn confirm_password(password: &str, confirmation: &str) -> Result<(), ConsoleError> {
    if password == confirmation {
        Ok(())
    } else {
        Err(ConsoleError::Validation(PASSWORD_MISMATCH.to_owned()))
    }
}

/// `/login`
#[derive(Debug, Default)]
pub struct LoginPage {
    pub username: String,
    pub password: String,
    error_display: Option<String>,
    submit: SubmitControl,
    logged_in: bool,
    status: PageStatus,
}

impl LoginPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inline error shown under the form.
    pub fn error_display(&self) -> Option<&str> {
        self.error_display.as_deref()
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.submit
    }

    /// Submit the credentials. On success the session is stored and the page
    /// redirects to `/`.
    pub async fn submit(&mut self, client: &OnlyConfigClient) {
        self.submit.disable();
        self.error_display = None;

        match client.login(&self.username, &self.password).await {
            Ok(token) => match client.session().set_logged_in(&token) {
                Ok(()) => {
                    info!(username = %self.username, "logged in");
                    self.logged_in = true;
                }
                Err(e) => {
                    self.status.settle::<()>(Err(e.into()), "save session error");
                    self.submit.enable();
                }
            },
            Err(ConsoleError::Unauthorized) => {
                self.error_display = Some("Invalid username or password".to_owned());
                self.submit.enable();
            }
            Err(e) => {
                self.status.settle::<()>(Err(e), "login error");
                self.submit.enable();
            }
        }
    }
}

impl Page for LoginPage {
    fn route(&self) -> Route {
        Route::Login
    }

    fn status(&self) -> &PageStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut PageStatus {
        &mut self.status
    }

    fn navigation(&self) -> Option<Route> {
        self.logged_in.then_some(Route::Home)
    }
}

/// `/register`
#[derive(Debug, Default)]
pub struct RegisterPage {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
    pub display_name: String,
    error_display: Option<String>,
    submit: SubmitControl,
    registered: bool,
    status: PageStatus,
}

impl RegisterPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_display(&self) -> Option<&str> {
        self.error_display.as_deref()
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.submit
    }

    /// Register the user; redirects to `/login` on success. A confirmation
    /// mismatch is reported inline and nothing is sent.
    pub async fn submit(&mut self, client: &OnlyConfigClient) {
        self.error_display = None;
        self.submit.disable();

        if let Err(e) = confirm_password(&self.password, &self.confirm_password) {
            self.error_display = Some(e.to_string());
            self.submit.enable();
            return;
        }

        let user = NewUser {
            username: self.username.clone(),
            password: self.password.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        };
        match client.register(&user).await {
            Ok(()) => {
                info!(username = %user.username, "registered");
                self.registered = true;
            }
            Err(e) => {
                warn!(error = %e, "register failed");
                self.error_display = Some("register failed".to_owned());
                self.submit.enable();
            }
        }
    }
}

impl Page for RegisterPage {
    fn route(&self) -> Route {
        Route::Register
    }

    fn status(&self) -> &PageStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut PageStatus {
        &mut self.status
    }

    fn navigation(&self) -> Option<Route> {
        self.registered.then_some(Route::Login)
    }
}

/// `/change_password`
#[derive(Debug, Default)]
pub struct ChangePasswordPage {
    pub old: String,
    pub new: String,
    pub confirm: String,
    error_display: Option<String>,
    changed: bool,
    submit: SubmitControl,
    status: PageStatus,
}

impl ChangePasswordPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_display(&self) -> Option<&str> {
        self.error_display.as_deref()
    }

    /// Whether the last submission went through.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.submit
    }

    /// Change the password; the form is cleared on success. A confirmation
    /// mismatch is reported inline and nothing is sent.
    pub async fn submit(&mut self, client: &OnlyConfigClient) {
        self.error_display = None;
        self.changed = false;

        if let Err(e) = confirm_password(&self.new, &self.confirm) {
            self.error_display = Some(e.to_string());
            return;
        }

        self.submit.disable();
        match client.change_password(&self.old, &self.new).await {
            Ok(()) => {
                self.old.clear();
                self.new.clear();
                self.confirm.clear();
                self.changed = true;
            }
            Err(ConsoleError::Unauthorized) => {
                self.status.request_logout();
            }
            Err(e) => {
                warn!(error = %e, "change password failed");
                self.error_display = Some("change password failed".to_owned());
            }
        }
        self.submit.enable();
    }
}

impl Page for ChangePasswordPage {
    fn route(&self) -> Route {
        Route::ChangePassword
    }

    fn status(&self) -> &PageStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut PageStatus {
        &mut self.status
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::endpoint::ApiEndpoint;
    use crate::session::SessionStore;
    use mockito::{Matcher, Server};
    use onlyconfig_storage::MemoryStorage;
    use serde_json::json;

    fn client_for(url: &str) -> OnlyConfigClient {
        OnlyConfigClient::new(ApiEndpoint::new(url), SessionStore::new(MemoryStorage::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn login_success_stores_session() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/user/login")
            .with_status(200)
            .with_body(r#"{"token":"tk-9"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = LoginPage::new();
        page.username = "alice".to_owned();
        page.password = "pw".to_owned();
        page.submit(&client).await;

        assert!(client.session().is_logged_in());
        assert_eq!(client.session().token(), "tk-9");
        assert_eq!(page.navigation(), Some(Route::Home));
    }

    #[tokio::test]
    async fn login_bad_credentials_shows_inline_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/user/login")
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = LoginPage::new();
        page.submit(&client).await;

        assert_eq!(page.error_display(), Some("Invalid username or password"));
        assert!(page.submit_control().is_enabled());
        assert_eq!(page.navigation(), None);
        assert!(!client.session().is_logged_in());
    }

    #[tokio::test]
    async fn login_server_error_alerts() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/user/login")
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = LoginPage::new();
        page.submit(&client).await;

        assert!(page.status().alert().is_some());
        assert!(page.submit_control().is_enabled());
    }

    #[tokio::test]
    async fn register_mismatch_sends_nothing() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/user/new_user")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = RegisterPage::new();
        page.password = "a".to_owned();
        page.confirm_password = "b".to_owned();
        page.submit(&client).await;

        m.assert_async().await;
        assert_eq!(page.error_display(), Some("password mismatch"));
        assert!(page.submit_control().is_enabled());
    }

    #[tokio::test]
    async fn register_success_redirects_to_login() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/user/new_user")
            .match_body(Matcher::Json(json!({
                "username": "bob",
                "password": "pw",
                "email": "bob@example.com",
                "display_name": "Bob"
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = RegisterPage::new();
        page.username = "bob".to_owned();
        page.password = "pw".to_owned();
        page.confirm_password = "pw".to_owned();
        page.email = "bob@example.com".to_owned();
        page.display_name = "Bob".to_owned();
        page.submit(&client).await;

        m.assert_async().await;
        assert_eq!(page.navigation(), Some(Route::Login));
    }

    #[tokio::test]
    async fn change_password_mismatch_sends_nothing() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/user/change_password")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server.url());
        client.session().set_logged_in("tk").unwrap();
        let mut page = ChangePasswordPage::new();
        page.old = "old".to_owned();
        page.new = "new-1".to_owned();
        page.confirm = "new-2".to_owned();
        page.submit(&client).await;

        m.assert_async().await;
        assert_eq!(page.error_display(), Some("password mismatch"));
        assert!(!page.changed());
    }

    #[tokio::test]
    async fn change_password_success_clears_form() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/user/change_password")
            .match_header("authorization", "Bearer tk")
            .match_body(Matcher::Json(json!({ "old": "old", "new": "new" })))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server.url());
        client.session().set_logged_in("tk").unwrap();
        let mut page = ChangePasswordPage::new();
        page.old = "old".to_owned();
        page.new = "new".to_owned();
        page.confirm = "new".to_owned();
        page.submit(&client).await;

        m.assert_async().await;
        assert!(page.changed());
        assert!(page.old.is_empty() && page.new.is_empty() && page.confirm.is_empty());
    }

    #[tokio::test]
    async fn change_password_unauthorized_requests_logout() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/user/change_password")
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server.url());
        client.session().set_logged_in("expired").unwrap();
        let mut page = ChangePasswordPage::new();
        page.submit(&client).await;

        assert_eq!(page.navigation(), Some(Route::Logout));
    }
}
