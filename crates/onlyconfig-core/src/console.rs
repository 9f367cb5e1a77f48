//! Router with the centralized auth guard.
//!
//! Every route goes through [`Console::enter`]. Protected routes without a
//! session become a redirect to `/login` before any page is built, so no
//! request is issued. `/logout` clears the session and redirects to `/`.
//! Pages that saw a 401 ask for `/logout` through [`Page::navigation`].

use tracing::{debug, info};

use crate::client::OnlyConfigClient;
use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::route::Route;
use crate::session::SessionStore;
use crate::views::Page;

/// Upper bound on chained redirects; the route table never needs more than
/// three (`/logout` → `/` → `/login`).
const MAX_REDIRECTS: usize = 8;

/// Where navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entered {
    /// The route that renders.
    pub route: Route,
    /// Redirects taken on the way, in order.
    pub redirects: Vec<Route>,
}

impl Entered {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// The console: one session, one client, one guard for every route.
#[derive(Debug, Clone)]
pub struct Console {
    client: OnlyConfigClient,
}

impl Console {
    pub fn new(client: OnlyConfigClient) -> Self {
        Self { client }
    }

    /// Build a console from configuration: file-backed session plus a client
    /// for the configured origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Session`] if the session directory cannot be
    /// opened, or [`ConsoleError::RequestFailed`] if the HTTP client cannot
    /// be built.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let session = SessionStore::new(config.storage()?);
        let client = OnlyConfigClient::new(config.endpoint(), session)?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &OnlyConfigClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Guard check for one route: `Some(Route::Login)` when the route is
    /// protected and there is no session.
    pub fn admit(&self, route: &Route) -> Option<Route> {
        (route.requires_auth() && !self.session().is_logged_in()).then_some(Route::Login)
    }

    /// Navigate to `route`, following guard and logout redirects.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Session`] if `/logout` cannot remove the
    /// session record.
    pub fn enter(&self, route: Route) -> Result<Entered, ConsoleError> {
        let mut current = route;
        let mut redirects = Vec::new();

        for _ in 0..MAX_REDIRECTS {
            let next = match current {
                Route::Logout => {
                    self.session().set_logged_out()?;
                    info!("logged out");
                    Some(Route::Home)
                }
                ref other => self.admit(other),
            };
            match next {
                Some(next) => {
                    debug!(from = %current, to = %next, "redirect");
                    redirects.push(next.clone());
                    current = next;
                }
                None => break,
            }
        }

        Ok(Entered {
            route: current,
            redirects,
        })
    }

    /// Follow the redirect a page asked for, if any.
    ///
    /// # Errors
    ///
    /// See [`enter`](Self::enter).
    pub fn follow(&self, page: &impl Page) -> Result<Option<Entered>, ConsoleError> {
        let Some(next) = page.navigation() else {
            return Ok(None);
        };
        debug!(page = %page.route(), to = %next, "page navigation");
        self.enter(next).map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::endpoint::ApiEndpoint;
    use crate::views::EnvAndDcPage;
    use mockito::Server;
    use onlyconfig_storage::MemoryStorage;

    fn console_for(url: &str) -> Console {
        let session = SessionStore::new(MemoryStorage::new());
        Console::new(OnlyConfigClient::new(ApiEndpoint::new(url), session).unwrap())
    }

    #[test]
    fn protected_route_without_session_redirects_to_login() {
        let console = console_for("http://127.0.0.1:9");
        for route in [Route::Home, Route::EnvAndDc, Route::OrgManagement, Route::ChangePassword] {
            let entered = console.enter(route).unwrap();
            assert_eq!(entered.route, Route::Login);
            assert_eq!(entered.redirects, vec![Route::Login]);
        }
    }

    #[test]
    fn public_routes_render_without_session() {
        let console = console_for("http://127.0.0.1:9");
        for route in [Route::Login, Route::Register, Route::NotFound("/nope".to_owned())] {
            let entered = console.enter(route.clone()).unwrap();
            assert_eq!(entered.route, route);
            assert!(!entered.was_redirected());
        }
    }

    #[test]
    fn logged_in_reaches_protected_route() {
        let console = console_for("http://127.0.0.1:9");
        console.session().set_logged_in("tk").unwrap();
        let entered = console.enter(Route::EnvAndDc).unwrap();
        assert_eq!(entered.route, Route::EnvAndDc);
    }

    #[test]
    fn logout_clears_session_and_lands_on_login() {
        let console = console_for("http://127.0.0.1:9");
        console.session().set_logged_in("tk").unwrap();
        let entered = console.enter(Route::Logout).unwrap();
        assert!(!console.session().is_logged_in());
        assert_eq!(entered.redirects, vec![Route::Home, Route::Login]);
        assert_eq!(entered.route, Route::Login);
    }

    #[tokio::test]
    async fn guarded_page_issues_no_request() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let console = console_for(&server.url());
        let entered = console.enter(Route::EnvAndDc).unwrap();
        assert_eq!(entered.route, Route::Login);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_fetch_logs_out() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/configures/env_dc_list")
            .with_status(401)
            .create_async()
            .await;

        let console = console_for(&server.url());
        console.session().set_logged_in("expired").unwrap();
        assert_eq!(console.enter(Route::EnvAndDc).unwrap().route, Route::EnvAndDc);

        let mut page = EnvAndDcPage::new();
        assert_eq!(page.route(), Route::EnvAndDc);
        assert_eq!(console.follow(&page).unwrap(), None);
        page.load(console.client()).await;
        assert_eq!(page.navigation(), Some(Route::Logout));

        let entered = console.follow(&page).unwrap().unwrap();
        assert_eq!(entered.redirects.first(), Some(&Route::Home));
        assert!(!console.session().is_logged_in());
        assert_eq!(entered.route, Route::Login);
    }
}
