//! `/org_mgr`: organizations the user owns.

use tracing::info;

use crate::client::OnlyConfigClient;
use crate::route::Route;
use crate::types::Organization;
use crate::views::{Loadable, Page, PageStatus, take_input};

#[derive(Debug, Default)]
pub struct OrgManagementPage {
    organizations: Loadable<Vec<Organization>>,
    selected: Option<usize>,
    pub new_org_input: String,
    pub owner_input: String,
    status: PageStatus,
}

impl OrgManagementPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn organizations(&self) -> &Loadable<Vec<Organization>> {
        &self.organizations
    }

    pub fn selected(&self) -> Option<&Organization> {
        let index = self.selected?;
        self.organizations.loaded()?.get(index)
    }

    /// Select the organization at `index`. Out-of-range indexes are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        let valid = self
            .organizations
            .loaded()
            .is_some_and(|orgs| index < orgs.len());
        if valid {
            self.selected = Some(index);
        }
        valid
    }

    /// Select by name.
    pub fn select_by_name(&mut self, org_name: &str) -> bool {
        let index = self
            .organizations
            .loaded()
            .and_then(|orgs| orgs.iter().position(|o| o.org_name == org_name));
        index.is_some_and(|i| self.select(i))
    }

    /// Drop the list and the selection, then fetch the organizations again.
    pub async fn load(&mut self, client: &OnlyConfigClient) {
        self.organizations = Loadable::Loading;
        self.selected = None;

        let result = client.organizations().await;
        if let Some(orgs) = self.status.settle(result, "Get organizations data error") {
            self.organizations = Loadable::Loaded(orgs);
        }
    }

    /// Create an organization from the input, which is cleared first.
    pub async fn create_organization(&mut self, client: &OnlyConfigClient) -> bool {
        let org = take_input(&mut self.new_org_input);
        let result = client.create_organization(&org).await;
        if self.status.settle(result, "put new organization error").is_none() {
            return false;
        }
        info!(org = %org, "organization created");
        self.load(client).await;
        true
    }

    /// Add the input user as owner of the selected organization.
    pub async fn add_owner(&mut self, client: &OnlyConfigClient) -> bool {
        let Some(org_name) = self.selected().map(|o| o.org_name.clone()) else {
            self.status.raise("select an organization first");
            return false;
        };
        let username = self.owner_input.trim().to_owned();

        let result = client.add_organization_owner(&org_name, &username).await;
        if self.status.settle(result, "put add user to org error").is_none() {
            return false;
        }
        info!(org = %org_name, username = %username, "owner added");
        self.load(client).await;
        true
    }
}

impl Page for OrgManagementPage {
    fn route(&self) -> Route {
        Route::OrgManagement
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
    use mockito::Server;
    use onlyconfig_storage::MemoryStorage;

    const ORGS: &str = r#"{"result":[
        {"org_id":"o1","org_name":"acme","owner_list":["alice"],"user_list":["alice","bob"]},
        {"org_id":"o2","org_name":"globex","owner_list":null,"user_list":null}
    ]}"#;

    fn client_for(url: &str) -> OnlyConfigClient {
        let session = SessionStore::new(MemoryStorage::new());
        session.set_logged_in("tk").unwrap();
        OnlyConfigClient::new(ApiEndpoint::new(url), session).unwrap()
    }

    #[tokio::test]
    async fn select_after_load() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/user/organizations")
            .with_status(200)
            .with_body(ORGS)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = OrgManagementPage::new();
        assert!(!page.select(0));
        page.load(&client).await;

        assert!(page.select(1));
        assert_eq!(page.selected().unwrap().org_name, "globex");
        assert!(!page.select(5));
        assert!(page.select_by_name("acme"));
        assert_eq!(page.selected().unwrap().owner_list, vec!["alice".to_owned()]);
    }

    #[tokio::test]
    async fn add_owner_reloads_and_clears_selection() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/user/organizations")
            .with_status(200)
            .with_body(ORGS)
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/organization/acme/owner/bob")
            .match_header("authorization", "Bearer tk")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = OrgManagementPage::new();
        page.load(&client).await;
        page.select(0);
        page.owner_input = "bob".to_owned();
        assert!(page.add_owner(&client).await);

        put.assert_async().await;
        assert!(page.selected().is_none());
        assert!(page.organizations().loaded().is_some());
    }

    #[tokio::test]
    async fn add_owner_without_selection_sends_nothing() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = OrgManagementPage::new();
        page.owner_input = "bob".to_owned();
        assert!(!page.add_owner(&client).await);
        put.assert_async().await;
        assert!(page.status().alert().is_some());
    }

    #[tokio::test]
    async fn create_failure_alerts_without_reload() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/user/organizations")
            .with_status(200)
            .with_body(ORGS)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("PUT", "/organization/initech")
            .with_status(409)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut page = OrgManagementPage::new();
        page.load(&client).await;
        page.new_org_input = "initech".to_owned();
        assert!(!page.create_organization(&client).await);

        list.assert_async().await;
        assert!(page.new_org_input.is_empty());
        assert_eq!(
            page.status().alert().map(|a| a.message().to_owned()),
            Some("put new organization error".to_owned())
        );
    }
}
