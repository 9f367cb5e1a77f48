//! `/`: the configuration browser.
//!
//! Three dependent levels: applications → (env, dc) of the selected
//! application → configuration keys grouped by namespace. Changing a parent
//! selection clears everything below it and advances the selection epoch,
//! so a configuration list fetched for an earlier selection is discarded
//! when it resolves late.

use tracing::{debug, info};

use crate::client::OnlyConfigClient;
use crate::error::ConsoleError;
use crate::route::Route;
use crate::types::{
    Application, ConfigureDetail, ConfigureKey, ContentType, EnvDcRegistry, Id,
    NamespaceConfigures, NamespaceType, Organization,
};
use crate::views::{
    FetchTicket, Loadable, Page, PageStatus, SelectionEpoch, UsageSnippet, take_input,
};

/// The (environment, datacenter) pair whose configuration is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvDcSelection {
    pub env: String,
    pub dc: String,
}

/// A configuration-list fetch bound to the selection it was started under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureFetch {
    ticket: FetchTicket,
    pub app_id: Id,
    pub env: String,
    pub dc: String,
}

impl ConfigureFetch {
    /// Issue the request for this fetch.
    ///
    /// # Errors
    ///
    /// See [`OnlyConfigClient::configure_list`].
    pub async fn run(
        &self,
        client: &OnlyConfigClient,
    ) -> Result<Vec<NamespaceConfigures>, ConsoleError> {
        client.configure_list(&self.app_id, &self.env, &self.dc).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewApplicationDialog {
    pub organizations: Loadable<Vec<Organization>>,
    pub org_id: Option<Id>,
    pub app_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct AttachEnvDcDialog {
    pub registry: Loadable<EnvDcRegistry>,
    pub env: String,
    pub dc: String,
}

#[derive(Debug, Clone, Default)]
pub struct AddNamespaceDialog {
    pub name: String,
    pub kind: NamespaceType,
}

#[derive(Debug, Clone, Default)]
pub struct AddConfigureDialog {
    pub namespaces: Loadable<Vec<String>>,
    pub namespace: String,
    pub key: String,
    pub content_type: ContentType,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct EditConfigureDialog {
    pub configure_id: Id,
    pub previous: Loadable<ConfigureDetail>,
    pub content_type: ContentType,
    pub content: String,
}

/// The dialog currently open over the browser.
#[derive(Debug, Clone)]
pub enum Dialog {
    NewApplication(NewApplicationDialog),
    AttachEnvDc(AttachEnvDcDialog),
    AddNamespace(AddNamespaceDialog),
    AddConfigure(AddConfigureDialog),
    EditConfigure(EditConfigureDialog),
    Usage(UsageSnippet),
}

#[derive(Debug, Default)]
pub struct ConfigureBrowser {
    applications: Loadable<Vec<Application>>,
    selected_app: Option<Id>,
    selected_env_dc: Option<EnvDcSelection>,
    configures: Loadable<Vec<NamespaceConfigures>>,
    epoch: SelectionEpoch,
    dialog: Option<Dialog>,
    status: PageStatus,
}

impl ConfigureBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Applications ---

    pub fn applications(&self) -> &Loadable<Vec<Application>> {
        &self.applications
    }

    pub async fn load_applications(&mut self, client: &OnlyConfigClient) {
        let result = client.applications().await;
        if let Some(apps) = self.status.settle(result, "Get application data error") {
            self.applications = Loadable::Loaded(apps);
        }
    }

    /// The selected application as of the latest application list.
    pub fn selected_app(&self) -> Option<&Application> {
        let id = self.selected_app.as_ref()?;
        self.applications
            .loaded()?
            .iter()
            .find(|app| &app.app_id == id)
    }

    /// Select an application. Clears the (env, dc) selection, the displayed
    /// configuration list and any open dialog.
    pub fn select_app(&mut self, app_id: &Id) -> bool {
        let known = self
            .applications
            .loaded()
            .is_some_and(|apps| apps.iter().any(|app| &app.app_id == app_id));
        if !known {
            return false;
        }
        self.clear_dependent();
        self.selected_app = Some(app_id.clone());
        true
    }

    /// Select an application by name.
    pub fn select_app_by_name(&mut self, app_name: &str) -> bool {
        let id = self.applications.loaded().and_then(|apps| {
            apps.iter()
                .find(|app| app.app_name == app_name)
                .map(|app| app.app_id.clone())
        });
        id.is_some_and(|id| self.select_app(&id))
    }

    // --- Environment / datacenter ---

    pub fn selected_env_dc(&self) -> Option<&EnvDcSelection> {
        self.selected_env_dc.as_ref()
    }

    /// Select an (env, dc) attached to the selected application and start the
    /// dependent fetch for it.
    pub fn select_env_dc(&mut self, env: &str, dc: &str) -> Option<ConfigureFetch> {
        if !self.selected_app()?.has_env_dc(env, dc) {
            return None;
        }
        self.epoch.advance();
        self.dialog = None;
        self.selected_env_dc = Some(EnvDcSelection {
            env: env.to_owned(),
            dc: dc.to_owned(),
        });
        self.begin_configure_fetch()
    }

    // --- Configuration list ---

    pub fn configures(&self) -> &Loadable<Vec<NamespaceConfigures>> {
        &self.configures
    }

    /// Clear the displayed list and start a fetch for the current selection.
    pub fn begin_configure_fetch(&mut self) -> Option<ConfigureFetch> {
        let app_id = self.selected_app.clone()?;
        let selection = self.selected_env_dc.clone()?;
        self.configures = Loadable::Loading;
        Some(ConfigureFetch {
            ticket: self.epoch.ticket(),
            app_id,
            env: selection.env,
            dc: selection.dc,
        })
    }

    /// Apply a fetch result. Results for a superseded selection are dropped,
    /// except that a 401 still requests logout; returns whether the result
    /// was applied.
    pub fn apply_configure_list(
        &mut self,
        fetch: &ConfigureFetch,
        result: Result<Vec<NamespaceConfigures>, ConsoleError>,
    ) -> bool {
        if !self.epoch.is_current(fetch.ticket) {
            if matches!(result, Err(ConsoleError::Unauthorized)) {
                self.status.request_logout();
            }
            debug!(app_id = %fetch.app_id, env = %fetch.env, dc = %fetch.dc, "discarding stale configure list");
            return false;
        }
        match self.status.settle(result, "Get app configure list data error") {
            Some(list) => {
                self.configures = Loadable::Loaded(list);
                true
            }
            None => false,
        }
    }

    /// Fetch and apply the configuration list for the current selection.
    pub async fn load_configure_list(&mut self, client: &OnlyConfigClient) {
        if let Some(fetch) = self.begin_configure_fetch() {
            let result = fetch.run(client).await;
            self.apply_configure_list(&fetch, result);
        }
    }

    /// Namespace and key of a listed configuration entry.
    pub fn find_configure(&self, configure_id: &Id) -> Option<(&str, &str)> {
        self.configures.loaded()?.iter().find_map(|ns| {
            ns.configure_list
                .iter()
                .find(|c| &c.configure_id == configure_id)
                .map(|c| (ns.namespace.as_str(), c.key.as_str()))
        })
    }

    // --- Dialogs ---

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialog.as_mut()
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Open "New application" and load the organizations to pick from.
    pub async fn open_new_application(&mut self, client: &OnlyConfigClient) {
        self.dialog = Some(Dialog::NewApplication(NewApplicationDialog::default()));

        let result = client.organizations().await;
        let Some(orgs) = self.status.settle(result, "Get organizations data error") else {
            return;
        };
        if let Some(Dialog::NewApplication(d)) = &mut self.dialog {
            d.org_id = orgs.first().map(|o| o.org_id.clone());
            d.organizations = Loadable::Loaded(orgs);
        }
    }

    /// Create the application; on success the application list is reloaded
    /// and the dialog closes.
    pub async fn submit_new_application(&mut self, client: &OnlyConfigClient) -> bool {
        let Some(Dialog::NewApplication(d)) = &mut self.dialog else {
            return false;
        };
        let Some(org_id) = d.org_id.clone() else {
            self.status.raise("select an organization first");
            return false;
        };
        let app_name = take_input(&mut d.app_name);

        let result = client.create_application(&org_id, &app_name).await;
        if self.status.settle(result, "put new application error").is_none() {
            return false;
        }
        info!(org_id = %org_id, app = %app_name, "application created");
        self.load_applications(client).await;
        self.dialog = None;
        true
    }

    /// Open "Add datacenter" for the selected application and load the
    /// registry to pick from.
    pub async fn open_attach_env_dc(&mut self, client: &OnlyConfigClient) -> bool {
        if self.selected_app.is_none() {
            self.status.raise("select an application first");
            return false;
        }
        self.dialog = Some(Dialog::AttachEnvDc(AttachEnvDcDialog::default()));

        let result = client.env_dc_list().await;
        let Some(registry) =
            self.status
                .settle(result, "Get environments and datacenters data error")
        else {
            return true;
        };
        if let Some(Dialog::AttachEnvDc(d)) = &mut self.dialog {
            d.env = registry.env.first().cloned().unwrap_or_default();
            d.dc = registry.dc.first().cloned().unwrap_or_default();
            d.registry = Loadable::Loaded(registry);
        }
        true
    }

    /// Attach the chosen (env, dc) to the selected application.
    pub async fn submit_attach_env_dc(&mut self, client: &OnlyConfigClient) -> bool {
        let Some(app_id) = self.selected_app.clone() else {
            return false;
        };
        let Some(Dialog::AttachEnvDc(d)) = &self.dialog else {
            return false;
        };
        if d.registry.is_loading() || d.env.is_empty() || d.dc.is_empty() {
            self.status.raise("select an environment and a datacenter first");
            return false;
        }
        let (env, dc) = (d.env.clone(), d.dc.clone());

        let result = client.attach_env_dc(&app_id, &env, &dc).await;
        if self.status.settle(result, "put datacenter for app error").is_none() {
            return false;
        }
        info!(app_id = %app_id, env = %env, dc = %dc, "env/dc attached");
        self.load_applications(client).await;
        self.dialog = None;
        true
    }

    /// Open "Add namespace" for the selected application.
    pub fn open_add_namespace(&mut self) -> bool {
        if self.selected_app.is_none() {
            self.status.raise("select an application first");
            return false;
        }
        self.dialog = Some(Dialog::AddNamespace(AddNamespaceDialog::default()));
        true
    }

    /// Create the namespace; the name input is cleared before sending.
    pub async fn submit_add_namespace(&mut self, client: &OnlyConfigClient) -> bool {
        let Some(app_id) = self.selected_app.clone() else {
            return false;
        };
        let Some(Dialog::AddNamespace(d)) = &mut self.dialog else {
            return false;
        };
        let name = take_input(&mut d.name);
        let kind = d.kind;

        let result = client.create_namespace(&app_id, &name, kind).await;
        if self.status.settle(result, "put new namespace error").is_none() {
            return false;
        }
        info!(app_id = %app_id, namespace = %name, kind = kind.as_str(), "namespace created");
        self.dialog = None;
        true
    }

    /// Open "Add configuration" for the current selection and load the
    /// application's namespaces.
    pub async fn open_add_configure(&mut self, client: &OnlyConfigClient) -> bool {
        let (Some(app_id), Some(_)) = (self.selected_app.clone(), &self.selected_env_dc) else {
            self.status
                .raise("select application, environment and datacenter first");
            return false;
        };
        self.dialog = Some(Dialog::AddConfigure(AddConfigureDialog::default()));

        let result = client.namespaces(&app_id).await;
        let Some(namespaces) = self.status.settle(result, "Get app namespaces data error") else {
            return true;
        };
        if let Some(Dialog::AddConfigure(d)) = &mut self.dialog {
            d.namespace = namespaces.first().cloned().unwrap_or_default();
            d.namespaces = Loadable::Loaded(namespaces);
        }
        true
    }

    /// Create the configuration entry; on success the list is reloaded and
    /// the dialog closes.
    pub async fn submit_add_configure(&mut self, client: &OnlyConfigClient) -> bool {
        let (Some(app_id), Some(selection)) =
            (self.selected_app.clone(), self.selected_env_dc.clone())
        else {
            return false;
        };
        let Some(Dialog::AddConfigure(d)) = &self.dialog else {
            return false;
        };
        let key = ConfigureKey {
            app_id,
            env: selection.env,
            dc: selection.dc,
            namespace: d.namespace.trim().to_owned(),
            key: d.key.trim().to_owned(),
        };
        let (content_type, content) = (d.content_type, d.content.clone());

        let result = client.create_configure(&key, content_type, &content).await;
        if self.status.settle(result, "put new configuration error").is_none() {
            return false;
        }
        info!(namespace = %key.namespace, key = %key.key, "configuration created");
        self.dialog = None;
        self.load_configure_list(client).await;
        true
    }

    /// Open "Edit configuration" and load the stored content.
    pub async fn open_edit_configure(&mut self, client: &OnlyConfigClient, configure_id: &Id) {
        self.dialog = Some(Dialog::EditConfigure(EditConfigureDialog {
            configure_id: configure_id.clone(),
            ..EditConfigureDialog::default()
        }));

        let result = client.configure(configure_id).await;
        let Some(detail) = self.status.settle(result, "Get previous configure data error") else {
            return;
        };
        if let Some(Dialog::EditConfigure(d)) = &mut self.dialog {
            if &d.configure_id == configure_id {
                d.content_type = detail.cfg_ct.parse().unwrap_or_default();
                d.content.clone_from(&detail.cfg_content);
                d.previous = Loadable::Loaded(detail);
            }
        }
    }

    /// Save the edited content, keyed by `configure_id`.
    pub async fn submit_edit_configure(&mut self, client: &OnlyConfigClient) -> bool {
        let Some(Dialog::EditConfigure(d)) = &self.dialog else {
            return false;
        };
        let (configure_id, content_type, content) =
            (d.configure_id.clone(), d.content_type, d.content.clone());

        let result = client
            .update_configure(&configure_id, content_type, &content)
            .await;
        if self.status.settle(result, "put edit configuration error").is_none() {
            return false;
        }
        info!(configure_id = %configure_id, "configuration updated");
        self.dialog = None;
        true
    }

    /// Open the usage snippet for a listed entry.
    pub fn open_usage(&mut self, configure_id: &Id) -> bool {
        let snippet = {
            let (Some(app), Some(selection)) = (self.selected_app(), self.selected_env_dc()) else {
                return false;
            };
            let Some((namespace, key)) = self.find_configure(configure_id) else {
                return false;
            };
            UsageSnippet {
                app: app.app_name.clone(),
                env: selection.env.clone(),
                dc: selection.dc.clone(),
                namespace: namespace.to_owned(),
                key: key.to_owned(),
            }
        };
        self.dialog = Some(Dialog::Usage(snippet));
        true
    }

    fn clear_dependent(&mut self) {
        self.epoch.advance();
        self.selected_env_dc = None;
        self.configures = Loadable::Loading;
        self.dialog = None;
    }
}

impl Page for ConfigureBrowser {
    fn route(&self) -> Route {
        Route::Home
    }

    fn status(&self) -> &PageStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut PageStatus {
        &mut self.status
    }
}
