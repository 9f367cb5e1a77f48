//! `/env_and_dc`: register environments and datacenters.

use tracing::info;

use crate::client::OnlyConfigClient;
use crate::route::Route;
use crate::types::{EnvDcKind, EnvDcRegistry};
use crate::views::{Loadable, Page, PageStatus, take_input};

#[derive(Debug, Default)]
pub struct EnvAndDcPage {
    registry: Loadable<EnvDcRegistry>,
    pub env_input: String,
    pub dc_input: String,
    status: PageStatus,
}

impl EnvAndDcPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Loadable<EnvDcRegistry> {
        &self.registry
    }

    /// Fetch the registry. A failed fetch keeps whatever was shown before.
    pub async fn load(&mut self, client: &OnlyConfigClient) {
        let result = client.env_dc_list().await;
        if let Some(registry) = self.status.settle(result, "Get env_dc_list error") {
            self.registry = Loadable::Loaded(registry);
        }
    }

    /// Submit the input for `kind`. The input is cleared before sending; the
    /// registry is re-fetched only when the backend accepted the name.
    pub async fn submit_new(&mut self, client: &OnlyConfigClient, kind: EnvDcKind) -> bool {
        let name = match kind {
            EnvDcKind::Env => take_input(&mut self.env_input),
            EnvDcKind::Dc => take_input(&mut self.dc_input),
        };

        let result = client.register_env_dc(kind, &name).await;
        if self.status.settle(result, "put env or dc error").is_none() {
            return false;
        }
        info!(kind = kind.as_str(), name = %name, "registered");
        self.load(client).await;
        true
    }
}

impl Page for EnvAndDcPage {
    fn route(&self) -> Route {
        Route::EnvAndDc
    }

    fn status(&self) -> &PageStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut PageStatus {
        &mut self.status
    }
}
