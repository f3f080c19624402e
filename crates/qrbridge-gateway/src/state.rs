use std::sync::Arc;

use qrbridge_admin::{AdminConsole, AdminService, AdminSettings};
use qrbridge_core::{Group, ObjectStore, Repository};
use qrbridge_generator::LinkGenerator;
use qrbridge_qr::RenderOptions;
use qrbridge_redirector::{KeepAliveProbe, RedirectorService};
use tracing::warn;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewaySettings {
    /// Public origin that QR codes point at, e.g. `https://qr.example`.
    #[builder(setter(into))]
    pub domain: String,

    #[builder(default)]
    pub admin: AdminSettings,

    #[builder(default)]
    pub render: RenderOptions,

    /// Logo for codes whose group has no image of its own.
    #[builder(default, setter(strip_option))]
    pub default_logo: Option<Vec<u8>>,
}

pub struct AppState<R> {
    redirector: RedirectorService<R>,
    probe: KeepAliveProbe<R>,
    console: Arc<AdminConsole<R, LinkGenerator>>,
    object_store: Arc<dyn ObjectStore>,
    settings: Arc<GatewaySettings>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            redirector: self.redirector.clone(),
            probe: self.probe.clone(),
            console: Arc::clone(&self.console),
            object_store: Arc::clone(&self.object_store),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<R: Repository> AppState<R> {
    pub fn new(
        repository: Arc<R>,
        generator: LinkGenerator,
        object_store: Arc<dyn ObjectStore>,
        settings: GatewaySettings,
    ) -> Self {
        let service = AdminService::new(
            Arc::clone(&repository),
            generator,
            Arc::clone(&object_store),
            settings.admin.clone(),
        );
        Self {
            redirector: RedirectorService::from_shared(Arc::clone(&repository)),
            probe: KeepAliveProbe::new(repository),
            console: Arc::new(AdminConsole::new(service)),
            object_store,
            settings: Arc::new(settings),
        }
    }

    pub fn redirector(&self) -> &RedirectorService<R> {
        &self.redirector
    }

    pub fn probe(&self) -> &KeepAliveProbe<R> {
        &self.probe
    }

    pub fn console(&self) -> &AdminConsole<R, LinkGenerator> {
        &self.console
    }

    pub fn object_store(&self) -> &Arc<dyn ObjectStore> {
        &self.object_store
    }

    pub fn domain(&self) -> &str {
        &self.settings.domain
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// The logo to draw into a code of the given group: the group's own
    /// image when this service stores it, the default logo otherwise.
    pub async fn logo_for(&self, group: Option<&Group>) -> Option<Vec<u8>> {
        if let Some(url) = group.and_then(|g| g.image_url.as_deref()) {
            match self.object_store.fetch_url(url).await {
                Ok(Some(object)) => return Some(object.bytes),
                Ok(None) => {}
                Err(e) => warn!(url = %url, error = %e, "failed to load group logo"),
            }
        }
        self.settings.default_logo.clone()
    }
}
