//! BrowseSource implementation for the GNOME DVB daemon
//!
//! The root of the catalog lists the daemon's device groups as containers.
//! Browsing a container lists the channels of its channel list as items.

use crate::bus::DvbBus;
use crate::channels::ChannelListFetcher;
use crate::manager::ManagerFetcher;
use crate::request::{BrowseRequest, FetchState};
use crate::resolver::GroupResolver;
use crate::rpc::RpcContext;
use crate::settings::DvbSettings;
use pmosource::{async_trait, BrowseSink, BrowseSource};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const SOURCE_ID: &str = "grl-dvb-daemon";
pub const SOURCE_NAME: &str = "DVB Daemon";
pub const SOURCE_DESC: &str = "A source to access TV and radio channels";

/// TV and radio channels of the GNOME DVB daemon
///
/// Every browse call opens its own proxies and resolves device groups
/// afresh; nothing is cached between calls since the daemon's groups and
/// channel lists may change at any time. The bus connection is shared.
#[derive(Clone)]
pub struct DvbDaemonSource {
    bus: Arc<dyn DvbBus>,
    settings: DvbSettings,
}

impl DvbDaemonSource {
    /// Creates a source over an already connected bus
    pub fn new(bus: Arc<dyn DvbBus>, settings: DvbSettings) -> Self {
        Self { bus, settings }
    }

    /// Connects to the configured bus and returns a ready source
    ///
    /// # Errors
    ///
    /// A `Transport` error if the bus cannot be reached.
    #[cfg(feature = "dbus")]
    pub async fn connect(settings: DvbSettings) -> crate::error::Result<Self> {
        let bus = crate::dbus::ZbusDvbBus::connect(&settings).await?;
        tracing::info!(
            service = %settings.service,
            bus = %settings.bus,
            "DVB daemon source ready"
        );
        Ok(Self::new(Arc::new(bus), settings))
    }

    pub fn settings(&self) -> &DvbSettings {
        &self.settings
    }

    fn rpc_context(&self, cancel: CancellationToken) -> RpcContext {
        RpcContext::new(cancel, self.settings.call_timeout)
    }

    async fn browse_root(&self, rpc: &RpcContext, request: &mut BrowseRequest<'_>) {
        if !request.advance(FetchState::ProxyOpening) {
            return;
        }
        let bus = self.bus.as_ref();
        let manager = match rpc.dispatch("Manager", || bus.manager()).await {
            Ok(manager) => manager,
            Err(err) => {
                request.finish(Err(err));
                return;
            }
        };

        let resolver = GroupResolver::new(bus, rpc);
        let mut fetcher = ManagerFetcher::new(manager, resolver, rpc)
            .with_concurrency(self.settings.resolve_concurrency);
        fetcher.list_groups(request).await;
    }
}

impl fmt::Debug for DvbDaemonSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DvbDaemonSource")
            .field("id", &SOURCE_ID)
            .field("settings", &self.settings)
            .finish()
    }
}

#[async_trait]
impl BrowseSource for DvbDaemonSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn description(&self) -> &str {
        SOURCE_DESC
    }

    async fn browse(
        &self,
        container_id: Option<&str>,
        sink: &mut dyn BrowseSink,
        cancel: CancellationToken,
    ) {
        if cancel.is_cancelled() {
            debug!(container = ?container_id, "Browse cancelled before dispatch");
            return;
        }
        debug!(container = ?container_id, "browse");

        let rpc = self.rpc_context(cancel.clone());
        let mut request = BrowseRequest::new(container_id, sink, cancel);

        match container_id {
            None => self.browse_root(&rpc, &mut request).await,
            Some(path) => {
                ChannelListFetcher::new(self.bus.as_ref(), &rpc)
                    .list_channels(path, &mut request)
                    .await
            }
        }
    }
}
