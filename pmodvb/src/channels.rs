//! Leaf listing: the channels of one channel list

use crate::bus::{ChannelListRpc, DvbBus};
use crate::error::Result;
use crate::request::{BrowseRequest, FetchState};
use crate::rpc::RpcContext;
use pmosource::MediaEntry;
use tracing::{debug, info};

/// Fetches the channel records of a channel list as items
pub struct ChannelListFetcher<'a> {
    bus: &'a dyn DvbBus,
    rpc: &'a RpcContext,
}

impl<'a> ChannelListFetcher<'a> {
    pub fn new(bus: &'a dyn DvbBus, rpc: &'a RpcContext) -> Self {
        Self { bus, rpc }
    }

    /// Opens the channel list at `path` and converts every record, in
    /// record order.
    pub async fn fetch_channels(&self, path: &str) -> Result<Vec<MediaEntry>> {
        let list = self.open_list(path).await?;
        self.fetch_entries(list.as_ref()).await
    }

    async fn open_list(&self, path: &str) -> Result<Box<dyn ChannelListRpc>> {
        self.rpc
            .dispatch("ChannelList", || self.bus.channel_list(path))
            .await
    }

    async fn fetch_entries(&self, list: &dyn ChannelListRpc) -> Result<Vec<MediaEntry>> {
        let infos = self
            .rpc
            .dispatch("GetChannelInfos", || list.channel_infos())
            .await?;
        Ok(infos
            .into_iter()
            .map(|info| {
                debug!(
                    sid = info.service_id,
                    radio = info.is_radio,
                    "Creating channel media {}",
                    info.name
                );
                info.into_entry()
            })
            .collect())
    }

    /// Runs the leaf listing of `path` for `request`
    pub async fn list_channels(&self, path: &str, request: &mut BrowseRequest<'_>) {
        info!(path = %path, "Browsing device group with ID {}", path);

        if !request.advance(FetchState::ProxyOpening) {
            return;
        }
        let list = match self.open_list(path).await {
            Ok(list) => list,
            Err(err) => {
                request.finish(Err(err));
                return;
            }
        };

        if !request.advance(FetchState::Fetching) {
            return;
        }
        let outcome = self.fetch_entries(list.as_ref()).await;
        request.finish(outcome);
    }
}
