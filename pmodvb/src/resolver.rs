//! Lazy resolution of device-group metadata

use crate::bus::DvbBus;
use crate::error::Result;
use crate::models::GroupHandle;
use crate::rpc::RpcContext;
use tracing::debug;

/// Resolves a group's display name and channel-list path.
///
/// Both values are fetched with two sequential calls, name first. The handle
/// is only updated once both calls succeeded.
#[derive(Clone, Copy)]
pub struct GroupResolver<'a> {
    bus: &'a dyn DvbBus,
    rpc: &'a RpcContext,
}

impl<'a> GroupResolver<'a> {
    pub fn new(bus: &'a dyn DvbBus, rpc: &'a RpcContext) -> Self {
        Self { bus, rpc }
    }

    /// Returns `(name, channel_list_path)` for `handle`, fetching them if needed.
    ///
    /// A resolved handle is returned as is without any call.
    pub async fn resolve(&self, handle: &mut GroupHandle) -> Result<(String, String)> {
        if let Some(resolved) = handle.resolved() {
            return Ok(resolved);
        }

        let path = handle.object_path().to_string();
        debug!(path = %path, "Resolving device group");

        let group = self
            .rpc
            .dispatch("DeviceGroup", || self.bus.device_group(&path))
            .await?;
        let name = self.rpc.dispatch("GetName", || group.name()).await?;
        let channel_list = self
            .rpc
            .dispatch("GetChannelList", || group.channel_list())
            .await?;

        handle.set_resolved(name.clone(), channel_list.clone());
        Ok((name, channel_list))
    }
}
