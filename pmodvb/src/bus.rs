//! Transport seam between the resolver and the DVB daemon.
//!
//! The resolver never talks to D-Bus directly. It asks a [`DvbBus`] for a
//! proxy bound to one remote object, then calls the methods exposed by that
//! proxy. Each proxy method is exactly one round trip to the daemon.
//!
//! [`crate::dbus::ZbusDvbBus`] is the production implementation; tests
//! provide scripted in-memory buses.

use crate::error::Result;
use crate::models::ChannelInfo;
use async_trait::async_trait;

/// Well-known bus name of the GNOME DVB daemon
pub const DVB_SERVICE: &str = "org.gnome.DVB";

/// Object path of the daemon's manager object
pub const MANAGER_PATH: &str = "/org/gnome/DVB/Manager";

pub const MANAGER_INTERFACE: &str = "org.gnome.DVB.Manager";
pub const DEVICE_GROUP_INTERFACE: &str = "org.gnome.DVB.DeviceGroup";
pub const CHANNEL_LIST_INTERFACE: &str = "org.gnome.DVB.ChannelList";

/// Opens per-request proxies on an already connected bus.
///
/// Implementations share one connection across every proxy they hand out
/// and never close it.
#[async_trait]
pub trait DvbBus: Send + Sync {
    /// Proxy for the manager object
    async fn manager(&self) -> Result<Box<dyn ManagerRpc>>;

    /// Proxy for the device group at `path`
    async fn device_group(&self, path: &str) -> Result<Box<dyn DeviceGroupRpc>>;

    /// Proxy for the channel list at `path`
    async fn channel_list(&self, path: &str) -> Result<Box<dyn ChannelListRpc>>;
}

/// `org.gnome.DVB.Manager`
#[async_trait]
pub trait ManagerRpc: Send + Sync {
    /// Object paths of every registered device group, in daemon order
    async fn registered_device_groups(&self) -> Result<Vec<String>>;

    /// Number of registered device groups as advertised by the daemon
    async fn device_group_size(&self) -> Result<u32>;
}

/// `org.gnome.DVB.DeviceGroup`
#[async_trait]
pub trait DeviceGroupRpc: Send + Sync {
    async fn name(&self) -> Result<String>;

    /// Object path of the group's channel list
    async fn channel_list(&self) -> Result<String>;
}

/// `org.gnome.DVB.ChannelList`
#[async_trait]
pub trait ChannelListRpc: Send + Sync {
    async fn channel_infos(&self) -> Result<Vec<ChannelInfo>>;
}
