//! D-Bus transport on top of zbus
//!
//! One [`zbus::Connection`] is opened per process and cloned into every
//! proxy. Proxies are built per request with property caching disabled, so
//! building one does not round-trip to the daemon.

use crate::bus::{
    ChannelListRpc, DeviceGroupRpc, DvbBus, ManagerRpc, CHANNEL_LIST_INTERFACE,
    DEVICE_GROUP_INTERFACE, MANAGER_INTERFACE,
};
use crate::error::{Error, Result};
use crate::models::ChannelInfo;
use crate::settings::{BusKind, DvbSettings};
use async_trait::async_trait;
use tracing::debug;
use zbus::proxy::CacheProperties;
use zbus::zvariant::OwnedObjectPath;
use zbus::Connection;

#[zbus::proxy(interface = "org.gnome.DVB.Manager", gen_blocking = false)]
trait Manager {
    fn get_registered_device_groups(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    fn get_device_group_size(&self) -> zbus::Result<u32>;
}

#[zbus::proxy(interface = "org.gnome.DVB.DeviceGroup", gen_blocking = false)]
trait DeviceGroup {
    fn get_name(&self) -> zbus::Result<String>;

    fn get_channel_list(&self) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(interface = "org.gnome.DVB.ChannelList", gen_blocking = false)]
trait ChannelList {
    fn get_channel_infos(&self) -> zbus::Result<Vec<(u32, String, bool, String)>>;
}

fn proxy_error(interface: &str, path: &str, err: zbus::Error) -> Error {
    debug!(interface, path, "Could not construct proxy: {}", err);
    Error::transport(format!("{} proxy for {}: {}", interface, path, err))
}

/// [`DvbBus`] backed by a live session or system bus connection
#[derive(Debug, Clone)]
pub struct ZbusDvbBus {
    connection: Connection,
    service: String,
    manager_path: String,
}

impl ZbusDvbBus {
    /// Connects to the bus named in `settings`
    pub async fn connect(settings: &DvbSettings) -> Result<Self> {
        debug!(bus = %settings.bus, "Connecting to the message bus");
        let connection = match settings.bus {
            BusKind::Session => Connection::session().await,
            BusKind::System => Connection::system().await,
        }
        .map_err(|e| {
            debug!(bus = %settings.bus, "Could not connect to the bus: {}", e);
            Error::transport(format!("{} bus: {}", settings.bus, e))
        })?;
        Ok(Self::with_connection(connection, settings))
    }

    /// Reuses an already opened connection
    pub fn with_connection(connection: Connection, settings: &DvbSettings) -> Self {
        Self {
            connection,
            service: settings.service.clone(),
            manager_path: settings.manager_path.clone(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

#[async_trait]
impl DvbBus for ZbusDvbBus {
    async fn manager(&self) -> Result<Box<dyn ManagerRpc>> {
        let proxy = ManagerProxy::builder(&self.connection)
            .destination(self.service.clone())
            .and_then(|b| b.path(self.manager_path.clone()))
            .map_err(|e| proxy_error(MANAGER_INTERFACE, &self.manager_path, e))?
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(|e| proxy_error(MANAGER_INTERFACE, &self.manager_path, e))?;
        Ok(Box::new(ZbusManager(proxy)))
    }

    async fn device_group(&self, path: &str) -> Result<Box<dyn DeviceGroupRpc>> {
        let proxy = DeviceGroupProxy::builder(&self.connection)
            .destination(self.service.clone())
            .and_then(|b| b.path(path.to_string()))
            .map_err(|e| proxy_error(DEVICE_GROUP_INTERFACE, path, e))?
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(|e| proxy_error(DEVICE_GROUP_INTERFACE, path, e))?;
        Ok(Box::new(ZbusDeviceGroup(proxy)))
    }

    async fn channel_list(&self, path: &str) -> Result<Box<dyn ChannelListRpc>> {
        let proxy = ChannelListProxy::builder(&self.connection)
            .destination(self.service.clone())
            .and_then(|b| b.path(path.to_string()))
            .map_err(|e| proxy_error(CHANNEL_LIST_INTERFACE, path, e))?
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(|e| proxy_error(CHANNEL_LIST_INTERFACE, path, e))?;
        Ok(Box::new(ZbusChannelList(proxy)))
    }
}

struct ZbusManager(ManagerProxy<'static>);

#[async_trait]
impl ManagerRpc for ZbusManager {
    async fn registered_device_groups(&self) -> Result<Vec<String>> {
        let paths = self
            .0
            .get_registered_device_groups()
            .await
            .map_err(|e| Error::rpc("GetRegisteredDeviceGroups", e))?;
        Ok(paths.iter().map(|p| p.as_str().to_string()).collect())
    }

    async fn device_group_size(&self) -> Result<u32> {
        self.0
            .get_device_group_size()
            .await
            .map_err(|e| Error::rpc("GetDeviceGroupSize", e))
    }
}

struct ZbusDeviceGroup(DeviceGroupProxy<'static>);

#[async_trait]
impl DeviceGroupRpc for ZbusDeviceGroup {
    async fn name(&self) -> Result<String> {
        self.0
            .get_name()
            .await
            .map_err(|e| Error::rpc("GetName", e))
    }

    async fn channel_list(&self) -> Result<String> {
        let path = self
            .0
            .get_channel_list()
            .await
            .map_err(|e| Error::rpc("GetChannelList", e))?;
        Ok(path.as_str().to_string())
    }
}

struct ZbusChannelList(ChannelListProxy<'static>);

#[async_trait]
impl ChannelListRpc for ZbusChannelList {
    async fn channel_infos(&self) -> Result<Vec<ChannelInfo>> {
        let records = self
            .0
            .get_channel_infos()
            .await
            .map_err(|e| Error::rpc("GetChannelInfos", e))?;
        Ok(records.into_iter().map(ChannelInfo::from).collect())
    }
}
