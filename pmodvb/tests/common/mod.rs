//! Scripted in-memory DVB daemon shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use pmodvb::{
    ChannelInfo, ChannelListRpc, DeviceGroupRpc, DvbBus, DvbDaemonSource, DvbSettings, Error,
    ManagerRpc, Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const NEWS: (u32, &str, bool, &str) = (101, "News", false, "rtsp://a");

#[derive(Default)]
struct Script {
    /// (group path, name, channel list path), in registration order
    groups: Vec<(String, String, String)>,
    channels: HashMap<String, Vec<ChannelInfo>>,
    advertised: Option<u32>,
    failures: HashSet<String>,
    delays: HashMap<String, Duration>,
    cancel_on: HashMap<String, CancellationToken>,
}

struct Inner {
    script: Script,
    calls: Mutex<Vec<String>>,
}

impl Inner {
    /// Records one round trip and plays its scripted behaviour
    async fn call(&self, key: String, method: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(key.clone());

        if let Some(token) = self.script.cancel_on.get(&key) {
            token.cancel();
        }
        if let Some(delay) = self.script.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.script.failures.contains(&key) {
            return Err(match method {
                "Manager" | "DeviceGroup" | "ChannelList" => {
                    Error::transport(format!("{} unreachable", key))
                }
                _ => Error::rpc(method, "org.freedesktop.DBus.Error.Failed: scripted failure"),
            });
        }
        Ok(())
    }

    fn group(&self, path: &str) -> Option<&(String, String, String)> {
        self.script.groups.iter().find(|(p, _, _)| p == path)
    }
}

/// Builder for [`MockBus`]
#[derive(Default)]
pub struct MockBusBuilder {
    script: Script,
}

impl MockBusBuilder {
    pub fn group(mut self, path: &str, name: &str, channel_list: &str) -> Self {
        self.script
            .groups
            .push((path.to_string(), name.to_string(), channel_list.to_string()));
        self.script.channels.entry(channel_list.to_string()).or_default();
        self
    }

    pub fn channels(mut self, channel_list: &str, records: &[(u32, &str, bool, &str)]) -> Self {
        let infos = records
            .iter()
            .map(|(sid, name, radio, url)| ChannelInfo::new(*sid, *name, *radio, *url))
            .collect();
        self.script.channels.insert(channel_list.to_string(), infos);
        self
    }

    /// Overrides the count returned by `GetDeviceGroupSize`
    pub fn advertise(mut self, count: u32) -> Self {
        self.script.advertised = Some(count);
        self
    }

    pub fn fail(mut self, key: &str) -> Self {
        self.script.failures.insert(key.to_string());
        self
    }

    pub fn delay(mut self, key: &str, delay: Duration) -> Self {
        self.script.delays.insert(key.to_string(), delay);
        self
    }

    /// Cancels `token` as soon as the call `key` is dispatched
    pub fn cancel_on(mut self, key: &str, token: &CancellationToken) -> Self {
        self.script.cancel_on.insert(key.to_string(), token.clone());
        self
    }

    pub fn build(self) -> MockBus {
        MockBus {
            inner: Arc::new(Inner {
                script: self.script,
                calls: Mutex::new(Vec::new()),
            }),
        }
    }
}

/// In-memory daemon recording every round trip.
///
/// Call keys: `Manager`, `GetRegisteredDeviceGroups`, `GetDeviceGroupSize`,
/// `DeviceGroup:<path>`, `GetName:<path>`, `GetChannelList:<path>`,
/// `ChannelList:<path>`, `GetChannelInfos:<path>`.
#[derive(Clone)]
pub struct MockBus {
    inner: Arc<Inner>,
}

impl MockBus {
    pub fn builder() -> MockBusBuilder {
        MockBusBuilder::default()
    }

    /// Every call dispatched so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn source(&self, settings: DvbSettings) -> DvbDaemonSource {
        DvbDaemonSource::new(Arc::new(self.clone()), settings)
    }
}

#[async_trait]
impl DvbBus for MockBus {
    async fn manager(&self) -> Result<Box<dyn ManagerRpc>> {
        self.inner.call("Manager".to_string(), "Manager").await?;
        Ok(Box::new(MockManager(self.inner.clone())))
    }

    async fn device_group(&self, path: &str) -> Result<Box<dyn DeviceGroupRpc>> {
        self.inner
            .call(format!("DeviceGroup:{}", path), "DeviceGroup")
            .await?;
        Ok(Box::new(MockDeviceGroup(self.inner.clone(), path.to_string())))
    }

    async fn channel_list(&self, path: &str) -> Result<Box<dyn ChannelListRpc>> {
        self.inner
            .call(format!("ChannelList:{}", path), "ChannelList")
            .await?;
        Ok(Box::new(MockChannelList(self.inner.clone(), path.to_string())))
    }
}

struct MockManager(Arc<Inner>);

#[async_trait]
impl ManagerRpc for MockManager {
    async fn registered_device_groups(&self) -> Result<Vec<String>> {
        self.0
            .call("GetRegisteredDeviceGroups".to_string(), "GetRegisteredDeviceGroups")
            .await?;
        Ok(self.0.script.groups.iter().map(|(p, _, _)| p.clone()).collect())
    }

    async fn device_group_size(&self) -> Result<u32> {
        self.0
            .call("GetDeviceGroupSize".to_string(), "GetDeviceGroupSize")
            .await?;
        Ok(self
            .0
            .script
            .advertised
            .unwrap_or(self.0.script.groups.len() as u32))
    }
}

struct MockDeviceGroup(Arc<Inner>, String);

#[async_trait]
impl DeviceGroupRpc for MockDeviceGroup {
    async fn name(&self) -> Result<String> {
        self.0.call(format!("GetName:{}", self.1), "GetName").await?;
        self.0
            .group(&self.1)
            .map(|(_, name, _)| name.clone())
            .ok_or_else(|| Error::rpc("GetName", "unknown object"))
    }

    async fn channel_list(&self) -> Result<String> {
        self.0
            .call(format!("GetChannelList:{}", self.1), "GetChannelList")
            .await?;
        self.0
            .group(&self.1)
            .map(|(_, _, list)| list.clone())
            .ok_or_else(|| Error::rpc("GetChannelList", "unknown object"))
    }
}

struct MockChannelList(Arc<Inner>, String);

#[async_trait]
impl ChannelListRpc for MockChannelList {
    async fn channel_infos(&self) -> Result<Vec<ChannelInfo>> {
        self.0
            .call(format!("GetChannelInfos:{}", self.1), "GetChannelInfos")
            .await?;
        self.0
            .script
            .channels
            .get(&self.1)
            .cloned()
            .ok_or_else(|| Error::rpc("GetChannelInfos", "unknown object"))
    }
}

/// Three device groups with one channel each
pub fn three_groups() -> MockBusBuilder {
    MockBus::builder()
        .group("/org/gnome/DVB/DeviceGroup/1", "DVB-T", "/org/gnome/DVB/ChannelList/1")
        .group("/org/gnome/DVB/DeviceGroup/2", "DVB-S", "/org/gnome/DVB/ChannelList/2")
        .group("/org/gnome/DVB/DeviceGroup/3", "DVB-C", "/org/gnome/DVB/ChannelList/3")
        .channels("/org/gnome/DVB/ChannelList/1", &[NEWS])
        .channels("/org/gnome/DVB/ChannelList/2", &[(7, "Jazz", true, "rtsp://j")])
        .channels("/org/gnome/DVB/ChannelList/3", &[(9, "Sport", false, "rtsp://s")])
}
