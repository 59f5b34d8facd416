//! Data models for DVB daemon records

use pmosource::{Container, MediaEntry, MediaKind};

/// One channel record as returned by `GetChannelInfos`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Service identifier, unique within one channel list only
    pub service_id: u32,
    pub name: String,
    pub is_radio: bool,
    pub url: String,
}

impl ChannelInfo {
    pub fn new(
        service_id: u32,
        name: impl Into<String>,
        is_radio: bool,
        url: impl Into<String>,
    ) -> Self {
        Self {
            service_id,
            name: name.into(),
            is_radio,
            url: url.into(),
        }
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_radio_flag(self.is_radio)
    }

    /// Converts the record into a playable item
    pub fn into_entry(self) -> MediaEntry {
        let kind = self.kind();
        MediaEntry::item(self.service_id.to_string(), self.name, self.url, kind)
    }
}

impl From<(u32, String, bool, String)> for ChannelInfo {
    fn from((service_id, name, is_radio, url): (u32, String, bool, String)) -> Self {
        Self {
            service_id,
            name,
            is_radio,
            url,
        }
    }
}

/// Resolution state of one device group during a single root browse.
///
/// `name` and `channel_list_path` are either both unset or both set. A
/// handle only becomes a container once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHandle {
    object_path: String,
    name: Option<String>,
    channel_list_path: Option<String>,
}

impl GroupHandle {
    pub fn new(object_path: impl Into<String>) -> Self {
        Self {
            object_path: object_path.into(),
            name: None,
            channel_list_path: None,
        }
    }

    pub fn object_path(&self) -> &str {
        &self.object_path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn channel_list_path(&self) -> Option<&str> {
        self.channel_list_path.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.name.is_some() && self.channel_list_path.is_some()
    }

    /// Resolved `(name, channel_list_path)`, if any
    pub fn resolved(&self) -> Option<(String, String)> {
        match (&self.name, &self.channel_list_path) {
            (Some(name), Some(path)) => Some((name.clone(), path.clone())),
            _ => None,
        }
    }

    pub(crate) fn set_resolved(&mut self, name: String, channel_list_path: String) {
        self.name = Some(name);
        self.channel_list_path = Some(channel_list_path);
    }

    /// Container entry for a resolved group; `None` while unresolved.
    ///
    /// The container id is the channel-list path so that browsing it reaches
    /// the channels in one hop.
    pub fn to_container(&self) -> Option<MediaEntry> {
        let (name, path) = self.resolved()?;
        Some(MediaEntry::Container(Container {
            id: path,
            title: name,
            group_path: Some(self.object_path.clone()),
        }))
    }
}
