//! Catalog entries returned by a browse operation.
//!
//! A listing is made of two kinds of nodes: browsable [`Container`]s and
//! playable leaf [`Item`]s. Entries are plain values, immutable once built,
//! and handed to the caller by value.

use serde::{Deserialize, Serialize};

/// Kind of playable media carried by an [`Item`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Maps a broadcaster "is radio" flag to a media kind.
    ///
    /// Radio services are audio only, everything else is treated as video.
    pub fn from_radio_flag(is_radio: bool) -> Self {
        if is_radio {
            MediaKind::Audio
        } else {
            MediaKind::Video
        }
    }
}

/// A browsable node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Identifier to pass back to `browse` to list this container's children
    pub id: String,

    /// Human-readable title (may be empty when the remote side has no name)
    pub title: String,

    /// Remote object the container was built from, when it differs from `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_path: Option<String>,
}

/// A playable leaf node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier, unique within its parent container only
    pub id: String,
    pub title: String,
    /// Playable URL
    pub url: String,
    pub kind: MediaKind,
}

/// A catalog node: container or item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaEntry {
    Container(Container),
    Item(Item),
}

impl MediaEntry {
    pub fn container(id: impl Into<String>, title: impl Into<String>) -> Self {
        MediaEntry::Container(Container {
            id: id.into(),
            title: title.into(),
            group_path: None,
        })
    }

    pub fn item(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        kind: MediaKind,
    ) -> Self {
        MediaEntry::Item(Item {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            kind,
        })
    }

    pub fn id(&self) -> &str {
        match self {
            MediaEntry::Container(c) => &c.id,
            MediaEntry::Item(i) => &i.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaEntry::Container(c) => &c.title,
            MediaEntry::Item(i) => &i.title,
        }
    }

    /// Playable URL, items only
    pub fn url(&self) -> Option<&str> {
        match self {
            MediaEntry::Container(_) => None,
            MediaEntry::Item(i) => Some(&i.url),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, MediaEntry::Container(_))
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            MediaEntry::Container(c) => Some(c),
            MediaEntry::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            MediaEntry::Container(_) => None,
            MediaEntry::Item(i) => Some(i),
        }
    }
}

/// Metadata attributes a source can fill in on its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataKey {
    Id,
    Title,
    Url,
    /// Only meaningful on containers
    ChildCount,
}

impl MetadataKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataKey::Id => "id",
            MetadataKey::Title => "title",
            MetadataKey::Url => "url",
            MetadataKey::ChildCount => "childcount",
        }
    }
}

/// Keys advertised by default to the host framework
pub const SUPPORTED_KEYS: &[MetadataKey] = &[
    MetadataKey::Id,
    MetadataKey::Title,
    MetadataKey::Url,
    MetadataKey::ChildCount,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radio_flag_maps_to_kind() {
        assert_eq!(MediaKind::from_radio_flag(true), MediaKind::Audio);
        assert_eq!(MediaKind::from_radio_flag(false), MediaKind::Video);
    }

    #[test]
    fn test_entry_accessors() {
        let channel = MediaEntry::item("101", "News", "rtsp://a", MediaKind::Video);
        assert_eq!(channel.id(), "101");
        assert_eq!(channel.title(), "News");
        assert_eq!(channel.url(), Some("rtsp://a"));
        assert!(!channel.is_container());
        assert!(channel.as_container().is_none());

        let group = MediaEntry::container("/org/gnome/DVB/ChannelList/1", "Terrestrial");
        assert!(group.is_container());
        assert_eq!(group.url(), None);
        assert_eq!(group.as_container().unwrap().group_path, None);
    }

    #[test]
    fn test_entry_json_shape() {
        let channel = MediaEntry::item("7", "Radio One", "http://r", MediaKind::Audio);
        let json = serde_json::to_value(&channel).unwrap();
        assert_eq!(json["type"], "item");
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["id"], "7");

        let back: MediaEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, channel);
    }

    #[test]
    fn test_supported_keys() {
        let names: Vec<_> = SUPPORTED_KEYS.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "url", "childcount"]);
    }
}
