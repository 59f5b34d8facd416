//! GNOME DVB daemon source for PMO
//!
//! This crate exposes the TV and radio channels managed by the GNOME DVB
//! daemon as a browsable catalog, through the [`pmosource::BrowseSource`]
//! contract.
//!
//! # Catalog layout
//!
//! - **Root**: one container per registered device group, titled with the
//!   group's name. The container id is the object path of the group's
//!   channel list.
//! - **Container**: one item per channel. The item id is the channel's
//!   service id, radio channels are audio items, the others video items.
//!
//! # Features
//!
//! - **Ordered streaming**: entries arrive in daemon order with a remaining
//!   count ending at exactly one `0`
//! - **All-or-nothing group listing**: one unresolvable group fails the root
//! - **Cancellation**: a cancelled request dispatches nothing and delivers
//!   nothing
//! - **Configuration Extension** (`pmoconfig` feature): `sources.dvb.*` keys
//! - **D-Bus transport** (`dbus` feature): zbus on the tokio runtime
//!
//! # Example
//!
//! ```no_run
//! use pmodvb::{DvbDaemonSource, DvbSettings};
//! use pmosource::browse_to_vec;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = DvbDaemonSource::connect(DvbSettings::default()).await?;
//!
//!     for group in browse_to_vec(&source, None).await? {
//!         let channels = browse_to_vec(&source, Some(group.id())).await?;
//!         println!("{}: {} channels", group.title(), channels.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod channels;
pub mod error;
pub mod manager;
pub mod models;
pub mod request;
pub mod resolver;
pub mod rpc;
pub mod settings;
pub mod source;

#[cfg(feature = "pmoconfig")]
pub mod config_ext;

#[cfg(feature = "dbus")]
pub mod dbus;

pub use bus::{ChannelListRpc, DeviceGroupRpc, DvbBus, ManagerRpc, DVB_SERVICE, MANAGER_PATH};
pub use channels::ChannelListFetcher;
pub use error::{CountMismatch, Error, Error as DvbError, Result};
pub use manager::ManagerFetcher;
pub use models::{ChannelInfo, GroupHandle};
pub use request::{BrowseRequest, FetchState};
pub use resolver::GroupResolver;
pub use rpc::RpcContext;
pub use settings::{BusKind, DvbSettings};
pub use source::{DvbDaemonSource, SOURCE_DESC, SOURCE_ID, SOURCE_NAME};

#[cfg(feature = "pmoconfig")]
pub use config_ext::DvbConfigExt;

#[cfg(feature = "dbus")]
pub use dbus::ZbusDvbBus;
