//! # PMOSource
//!
//! Common browse contract for PMO media sources.
//!
//! A source exposes a remote catalog as a tree of containers and playable
//! items. Callers walk the tree one level at a time through
//! [`BrowseSource::browse`]: `None` lists the root, any other identifier lists
//! the children of the container carrying that identifier.
//!
//! ## Features
//!
//! - **Typed entries**: [`MediaEntry`] is either a [`Container`] or an [`Item`].
//! - **Streaming delivery**: results go to a [`BrowseSink`] one event at a
//!   time, each with its remaining count.
//! - **Single-shot requests**: [`Emitter`] guarantees one terminal event and
//!   silence after cancellation.
//! - **Send + Sync**: ready for async hosts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pmosource::{browse_to_vec, BrowseSource};
//!
//! let groups = browse_to_vec(&source, None).await?;
//! for group in &groups {
//!     let channels = browse_to_vec(&source, Some(group.id())).await?;
//!     println!("{}: {} channels", group.title(), channels.len());
//! }
//! ```

pub mod entry;
pub mod sink;

use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

pub use entry::{Container, Item, MediaEntry, MediaKind, MetadataKey, SUPPORTED_KEYS};
pub use sink::{BrowseEvent, BrowseSink, Emitter, FnSink, events_into_result};

/// Error types delivered to browse callers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The backend cannot be reached
    #[error("Source not available: {0}")]
    SourceUnavailable(String),

    /// The backend answered with a fault
    #[error("Remote call failed: {0}")]
    Remote(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Browse error: {0}")]
    BrowseError(String),
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Capability trait implemented by every browsable source
///
/// # Delivery contract
///
/// `browse` reports exclusively through `sink`:
///
/// - entries arrive in the order of the remote enumeration, each with the
///   number of entries still to come;
/// - exactly one terminal event ends the listing (last entry, `Done` for an
///   empty listing, or `Failed`);
/// - if `cancel` is already triggered nothing is dispatched and the sink is
///   never called; if it triggers while a call is in flight the late result
///   is dropped.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use in async hosts.
#[async_trait::async_trait]
pub trait BrowseSource: Debug + Send + Sync {
    /// Returns a unique identifier for the source
    fn id(&self) -> &str;

    /// Returns the human-readable name of the source
    fn name(&self) -> &str;

    /// Returns a one-line description of the source
    fn description(&self) -> &str {
        ""
    }

    /// Metadata keys this source fills in on its entries
    fn supported_keys(&self) -> &'static [MetadataKey] {
        SUPPORTED_KEYS
    }

    /// Lists the children of `container_id` (`None` = root) into `sink`
    async fn browse(
        &self,
        container_id: Option<&str>,
        sink: &mut dyn BrowseSink,
        cancel: CancellationToken,
    );
}

/// Runs one browse to completion and collects its entries
pub async fn browse_to_vec(
    source: &dyn BrowseSource,
    container_id: Option<&str>,
) -> Result<Vec<MediaEntry>> {
    let mut events: Vec<BrowseEvent> = Vec::new();
    source
        .browse(container_id, &mut events, CancellationToken::new())
        .await;
    events_into_result(events)
}

// Re-export commonly used types
pub use async_trait::async_trait;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestSource;

    #[async_trait]
    impl BrowseSource for TestSource {
        fn id(&self) -> &str {
            "test-source"
        }

        fn name(&self) -> &str {
            "Test Source"
        }

        async fn browse(
            &self,
            container_id: Option<&str>,
            sink: &mut dyn BrowseSink,
            cancel: CancellationToken,
        ) {
            let mut emitter = Emitter::new(sink, cancel);
            match container_id {
                None => {
                    emitter.emit_all(vec![MediaEntry::container("box", "Box")]);
                }
                Some("box") => {
                    emitter.emit_all(vec![
                        MediaEntry::item("1", "One", "http://one", MediaKind::Audio),
                        MediaEntry::item("2", "Two", "http://two", MediaKind::Video),
                    ]);
                }
                Some("empty") => {
                    emitter.emit_all(Vec::new());
                }
                Some(other) => {
                    emitter.fail(SourceError::ObjectNotFound(other.to_string()));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_browse_source_trait() {
        let source = TestSource;
        assert_eq!(source.id(), "test-source");
        assert_eq!(source.name(), "Test Source");
        assert_eq!(source.description(), "");
        assert_eq!(source.supported_keys(), SUPPORTED_KEYS);
    }

    #[tokio::test]
    async fn test_browse_to_vec() {
        let source = TestSource;

        let root = browse_to_vec(&source, None).await.unwrap();
        assert_eq!(root.len(), 1);
        assert!(root[0].is_container());

        let children = browse_to_vec(&source, Some("box")).await.unwrap();
        let ids: Vec<_> = children.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        assert!(browse_to_vec(&source, Some("empty")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_browse_unknown_container() {
        let source = TestSource;
        let result = browse_to_vec(&source, Some("nope")).await;
        assert!(matches!(result, Err(SourceError::ObjectNotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_cancelled_browse_is_silent() {
        let source = TestSource;
        let token = CancellationToken::new();
        token.cancel();

        let mut events: Vec<BrowseEvent> = Vec::new();
        source.browse(Some("box"), &mut events, token).await;
        assert!(events.is_empty());
    }
}
