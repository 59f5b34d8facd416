mod common;

use common::three_groups;
use pmodvb::DvbSettings;
use pmosource::{BrowseEvent, BrowseSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Counts events logged at `ERROR`
#[derive(Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

async fn errors_logged_by_browse(key: &str, container_id: Option<&str>) -> usize {
    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let bus = three_groups().fail(key).build();
    let source = bus.source(DvbSettings::default());
    let mut events: Vec<BrowseEvent> = Vec::new();
    source
        .browse(container_id, &mut events, CancellationToken::new())
        .await;

    assert_eq!(events.len(), 1);
    assert!(events[0].is_terminal());
    counter.count()
}

#[tokio::test]
async fn test_failed_browse_logs_one_error() {
    // Transport failure while opening a proxy
    assert_eq!(errors_logged_by_browse("Manager", None).await, 1);

    // Daemon fault on a call, during group resolution
    let key = "GetName:/org/gnome/DVB/DeviceGroup/2";
    assert_eq!(errors_logged_by_browse(key, None).await, 1);

    // Daemon fault while listing channels
    let key = "GetChannelInfos:/org/gnome/DVB/ChannelList/1";
    let list = Some("/org/gnome/DVB/ChannelList/1");
    assert_eq!(errors_logged_by_browse(key, list).await, 1);
}
