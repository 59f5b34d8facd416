//! Root listing: registered device groups as containers

use crate::bus::ManagerRpc;
use crate::error::{CountMismatch, Error, Result};
use crate::models::GroupHandle;
use crate::request::{BrowseRequest, FetchState};
use crate::resolver::GroupResolver;
use crate::rpc::RpcContext;
use futures::{stream, StreamExt, TryStreamExt};
use pmosource::MediaEntry;
use tracing::{debug, info, warn};

/// Enumerates device groups and resolves each into a container.
///
/// The listing is all-or-nothing: one group failing to resolve fails the
/// whole listing. Containers come out in the daemon's enumeration order,
/// whatever the resolution concurrency.
pub struct ManagerFetcher<'a> {
    manager: Box<dyn ManagerRpc>,
    resolver: GroupResolver<'a>,
    rpc: &'a RpcContext,
    concurrency: usize,
    count_mismatch: Option<CountMismatch>,
}

impl<'a> ManagerFetcher<'a> {
    pub fn new(
        manager: Box<dyn ManagerRpc>,
        resolver: GroupResolver<'a>,
        rpc: &'a RpcContext,
    ) -> Self {
        Self {
            manager,
            resolver,
            rpc,
            concurrency: 1,
            count_mismatch: None,
        }
    }

    /// Maximum number of groups resolved at once (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Discrepancy seen on the last fetch between the advertised group
    /// count and the enumerated paths
    pub fn count_mismatch(&self) -> Option<CountMismatch> {
        self.count_mismatch
    }

    /// Fetches and resolves every registered group.
    pub async fn fetch_groups(&mut self) -> Result<Vec<MediaEntry>> {
        let manager = &self.manager;
        let paths = self
            .rpc
            .dispatch("GetRegisteredDeviceGroups", || {
                manager.registered_device_groups()
            })
            .await?;
        let advertised = self
            .rpc
            .dispatch("GetDeviceGroupSize", || manager.device_group_size())
            .await?;

        self.count_mismatch = None;
        if advertised as usize != paths.len() {
            let mismatch = CountMismatch {
                advertised,
                actual: paths.len(),
            };
            warn!("{}, trusting the enumerated list", mismatch);
            self.count_mismatch = Some(mismatch);
        }

        info!("Retrieving {} device groups", paths.len());

        let resolver = self.resolver;
        let handles: Vec<GroupHandle> = stream::iter(paths)
            .map(move |path| async move {
                let mut handle = GroupHandle::new(path);
                resolver.resolve(&mut handle).await?;
                Ok::<_, Error>(handle)
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let entries = handles
            .iter()
            .filter_map(|handle| {
                let entry = handle.to_container()?;
                debug!(
                    group = %handle.object_path(),
                    "Adding media box with ID {}",
                    entry.id()
                );
                Some(entry)
            })
            .collect();
        Ok(entries)
    }

    /// Runs the root listing for `request` and delivers its outcome.
    pub async fn list_groups(&mut self, request: &mut BrowseRequest<'_>) {
        if !request.advance(FetchState::Fetching) {
            return;
        }
        let outcome = self.fetch_groups().await;
        request.finish(outcome);
    }
}
