use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use super::{ListState, ModerationScreen};
use crate::api::{routes, ApiClient, ApiRequest, CredentialProvider};
use crate::error::{ClientError, ClientResult};
use crate::ids::Id;
use crate::inflight::InFlight;
use crate::lifecycle::{Mount, UnmountHandle};
use crate::report::{aggregate, ReportCollection, ReportCounts, ReportKey, ReportRecord};

#[cfg(feature = "emitter")]
use super::events::{ModerationEvents, NavigationTarget};

/// Deletions the server has confirmed during this controller's lifetime.
///
/// Applied to every fetched collection, so a fetch that was already in flight
/// when a delete was confirmed cannot bring the deleted record back.
#[derive(Debug, Default)]
struct Tombstones {
    reports: HashSet<ReportKey>,
    reviews: HashSet<Id>,
}

impl Tombstones {
    fn apply(&self, collection: &mut ReportCollection) {
        for key in &self.reports {
            collection.remove(key);
        }
        for review_id in &self.reviews {
            collection.remove_review_reports(*review_id);
        }
    }
}

#[derive(Debug, Default)]
struct ListSlot {
    list: ListState,
    deleted: Tombstones,
}

/// Fetch, search and moderate the reports behind one admin screen.
///
/// Mutations are applied to the in-memory collection only after the server
/// confirms them. A failed call leaves the collection untouched.
pub struct ModerationListController<A, C> {
    api: A,
    credentials: C,
    screen: ModerationScreen,
    slot: RwLock<ListSlot>,
    fetches: InFlight<()>,
    mount: Mount,
    #[cfg(feature = "emitter")]
    events: ModerationEvents,
}

impl<A: ApiClient, C: CredentialProvider> ModerationListController<A, C> {
    /// Create an idle controller for `screen`. Nothing is fetched until [`fetch`](Self::fetch).
    pub fn new(api: A, credentials: C, screen: ModerationScreen) -> Self {
        Self {
            api,
            credentials,
            screen,
            slot: RwLock::new(ListSlot::default()),
            fetches: InFlight::new(),
            mount: Mount::new(),
            #[cfg(feature = "emitter")]
            events: ModerationEvents::new(),
        }
    }

    /// The screen this controller backs.
    pub fn screen(&self) -> ModerationScreen {
        self.screen
    }

    /// Handle the host view fires when it is torn down.
    pub fn unmount_handle(&self) -> UnmountHandle {
        self.mount.handle()
    }

    /// Navigation events raised by this screen's rows.
    #[cfg(feature = "emitter")]
    pub fn events(&self) -> &ModerationEvents {
        &self.events
    }

    /// Snapshot of the current list state.
    pub fn state(&self) -> ClientResult<ListState> {
        Ok(self.read("read state")?.list.clone())
    }

    /// Load the report list. A fetch overtaken by a newer fetch is discarded.
    pub async fn fetch(&self) -> ClientResult<ReportCounts> {
        self.mount.ensure_mounted()?;
        let ticket = self.fetches.begin(())?;
        self.set_list(ListState::Loading)?;

        let response = self
            .api
            .send(ApiRequest::get(routes::ADMIN_REPORTS).with_token(self.credentials.token()))
            .await;

        self.mount.ensure_mounted()?;
        if !self.fetches.is_current(&ticket)? {
            warn!("discarding superseded report fetch");
            return Err(ClientError::Superseded("report list".into()));
        }

        match response {
            Ok(raw) => {
                let mut collection = aggregate(&raw);
                let mut slot = self.write("fetch")?;
                slot.deleted.apply(&mut collection);
                let counts = collection.counts();
                slot.list = ListState::Ready(collection);
                debug!(products = counts.products, reviews = counts.reviews, "reports loaded");
                Ok(counts)
            }
            Err(err) => {
                let err = ClientError::from(err);
                warn!(error = %err, "report fetch failed");
                self.set_list(ListState::Error(err.to_string()))?;
                Err(err)
            }
        }
    }

    /// Non-destructive keyword projection over the loaded collection.
    ///
    /// Empty when nothing is loaded. The keyword is trimmed before matching,
    /// the same way review search treats it, so a blank keyword returns
    /// everything.
    pub fn search(&self, keyword: &str) -> ClientResult<ReportCollection> {
        Ok(self
            .read("search")?
            .list
            .collection()
            .map(|collection| collection.filter(keyword))
            .unwrap_or_default())
    }

    /// The rows this screen renders, filtered by `keyword`.
    pub fn visible(&self, keyword: &str) -> ClientResult<Vec<ReportRecord>> {
        let kind = self.screen.kind();
        Ok(self
            .search(keyword)?
            .records()
            .into_iter()
            .filter(|record| record.kind() == kind)
            .collect())
    }

    /// Badge counts for both partitions; zero until loaded.
    pub fn counts(&self) -> ClientResult<ReportCounts> {
        Ok(self
            .read("counts")?
            .list
            .collection()
            .map(ReportCollection::counts)
            .unwrap_or_default())
    }

    /// Look up one loaded report by `(kind, id)`.
    pub fn get(&self, key: &ReportKey) -> ClientResult<Option<ReportRecord>> {
        Ok(self
            .read("get")?
            .list
            .collection()
            .and_then(|collection| collection.get(key).cloned()))
    }

    /// Delete one report, then remove exactly that record.
    ///
    /// Returns the deleted record as it was listed when the call started.
    pub async fn delete(&self, key: ReportKey) -> ClientResult<Option<ReportRecord>> {
        self.mount.ensure_mounted()?;
        let listed = {
            let slot = self.read("delete")?;
            let collection = slot.list.collection().ok_or(ClientError::NotReady)?;
            collection.get(&key).cloned()
        };
        let token = self.require_token()?;

        self.api
            .send(ApiRequest::delete(routes::admin_report(key)).with_token(Some(token)))
            .await
            .map_err(|err| self.failed("delete report", err.into()))?;

        self.mount.ensure_mounted()?;
        let removed = self.reconcile(|slot| {
            slot.deleted.reports.insert(key);
            slot.list
                .collection_mut()
                .and_then(|collection| collection.remove(&key))
        })?;
        info!(%key, removed = removed.is_some(), "report deleted");
        Ok(removed.or(listed))
    }

    /// Delete a reported review, then drop every report filed against it.
    pub async fn delete_review(&self, review_id: Id) -> ClientResult<Vec<ReportRecord>> {
        self.mount.ensure_mounted()?;
        let listed: Vec<ReportRecord> = self
            .read("delete review")?
            .list
            .collection()
            .map(|collection| {
                collection
                    .reports_for_review(review_id)
                    .into_iter()
                    .cloned()
                    .map(ReportRecord::Review)
                    .collect()
            })
            .unwrap_or_default();
        let token = self.require_token()?;

        self.api
            .send(ApiRequest::delete(routes::admin_review(review_id)).with_token(Some(token)))
            .await
            .map_err(|err| self.failed("delete review", err.into()))?;

        self.mount.ensure_mounted()?;
        let removed = self.reconcile(|slot| {
            slot.deleted.reviews.insert(review_id);
            slot.list
                .collection_mut()
                .map(|collection| collection.remove_review_reports(review_id))
        })?;
        let removed = removed.unwrap_or(listed);
        info!(review_id, reports = removed.len(), "review deleted");
        Ok(removed)
    }

    /// Suspend a user. Their reports stay listed until deleted.
    pub async fn suspend_user(&self, user_id: Id) -> ClientResult<()> {
        self.mount.ensure_mounted()?;
        let token = self.require_token()?;

        self.api
            .send(ApiRequest::put(routes::admin_user_suspend(user_id)).with_token(Some(token)))
            .await
            .map_err(|err| self.failed("suspend user", err.into()))?;

        self.mount.ensure_mounted()?;
        info!(user_id, "user suspended");
        Ok(())
    }

    /// Mark a report resolved. The record stays listed until deleted.
    pub async fn resolve_report(&self, key: ReportKey) -> ClientResult<()> {
        self.mount.ensure_mounted()?;
        let token = self.require_token()?;

        self.api
            .send(ApiRequest::put(routes::admin_report_resolve(key)).with_token(Some(token)))
            .await
            .map_err(|err| self.failed("resolve report", err.into()))?;

        self.mount.ensure_mounted()?;
        info!(%key, "report resolved");
        Ok(())
    }

    #[cfg(feature = "emitter")]
    pub fn open_product(&self, product_id: Id) -> ClientResult<()> {
        self.events.navigate(NavigationTarget::Product { product_id })
    }

    #[cfg(feature = "emitter")]
    pub fn open_review(&self, review_id: Id) -> ClientResult<()> {
        self.events.navigate(NavigationTarget::Review { review_id })
    }

    /// Ask the host to open the entity behind a report row.
    ///
    /// Returns `false` when the report is not in the loaded collection.
    #[cfg(feature = "emitter")]
    pub fn open_report(&self, key: &ReportKey) -> ClientResult<bool> {
        let target = match self.get(key)? {
            Some(ReportRecord::Product(report)) => NavigationTarget::Product {
                product_id: report.product_id,
            },
            Some(ReportRecord::Review(report)) => NavigationTarget::Review {
                review_id: report.review_id,
            },
            None => return Ok(false),
        };
        self.events.navigate(target)?;
        Ok(true)
    }

    fn require_token(&self) -> ClientResult<String> {
        self.credentials
            .token()
            .ok_or_else(|| {
                ClientError::Unauthorized("moderation requires a signed-in admin".into())
            })
    }

    fn set_list(&self, next: ListState) -> ClientResult<()> {
        self.write("write state")?.list = next;
        Ok(())
    }

    /// Record a confirmed deletion and apply it to the loaded collection.
    fn reconcile<T>(&self, apply: impl FnOnce(&mut ListSlot) -> T) -> ClientResult<T> {
        let mut slot = self.write("reconcile")?;
        Ok(apply(&mut *slot))
    }

    fn failed(&self, action: &'static str, err: ClientError) -> ClientError {
        warn!(action, error = %err, "moderation request failed");
        err
    }

    fn read(&self, operation: &'static str) -> ClientResult<RwLockReadGuard<'_, ListSlot>> {
        self.slot
            .read()
            .map_err(|_| ClientError::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> ClientResult<RwLockWriteGuard<'_, ListSlot>> {
        self.slot
            .write()
            .map_err(|_| ClientError::LockPoisoned(operation))
    }
}
