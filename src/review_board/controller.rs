use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{CommentPayload, CommentRecord, ReviewRecord};
use crate::api::{
    decode_list, routes, ApiClient, ApiRequest, CredentialProvider, HttpError,
};
use crate::error::{ClientError, ClientResult};
use crate::ids::Id;
use crate::inflight::InFlight;
use crate::lifecycle::{Mount, UnmountHandle};

#[derive(Debug, Default)]
struct BoardState {
    product_id: Option<Id>,
    reviews: Vec<ReviewRecord>,
    comments: HashMap<Id, Vec<CommentRecord>>,
    /// Reviews this board deleted; a list response still in flight may carry them.
    deleted: HashSet<Id>,
}

impl BoardState {
    fn has_review(&self, review_id: Id) -> bool {
        self.reviews.iter().any(|review| review.review_id == review_id)
    }

    /// Replace the review list; comment threads of reviews that left the board go with them.
    fn replace_reviews(&mut self, reviews: Vec<ReviewRecord>) {
        let mut seen = HashSet::new();
        let deleted = &self.deleted;
        self.reviews = reviews
            .into_iter()
            .filter(|review| !deleted.contains(&review.review_id))
            .filter(|review| seen.insert(review.review_id))
            .collect();
        self.comments.retain(|review_id, _| seen.contains(review_id));
    }

    fn find_comment(&self, comment_id: Id) -> Option<&CommentRecord> {
        self.comments
            .values()
            .flat_map(|thread| thread.iter())
            .find(|comment| comment.comment_id == comment_id)
    }
}

/// Reviews of one product with lazily loaded comment threads.
///
/// Review search replaces the list (a reload restores it). Comment threads
/// are cached per review; a failure on one thread never touches another.
pub struct ReviewBoardController<A, C> {
    api: A,
    credentials: C,
    state: RwLock<BoardState>,
    review_loads: InFlight<()>,
    comment_loads: InFlight<Id>,
    mount: Mount,
}

impl<A: ApiClient, C: CredentialProvider> ReviewBoardController<A, C> {
    /// Create an empty board.
    pub fn new(api: A, credentials: C) -> Self {
        Self {
            api,
            credentials,
            state: RwLock::new(BoardState::default()),
            review_loads: InFlight::new(),
            comment_loads: InFlight::new(),
            mount: Mount::new(),
        }
    }

    /// Handle the host view fires when it is torn down.
    pub fn unmount_handle(&self) -> UnmountHandle {
        self.mount.handle()
    }

    /// Product whose reviews were last loaded.
    pub fn product_id(&self) -> ClientResult<Option<Id>> {
        Ok(self.read("product id")?.product_id)
    }

    /// Reviews currently on the board, in server order.
    pub fn reviews(&self) -> ClientResult<Vec<ReviewRecord>> {
        Ok(self.read("reviews")?.reviews.clone())
    }

    /// One review on the board.
    pub fn review(&self, review_id: Id) -> ClientResult<Option<ReviewRecord>> {
        Ok(self
            .read("review")?
            .reviews
            .iter()
            .find(|review| review.review_id == review_id)
            .cloned())
    }

    /// Cached thread for `review_id`; empty when not loaded or the review is gone.
    pub fn comments(&self, review_id: Id) -> ClientResult<Vec<CommentRecord>> {
        Ok(self
            .read("comments")?
            .comments
            .get(&review_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Whether a thread for `review_id` is cached.
    pub fn comments_loaded(&self, review_id: Id) -> ClientResult<bool> {
        Ok(self.read("comments loaded")?.comments.contains_key(&review_id))
    }

    /// Fetch the reviews of `product_id`, replacing the board.
    pub async fn load_reviews(&self, product_id: Id) -> ClientResult<Vec<ReviewRecord>> {
        self.mount.ensure_mounted()?;
        let ticket = self.review_loads.begin(())?;

        let response = self
            .api
            .send(
                ApiRequest::get(routes::product_reviews(product_id))
                    .with_token(self.credentials.token()),
            )
            .await;

        self.settle(self.review_loads.is_current(&ticket)?, "review list")?;
        let body = self.checked(response, "load reviews")?;
        let reviews: Vec<ReviewRecord> = decode_list(body, "reviews")?;

        let mut state = self.write("load reviews")?;
        state.product_id = Some(product_id);
        state.replace_reviews(reviews);
        debug!(product_id, reviews = state.reviews.len(), "reviews loaded");
        Ok(state.reviews.clone())
    }

    /// Server-side review search. The result replaces the current list.
    ///
    /// A blank keyword sends nothing and returns the current list.
    pub async fn search_reviews(&self, keyword: &str) -> ClientResult<Vec<ReviewRecord>> {
        self.mount.ensure_mounted()?;
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.reviews();
        }
        let ticket = self.review_loads.begin(())?;

        let response = self
            .api
            .send(
                ApiRequest::get(routes::REVIEW_SEARCH)
                    .with_query("keyword", keyword)
                    .with_token(self.credentials.token()),
            )
            .await;

        self.settle(self.review_loads.is_current(&ticket)?, "review search")?;
        let body = self.checked(response, "search reviews")?;
        let reviews: Vec<ReviewRecord> = decode_list(body, "reviews")?;

        let mut state = self.write("search reviews")?;
        state.replace_reviews(reviews);
        debug!(keyword, hits = state.reviews.len(), "review search applied");
        Ok(state.reviews.clone())
    }

    /// Fetch the comment thread of one review.
    ///
    /// When called again before an earlier call for the same review resolves,
    /// only the latest call is applied; the earlier one yields `Superseded`.
    pub async fn load_comments(&self, review_id: Id) -> ClientResult<Vec<CommentRecord>> {
        self.mount.ensure_mounted()?;
        let ticket = self.comment_loads.begin(review_id)?;

        let response = self
            .api
            .send(
                ApiRequest::get(routes::review_comments(review_id))
                    .with_token(self.credentials.token()),
            )
            .await;

        self.settle(
            self.comment_loads.is_current(&ticket)?,
            &format!("comments of review {}", review_id),
        )?;
        let body = self.checked(response, "load comments")?;
        let fetched: Vec<CommentRecord> = decode_list(body, "comments")?;

        let total = fetched.len();
        let thread: Vec<CommentRecord> = fetched
            .into_iter()
            .filter(|comment| comment.review_id == review_id)
            .collect();
        if thread.len() != total {
            warn!(
                review_id,
                dropped = total - thread.len(),
                "dropped comments of other reviews"
            );
        }

        let mut state = self.write("load comments")?;
        if !state.has_review(review_id) {
            state.comments.remove(&review_id);
            warn!(review_id, "comments fetched for a review no longer on the board");
            return Err(ClientError::NotFound(format!(
                "review {} is not on the board",
                review_id
            )));
        }
        state.comments.insert(review_id, thread.clone());
        debug!(review_id, comments = thread.len(), "comments loaded");
        Ok(thread)
    }

    /// Read one comment, e.g. to prefill an edit form. Nothing is cached.
    pub async fn fetch_comment(&self, comment_id: Id) -> ClientResult<CommentRecord> {
        self.mount.ensure_mounted()?;
        let body = self
            .api
            .send(
                ApiRequest::get(routes::comment_detail(comment_id))
                    .with_token(self.credentials.token()),
            )
            .await
            .map_err(|err| self.failed("fetch comment", err.into()))?;

        let comment: CommentRecord = serde_json::from_value(body)
            .map_err(|e| ClientError::MalformedResponse(format!("comment: {}", e)))?;
        if comment.comment_id != comment_id {
            return Err(ClientError::NotFound(format!("comment {}", comment_id)));
        }
        Ok(comment)
    }

    /// Post a comment, then append it to that review's thread.
    ///
    /// Returns the reconciled thread. When the server does not echo the new
    /// comment, or the thread was never loaded, the thread is re-fetched.
    pub async fn add_comment(
        &self,
        review_id: Id,
        content: &str,
    ) -> ClientResult<Vec<CommentRecord>> {
        self.mount.ensure_mounted()?;
        let content = non_blank(content)?;
        let (token, user_id) = self.require_session()?;
        let review = self
            .review(review_id)?
            .ok_or_else(|| ClientError::NotFound(format!("review {}", review_id)))?;

        let payload = CommentPayload {
            user_id,
            product_id: review.product_id,
            review_id,
            comment_content: content.to_string(),
        };
        let body = self
            .api
            .send(
                ApiRequest::post(routes::COMMENTS, to_body(&payload)?).with_token(Some(token)),
            )
            .await
            .map_err(|err| self.failed("add comment", err.into()))?;
        self.mount.ensure_mounted()?;

        let created = serde_json::from_value::<CommentRecord>(body)
            .ok()
            .filter(|comment| comment.review_id == review_id);

        if let Some(comment) = created {
            self.comment_loads.supersede(review_id)?;
            let mut state = self.write("add comment")?;
            if let Some(thread) = state.comments.get_mut(&review_id) {
                thread.retain(|existing| existing.comment_id != comment.comment_id);
                thread.push(comment);
                info!(review_id, "comment added");
                return Ok(thread.clone());
            }
        }

        info!(review_id, "comment added, refreshing thread");
        self.load_comments(review_id).await
    }

    /// Edit a comment, then replace it in place within its thread.
    pub async fn edit_comment(&self, comment_id: Id, content: &str) -> ClientResult<CommentRecord> {
        self.mount.ensure_mounted()?;
        let content = non_blank(content)?;
        let (token, user_id) = self.require_session()?;
        let existing = self.known_comment(comment_id)?;

        let payload = CommentPayload {
            user_id,
            product_id: existing.product_id,
            review_id: existing.review_id,
            comment_content: content.to_string(),
        };
        let body = self
            .api
            .send(
                ApiRequest::put(routes::comment(comment_id))
                    .with_body(to_body(&payload)?)
                    .with_token(Some(token)),
            )
            .await
            .map_err(|err| self.failed("edit comment", err.into()))?;
        self.mount.ensure_mounted()?;

        let updated = serde_json::from_value::<CommentRecord>(body)
            .ok()
            .filter(|comment| {
                comment.comment_id == comment_id && comment.review_id == existing.review_id
            })
            .unwrap_or_else(|| CommentRecord {
                comment_content: content.to_string(),
                ..existing.clone()
            });

        self.comment_loads.supersede(existing.review_id)?;
        let mut state = self.write("edit comment")?;
        if let Some(slot) = state
            .comments
            .get_mut(&existing.review_id)
            .and_then(|thread| {
                thread
                    .iter_mut()
                    .find(|comment| comment.comment_id == comment_id)
            })
        {
            *slot = updated.clone();
        }
        info!(comment_id, review_id = existing.review_id, "comment edited");
        Ok(updated)
    }

    /// Delete a comment, then remove it from its thread.
    pub async fn delete_comment(&self, comment_id: Id) -> ClientResult<CommentRecord> {
        self.mount.ensure_mounted()?;
        let (token, user_id) = self.require_session()?;
        let existing = self.known_comment(comment_id)?;

        let payload = CommentPayload {
            user_id,
            product_id: existing.product_id,
            review_id: existing.review_id,
            comment_content: existing.comment_content.clone(),
        };
        self.api
            .send(
                ApiRequest::delete(routes::comment(comment_id))
                    .with_query("userId", user_id.to_string())
                    .with_body(to_body(&payload)?)
                    .with_token(Some(token)),
            )
            .await
            .map_err(|err| self.failed("delete comment", err.into()))?;
        self.mount.ensure_mounted()?;

        self.comment_loads.supersede(existing.review_id)?;
        let mut state = self.write("delete comment")?;
        if let Some(thread) = state.comments.get_mut(&existing.review_id) {
            thread.retain(|comment| comment.comment_id != comment_id);
        }
        info!(comment_id, review_id = existing.review_id, "comment deleted");
        Ok(existing)
    }

    /// Delete a review, then drop it and its cached thread from the board.
    ///
    /// Review lists that land afterwards, including loads already in flight,
    /// never bring it back.
    pub async fn delete_review(&self, review_id: Id) -> ClientResult<Option<ReviewRecord>> {
        self.mount.ensure_mounted()?;
        let (token, _) = self.require_session()?;

        self.api
            .send(ApiRequest::delete(routes::review(review_id)).with_token(Some(token)))
            .await
            .map_err(|err| self.failed("delete review", err.into()))?;
        self.mount.ensure_mounted()?;

        self.comment_loads.supersede(review_id)?;
        let mut state = self.write("delete review")?;
        state.deleted.insert(review_id);
        let removed = state
            .reviews
            .iter()
            .position(|review| review.review_id == review_id)
            .map(|index| state.reviews.remove(index));
        state.comments.remove(&review_id);
        info!(review_id, removed = removed.is_some(), "review deleted");
        Ok(removed)
    }

    fn known_comment(&self, comment_id: Id) -> ClientResult<CommentRecord> {
        self.read("find comment")?
            .find_comment(comment_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("comment {}", comment_id)))
    }

    fn require_session(&self) -> ClientResult<(String, Id)> {
        match (self.credentials.token(), self.credentials.user_id()) {
            (Some(token), Some(user_id)) => Ok((token, user_id)),
            _ => Err(ClientError::Unauthorized(
                "sign in to change reviews and comments".into(),
            )),
        }
    }

    /// Gate applied to every response before it may touch the board.
    fn settle(&self, current: bool, target: &str) -> ClientResult<()> {
        self.mount.ensure_mounted()?;
        if !current {
            warn!(target, "discarding superseded response");
            return Err(ClientError::Superseded(target.to_string()));
        }
        Ok(())
    }

    fn checked(
        &self,
        response: Result<Value, HttpError>,
        action: &'static str,
    ) -> ClientResult<Value> {
        response.map_err(|err| self.failed(action, err.into()))
    }

    fn failed(&self, action: &'static str, err: ClientError) -> ClientError {
        warn!(action, error = %err, "review board request failed");
        err
    }

    fn read(&self, operation: &'static str) -> ClientResult<RwLockReadGuard<'_, BoardState>> {
        self.state
            .read()
            .map_err(|_| ClientError::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> ClientResult<RwLockWriteGuard<'_, BoardState>> {
        self.state
            .write()
            .map_err(|_| ClientError::LockPoisoned(operation))
    }
}

fn non_blank(content: &str) -> ClientResult<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ClientError::Validation("comment content is empty".into()));
    }
    Ok(content)
}

fn to_body(payload: &CommentPayload) -> ClientResult<Value> {
    serde_json::to_value(payload).map_err(|e| ClientError::Validation(e.to_string()))
}
