//! Item model and in-memory item store.
//!
//! Items are the content records shown on the front end. The item list is
//! fixed at startup; comments are appended as they are accepted.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::{ContentMeta, EditRequest, Editable};

/// Model identity used for permission names (`content.change_item`).
pub const ITEM_META: ContentMeta = ContentMeta::new("content", "item");

/// Item record (content record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    pub title: String,

    pub body: String,

    /// Owner. Owned items are editable by their owner and by admins only.
    pub author_id: Option<Uuid>,

    /// Unix timestamp when created.
    pub created: i64,
}

impl Item {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            body: body.into(),
            author_id: None,
            created: chrono::Utc::now().timestamp(),
        }
    }

    /// Set the owner.
    pub fn with_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }
}

impl Editable for Item {
    fn meta(&self) -> ContentMeta {
        ITEM_META
    }

    fn editable_by(&self, request: &EditRequest<'_>) -> Option<bool> {
        let author_id = self.author_id?;
        let user = request.user;
        Some(
            user.is_authenticated()
                && user.is_active()
                && (user.is_admin || user.id == author_id),
        )
    }
}

/// An accepted comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    pub body: String,
    pub created: i64,
}

/// Items plus their comments.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Arc<Vec<Item>>,
    comments: Arc<DashMap<Uuid, Vec<Comment>>>,
}

impl ItemStore {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Arc::new(items),
            comments: Arc::new(DashMap::new()),
        }
    }

    /// All items in listing order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn add_comment(&self, item_id: Uuid, comment: Comment) {
        self.comments.entry(item_id).or_default().push(comment);
    }

    /// Comments on an item, oldest first.
    pub fn comments(&self, item_id: Uuid) -> Vec<Comment> {
        self.comments
            .get(&item_id)
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}
