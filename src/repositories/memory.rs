use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        comments::Comment,
        roadmap::{RoadmapFilter, RoadmapItem, RoadmapSort, UpvoteOutcome},
        users::User,
    },
    repositories::{CommentStore, RoadmapItemStore, UserStore},
};

/// In-process backend keyed by id. Each method touches one map entry at a
/// time, never holding a guard across another lookup.
#[derive(Default)]
pub struct MemoryStore {
    comments: DashMap<Uuid, Comment>,
    items: DashMap<Uuid, RoadmapItem>,
    users: DashMap<Uuid, User>,
    user_emails: DashMap<String, Uuid>,
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
        Ok(self.comments.get(&comment_id).map(|entry| entry.clone()))
    }

    async fn list_comments_for_item(&self, item_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let mut comments = self
            .comments
            .iter()
            .filter(|entry| entry.roadmap_item_id == item_id)
            .map(|entry| entry.clone())
            .collect::<Vec<_>>();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        match self.comments.entry(comment.id) {
            Entry::Occupied(_) => Err(AppError::Conflict("Comment already exists".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(comment.clone());
                Ok(())
            }
        }
    }

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>, AppError> {
        Ok(self.comments.get_mut(&comment_id).map(|mut entry| {
            entry.content = content.to_string();
            entry.updated_at = updated_at;
            entry.clone()
        }))
    }

    async fn append_reply_id(&self, parent_id: Uuid, reply_id: Uuid) -> Result<bool, AppError> {
        let Some(mut parent) = self.comments.get_mut(&parent_id) else {
            return Ok(false);
        };
        if !parent.reply_ids.contains(&reply_id) {
            parent.reply_ids.push(reply_id);
        }
        Ok(true)
    }

    async fn remove_reply_id(&self, parent_id: Uuid, reply_id: Uuid) -> Result<(), AppError> {
        if let Some(mut parent) = self.comments.get_mut(&parent_id) {
            parent.reply_ids.retain(|id| *id != reply_id);
        }
        Ok(())
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
        Ok(self.comments.remove(&comment_id).map(|(_, comment)| comment))
    }
}

#[async_trait]
impl RoadmapItemStore for MemoryStore {
    async fn list_items(&self, filter: RoadmapFilter) -> Result<Vec<RoadmapItem>, AppError> {
        let mut items = self
            .items
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.clone())
            .collect::<Vec<_>>();
        items.sort_by(|a, b| {
            let by_votes = match filter.sort {
                RoadmapSort::Upvotes => b.upvotes.len().cmp(&a.upvotes.len()),
                RoadmapSort::Newest => std::cmp::Ordering::Equal,
            };
            by_votes
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(items)
    }

    async fn find_item(&self, item_id: Uuid) -> Result<Option<RoadmapItem>, AppError> {
        Ok(self.items.get(&item_id).map(|entry| entry.clone()))
    }

    async fn item_exists(&self, item_id: Uuid) -> Result<bool, AppError> {
        Ok(self.items.contains_key(&item_id))
    }

    async fn insert_items(&self, items: &[RoadmapItem]) -> Result<(), AppError> {
        if items.iter().any(|item| self.items.contains_key(&item.id)) {
            return Err(AppError::Conflict("Roadmap item already exists".to_string()));
        }
        for item in items {
            self.items.insert(item.id, item.clone());
        }
        Ok(())
    }

    async fn toggle_upvote(
        &self,
        item_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UpvoteOutcome>, AppError> {
        let Some(mut item) = self.items.get_mut(&item_id) else {
            return Ok(None);
        };
        let upvoted = match item.upvotes.iter().position(|id| *id == user_id) {
            Some(index) => {
                item.upvotes.remove(index);
                false
            }
            None => {
                item.upvotes.push(user_id);
                true
            }
        };
        Ok(Some(UpvoteOutcome {
            upvotes: item.upvotes.len() as i32,
            upvoted,
        }))
    }

    async fn append_comment_id(&self, item_id: Uuid, comment_id: Uuid) -> Result<bool, AppError> {
        let Some(mut item) = self.items.get_mut(&item_id) else {
            return Ok(false);
        };
        if !item.comment_ids.contains(&comment_id) {
            item.comment_ids.push(comment_id);
        }
        Ok(true)
    }

    async fn remove_comment_id(&self, item_id: Uuid, comment_id: Uuid) -> Result<(), AppError> {
        if let Some(mut item) = self.items.get_mut(&item_id) {
            item.comment_ids.retain(|id| *id != comment_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match self.user_emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict("Email already exists".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(())
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let Some(user_id) = self.user_emails.get(email).map(|entry| *entry) else {
            return Ok(None);
        };
        self.find_user_by_id(user_id).await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&user_id).map(|entry| entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roadmap::{RoadmapCategory, RoadmapStatus};

    fn comment(item_id: Uuid, parent_id: Option<Uuid>) -> Comment {
        let now = Utc::now();
        Comment {
            id: Uuid::now_v7(),
            content: "hello".to_string(),
            author_id: Uuid::new_v4(),
            roadmap_item_id: item_id,
            parent_id,
            depth: 0,
            reply_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn item(title: &str, created_offset_secs: i64) -> RoadmapItem {
        RoadmapItem {
            id: Uuid::now_v7(),
            title: title.to_string(),
            description: "desc".to_string(),
            category: RoadmapCategory::Feature,
            status: RoadmapStatus::Planned,
            upvotes: Vec::new(),
            comment_ids: Vec::new(),
            created_at: Utc::now() + chrono::Duration::seconds(created_offset_secs),
        }
    }

    #[tokio::test]
    async fn append_reply_to_missing_parent_reports_false() {
        let store = MemoryStore::default();
        let appended = store
            .append_reply_id(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        assert!(!appended);
    }

    #[tokio::test]
    async fn append_reply_is_idempotent() {
        let store = MemoryStore::default();
        let parent = comment(Uuid::new_v4(), None);
        store.insert_comment(&parent).await.unwrap();
        let reply_id = Uuid::new_v4();

        assert!(store.append_reply_id(parent.id, reply_id).await.unwrap());
        assert!(store.append_reply_id(parent.id, reply_id).await.unwrap());

        let stored = store.find_comment(parent.id).await.unwrap().unwrap();
        assert_eq!(stored.reply_ids, vec![reply_id]);
    }

    #[tokio::test]
    async fn delete_returns_record_only_once() {
        let store = MemoryStore::default();
        let record = comment(Uuid::new_v4(), None);
        store.insert_comment(&record).await.unwrap();

        let first = store.delete_comment(record.id).await.unwrap();
        let second = store.delete_comment(record.id).await.unwrap();
        assert_eq!(first, Some(record));
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn toggle_upvote_adds_then_removes() {
        let store = MemoryStore::default();
        let target = item("Dark mode", 0);
        store.insert_items(&[target.clone()]).await.unwrap();
        let user_id = Uuid::new_v4();

        let added = store.toggle_upvote(target.id, user_id).await.unwrap().unwrap();
        assert_eq!(added, UpvoteOutcome { upvotes: 1, upvoted: true });

        let removed = store.toggle_upvote(target.id, user_id).await.unwrap().unwrap();
        assert_eq!(removed, UpvoteOutcome { upvotes: 0, upvoted: false });

        assert!(store.toggle_upvote(Uuid::new_v4(), user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_items_sorts_by_upvotes_then_newest() {
        let store = MemoryStore::default();
        let older = item("older", -60);
        let newer = item("newer", 0);
        store
            .insert_items(&[older.clone(), newer.clone()])
            .await
            .unwrap();
        store.toggle_upvote(older.id, Uuid::new_v4()).await.unwrap();

        let newest_first = store.list_items(RoadmapFilter::default()).await.unwrap();
        assert_eq!(newest_first[0].id, newer.id);

        let by_votes = store
            .list_items(RoadmapFilter {
                sort: RoadmapSort::Upvotes,
                ..RoadmapFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_votes[0].id, older.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::default();
        let user = User {
            id: Uuid::new_v4(),
            email: "dev@example.com".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        };
        store.insert_user(&user).await.unwrap();
        let duplicate = User {
            id: Uuid::new_v4(),
            ..user.clone()
        };

        let result = store.insert_user(&duplicate).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        let found = store
            .find_user_by_email("dev@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
    }
}
