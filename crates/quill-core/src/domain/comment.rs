use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - attached to a post, owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(content: String, post_id: Uuid, author_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content,
            post_id,
            author_id,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.updated_at = Utc::now();
    }

    /// Toggle this user's like. Returns the liked state after the toggle.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        let liked = super::toggle_like_set(&mut self.likes, user_id);
        self.updated_at = Utc::now();
        liked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_toggle_round_trips() {
        let mut comment = Comment::new("nice".to_string(), Uuid::new_v4(), Uuid::new_v4());
        let user = Uuid::new_v4();
        assert!(comment.toggle_like(user));
        assert!(!comment.toggle_like(user));
        assert!(comment.likes.is_empty());
    }
}
