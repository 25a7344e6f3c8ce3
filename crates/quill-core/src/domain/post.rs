use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub tags: Vec<String>,
    pub status: PostStatus,
}

/// Partial update of a post. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

/// Post entity.
///
/// The slug is derived from the title and is stable unless the title changes.
/// `published_at` is set on the first transition to `Published` and never
/// again. Likes are a set of user ids; the reported count is the set size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub author_id: Uuid,
    pub featured_image: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub views: i64,
    pub likes: Vec<Uuid>,
    pub read_time: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a post, deriving slug, excerpt and read time.
    pub fn new(input: NewPost, author_id: Uuid) -> Self {
        let now = Utc::now();
        let slug = derive_slug(&input.title, now);
        let excerpt = match input.excerpt {
            Some(e) if !e.is_empty() => e,
            _ => derive_excerpt(&input.content),
        };
        let read_time = derive_read_time(&input.content);
        let published_at = match input.status {
            PostStatus::Published => Some(now),
            PostStatus::Draft => None,
        };

        Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            excerpt,
            slug,
            author_id,
            featured_image: input.featured_image.unwrap_or_default(),
            tags: input.tags,
            status: input.status,
            views: 0,
            likes: Vec::new(),
            read_time,
            published_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, re-deriving the dependent fields.
    pub fn apply(&mut self, update: PostUpdate) {
        let now = Utc::now();

        if let Some(title) = update.title {
            if title != self.title {
                self.slug = derive_slug(&title, now);
            }
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(excerpt) = update.excerpt {
            self.excerpt = excerpt;
        }
        if self.excerpt.is_empty() {
            self.excerpt = derive_excerpt(&self.content);
        }
        self.read_time = derive_read_time(&self.content);
        if let Some(image) = update.featured_image {
            self.featured_image = image;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(status) = update.status {
            self.set_status(status, now);
        }
        self.updated_at = now;
    }

    /// Flip between draft and published.
    pub fn toggle_publish(&mut self) {
        let next = match self.status {
            PostStatus::Published => PostStatus::Draft,
            PostStatus::Draft => PostStatus::Published,
        };
        self.set_status(next, Utc::now());
        self.updated_at = Utc::now();
    }

    fn set_status(&mut self, status: PostStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == PostStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }

    /// Toggle this user's like. Returns the liked state after the toggle.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        let liked = super::toggle_like_set(&mut self.likes, user_id);
        self.updated_at = Utc::now();
        liked
    }

    /// Record one successful public fetch.
    pub fn record_view(&mut self) {
        self.views += 1;
    }
}

/// URL-safe slug from a title plus a millisecond timestamp for uniqueness.
fn derive_slug(title: &str, now: DateTime<Utc>) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    format!("{}-{}", slug, now.timestamp_millis())
}

/// Content stripped of markup, truncated to 150 characters plus an ellipsis.
fn derive_excerpt(content: &str) -> String {
    let mut stripped = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }
    let truncated: String = stripped.chars().take(150).collect();
    format!("{}...", truncated)
}

/// Estimated reading time in minutes at 200 words per minute, minimum 1.
fn derive_read_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    (words.div_ceil(200)).max(1) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> Post {
        Post::new(
            NewPost {
                title: title.to_string(),
                content: content.to_string(),
                excerpt: None,
                featured_image: None,
                tags: vec![],
                status: PostStatus::Draft,
            },
            Uuid::new_v4(),
        )
    }

    #[test]
    fn slug_is_lowercase_and_url_safe() {
        let post = draft("Hello, World! Again", "body");
        let stem = post.slug.rsplit_once('-').unwrap().0;
        assert_eq!(stem, "hello-world-again");
    }

    #[test]
    fn excerpt_strips_markup_and_truncates() {
        let content = format!("<p>{}</p>", "a".repeat(200));
        let post = draft("t", &content);
        assert_eq!(post.excerpt.len(), 153);
        assert!(post.excerpt.ends_with("..."));
        assert!(!post.excerpt.contains('<'));
    }

    #[test]
    fn explicit_excerpt_is_kept() {
        let post = Post::new(
            NewPost {
                title: "t".to_string(),
                content: "content".to_string(),
                excerpt: Some("hand-written".to_string()),
                featured_image: None,
                tags: vec![],
                status: PostStatus::Draft,
            },
            Uuid::new_v4(),
        );
        assert_eq!(post.excerpt, "hand-written");
    }

    #[test]
    fn read_time_is_ceiling_of_word_count() {
        let post = draft("t", &"word ".repeat(201));
        assert_eq!(post.read_time, 2);
        let short = draft("t", "just a few words");
        assert_eq!(short.read_time, 1);
    }

    #[test]
    fn first_publish_sets_published_at_once() {
        let mut post = draft("t", "body");
        assert!(post.published_at.is_none());

        post.toggle_publish();
        let first = post.published_at.expect("set on first publish");

        post.toggle_publish(); // unpublish
        assert_eq!(post.status, PostStatus::Draft);
        post.toggle_publish(); // republish
        assert_eq!(post.published_at, Some(first));
    }

    #[test]
    fn created_published_gets_timestamp_immediately() {
        let post = Post::new(
            NewPost {
                title: "t".to_string(),
                content: "body".to_string(),
                excerpt: None,
                featured_image: None,
                tags: vec![],
                status: PostStatus::Published,
            },
            Uuid::new_v4(),
        );
        assert!(post.published_at.is_some());
    }

    #[test]
    fn like_toggle_is_idempotent_per_pair() {
        let mut post = draft("t", "body");
        let user = Uuid::new_v4();
        assert!(post.toggle_like(user));
        assert_eq!(post.likes.len(), 1);
        assert!(!post.toggle_like(user));
        assert!(post.likes.is_empty());
    }

    #[test]
    fn update_rederives_slug_only_on_title_change() {
        let mut post = draft("Original Title", "body");
        let slug = post.slug.clone();

        post.apply(PostUpdate {
            content: Some("new body".to_string()),
            ..Default::default()
        });
        assert_eq!(post.slug, slug);

        post.apply(PostUpdate {
            title: Some("Different Title".to_string()),
            ..Default::default()
        });
        assert_ne!(post.slug, slug);
        assert!(post.slug.starts_with("different-title-"));
    }
}
