//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;

pub use comment::Comment;
pub use post::{NewPost, Post, PostStatus, PostUpdate};
pub use user::{Role, User};

use uuid::Uuid;

/// Toggle membership of `id` in a like set.
/// Returns `true` when the id is a member after the toggle.
pub(crate) fn toggle_like_set(likes: &mut Vec<Uuid>, id: Uuid) -> bool {
    if let Some(pos) = likes.iter().position(|l| *l == id) {
        likes.remove(pos);
        false
    } else {
        likes.push(id);
        true
    }
}
