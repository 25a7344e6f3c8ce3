//! Post entity for SeaORM.
//!
//! `tags` and `likes` are stored as JSON arrays, keeping the document
//! shape of the data model (likes are a set of user ids).

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::PostStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub excerpt: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub author_id: Uuid,
    pub featured_image: String,
    pub tags: Json,
    pub status: String,
    pub views: i64,
    pub likes: Json,
    pub read_time: i32,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            excerpt: model.excerpt,
            slug: model.slug,
            author_id: model.author_id,
            featured_image: model.featured_image,
            tags: serde_json::from_value(model.tags).unwrap_or_default(),
            status: PostStatus::parse(&model.status).unwrap_or(PostStatus::Draft),
            views: model.views,
            likes: serde_json::from_value(model.likes).unwrap_or_default(),
            read_time: model.read_time,
            published_at: model.published_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            slug: Set(post.slug),
            author_id: Set(post.author_id),
            featured_image: Set(post.featured_image),
            tags: Set(serde_json::to_value(&post.tags).unwrap_or(Json::Null)),
            status: Set(post.status.as_str().to_string()),
            views: Set(post.views),
            likes: Set(serde_json::to_value(&post.likes).unwrap_or(Json::Null)),
            read_time: Set(post.read_time),
            published_at: Set(post.published_at.map(Into::into)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
