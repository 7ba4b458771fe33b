//! Entities, request bodies and list filters

mod content_type;
mod contact;
pub mod enums;
mod media;
mod patch;
mod post;
mod setting;
mod tag;
mod user;
mod validation;

pub use contact::{ContactFilter, ContactSubmission, CreateContact, NewContact, UpdateContact};
pub use content_type::{ContentType, ContentTypeFilter, CreateContentType, UpdateContentType};
pub use enums::{CodedEnum, ContactStatus, FileType, MediaRole, PostStatus, UnknownVariant, UserRole};
pub use media::{AttachMedia, CreateMedia, Media, MediaFilter, PostMedia, UpdateMedia};
pub use patch::Patch;
pub use post::{CreatePost, Post, PostDetail, PostFilter, PostSummary, UpdatePost};
pub use setting::{CreateSetting, Setting, SettingFilter, UpdateSetting};
pub use tag::{CreateTag, Tag, TagFilter, UpdateTag};
pub use user::Author;
pub use validation::ValidationErrors;
