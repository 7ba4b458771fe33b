//! Application state management

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::Config,
    repository::{
        ContactRepository, ContentTypeRepository, MediaRepository, PostRepository,
        SettingRepository, TagRepository,
    },
};

/// Application state shared across handlers
///
/// Every repository wraps a handle to the same connection pool, so cloning the
/// state per request is cheap.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    content_types: ContentTypeRepository,
    posts: PostRepository,
    media: MediaRepository,
    tags: TagRepository,
    contacts: ContactRepository,
    settings: SettingRepository,
}

impl AppState {
    /// Build the state with one repository per entity over `pool`
    pub fn new(config: Config, pool: PgPool) -> Self {
        Self {
            config: Arc::new(config),
            content_types: ContentTypeRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            media: MediaRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            contacts: ContactRepository::new(pool.clone()),
            settings: SettingRepository::new(pool),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn content_types(&self) -> &ContentTypeRepository {
        &self.content_types
    }

    pub fn posts(&self) -> &PostRepository {
        &self.posts
    }

    pub fn media(&self) -> &MediaRepository {
        &self.media
    }

    pub fn tags(&self) -> &TagRepository {
        &self.tags
    }

    pub fn contacts(&self) -> &ContactRepository {
        &self.contacts
    }

    pub fn settings(&self) -> &SettingRepository {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_lazy;

    #[tokio::test]
    async fn test_state_shares_config() {
        let mut config = Config::default();
        config.service.name = "cms-test".into();
        let pool = connect_lazy(&config.database).unwrap();

        let state = AppState::new(config, pool);
        let cloned = state.clone();
        assert_eq!(cloned.config().service.name, "cms-test");
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
    }
}
