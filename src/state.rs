use std::sync::Arc;

use bb8::Pool;
use bb8_redis::RedisConnectionManager;

use crate::{config::Config, db::RatingStore};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: SharedStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn max_commit_retries(&self) -> u32 {
        self.config.max_commit_retries
    }
}

pub type SharedStore = Arc<dyn RatingStore>;

pub type RedisClient = Pool<RedisConnectionManager>;
