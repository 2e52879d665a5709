use crate::config::JournalConfig;
use crate::store::JournalStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: JournalStore,
    pub config: JournalConfig,
}

impl AppState {
    pub fn new(config: JournalConfig) -> Self {
        Self {
            store: JournalStore::new(),
            config,
        }
    }
}
