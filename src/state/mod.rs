pub(crate) mod autosave;

use crate::api::TableClient;
use crate::identity::resolve_identity;
use crate::models::SnapshotRecord;
use crate::storage::{load_json_from_storage, SNAPSHOT_CACHE_KEY};
use leptos::prelude::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub client: RwSignal<TableClient>,

    /// Identity token, resolved once at startup and carried as configuration.
    pub identity: String,

    /// Snapshot feed for the identity, refreshed after each successful save.
    /// Seeded from the local cache so the list renders before the first fetch.
    pub snapshots: RwSignal<Vec<SnapshotRecord>>,
    pub snapshots_loading: RwSignal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        let client = TableClient::from_env();
        let identity = resolve_identity();
        let cached: Vec<SnapshotRecord> =
            load_json_from_storage(SNAPSHOT_CACHE_KEY).unwrap_or_default();

        Self {
            client: RwSignal::new(client),
            identity,
            snapshots: RwSignal::new(cached),
            snapshots_loading: RwSignal::new(false),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
