mod api;
mod app;
mod components;
mod format;
mod identity;
mod models;
mod pages;
mod state;
mod storage;

use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::identity::resolve_identity;
    use crate::models::SnapshotRecord;
    use crate::storage::{
        load_json_from_storage, load_string_from_storage, remove_from_storage,
        save_json_to_storage, IDENTITY_KEY, SNAPSHOT_CACHE_KEY,
    };
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_identity_is_created_once_and_stable() {
        remove_from_storage(IDENTITY_KEY);

        let first = resolve_identity();
        assert_eq!(first.len(), 36);

        // Same token on every subsequent resolve (reload survival).
        let second = resolve_identity();
        assert_eq!(first, second);
        assert_eq!(load_string_from_storage(IDENTITY_KEY), Some(first));

        remove_from_storage(IDENTITY_KEY);
    }

    #[wasm_bindgen_test]
    fn test_snapshot_cache_roundtrip() {
        remove_from_storage(SNAPSHOT_CACHE_KEY);

        let rows = vec![
            SnapshotRecord {
                content: "A".to_string(),
            },
            SnapshotRecord {
                content: "A\n\nB".to_string(),
            },
        ];
        save_json_to_storage(SNAPSHOT_CACHE_KEY, &rows);

        let loaded: Vec<SnapshotRecord> =
            load_json_from_storage(SNAPSHOT_CACHE_KEY).expect("cache should load");
        assert_eq!(loaded, rows);

        remove_from_storage(SNAPSHOT_CACHE_KEY);
    }
}
