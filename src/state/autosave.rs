use crate::state::AppContext;
use crate::storage::{save_json_to_storage, SNAPSHOT_CACHE_KEY};
use leptos::logging;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::{Arc, Mutex};
use wasm_bindgen::JsCast;

/// Quiet period after the last edit before a save fires.
pub(crate) const AUTOSAVE_QUIET_MS: i32 = 3000;

/// How long the "saved" toast stays visible.
pub(crate) const SAVED_TOAST_MS: i32 = 2000;

/// Merge a new draft onto the previously stored blob.
///
/// Absent (or empty) existing content yields the draft unchanged; otherwise
/// the draft is appended after a blank line. Saves never overwrite or
/// truncate previously stored text.
pub(crate) fn merge_snapshot(existing: Option<&str>, draft: &str) -> String {
    match existing {
        Some(prev) if !prev.is_empty() => format!("{prev}\n\n{draft}"),
        _ => draft.to_string(),
    }
}

/// Debounced autosave for the single in-memory draft.
///
/// Responsibilities:
/// - draft text + saved/just_saved flags
/// - one debounce timer, cleared and rearmed on every edit
/// - flush: fetch current blob, append the draft, upsert, refresh the feed
///
/// Failure policy: read and write failures are logged and nothing else; no
/// retry, no user-facing error, and the dirty flag is never cleared by a
/// failure path.
#[derive(Clone)]
pub(crate) struct AutosaveController {
    app_state: AppContext,

    pub text: RwSignal<String>,
    pub saved: RwSignal<bool>,
    pub just_saved: RwSignal<bool>,

    debounce_timer: Arc<Mutex<Option<i32>>>,
    toast_timer: Arc<Mutex<Option<i32>>>,
}

impl AutosaveController {
    pub fn new(app_state: AppContext) -> Self {
        Self {
            app_state,
            text: RwSignal::new(String::new()),
            saved: RwSignal::new(true),
            just_saved: RwSignal::new(false),
            debounce_timer: Arc::new(Mutex::new(None)),
            toast_timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Called for every draft change, from typing or from the formatting
    /// toolbar. Stores the text and rearms the debounce timer.
    pub fn on_edit(&self, new_text: String) {
        self.text.set(new_text);
        self.mark_dirty();
    }

    /// Marks the draft unsaved and (re)arms the debounce timer. An existing
    /// pending timer is cleared first, so at most one save is ever pending.
    pub fn mark_dirty(&self) {
        self.saved.set(false);

        let Some(win) = web_sys::window() else {
            return;
        };

        if let Ok(mut slot) = self.debounce_timer.lock() {
            if let Some(tid) = slot.take() {
                let _ = win.clear_timeout_with_handle(tid);
            }
        }

        let s2 = self.clone();
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            s2.flush();
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                AUTOSAVE_QUIET_MS,
            )
            .unwrap_or(0);

        if let Ok(mut slot) = self.debounce_timer.lock() {
            *slot = Some(tid);
        }
    }

    /// Timer-fire path: read the stored blob, append the current draft, write
    /// the result back under the identity key.
    fn flush(&self) {
        // Nothing pending (an earlier flush already landed).
        if self.saved.get_untracked() {
            return;
        }

        let draft = self.text.get_untracked();
        let client = self.app_state.0.client.get_untracked();
        let identity = self.app_state.0.identity.clone();

        let s2 = self.clone();
        spawn_local(async move {
            let existing = match client.fetch_snapshot(&identity).await {
                Ok(record) => record,
                Err(e) => {
                    // Abort the save; the draft stays dirty and the next edit
                    // rearms the timer.
                    logging::error!("autosave: fetching current content failed: {e}");
                    return;
                }
            };

            let merged = merge_snapshot(existing.as_ref().map(|r| r.content.as_str()), &draft);

            match client.upsert_snapshot(&identity, &merged).await {
                Ok(()) => {
                    s2.saved.set(true);
                    s2.show_saved_toast();
                    s2.refresh_snapshots();
                }
                Err(e) => {
                    logging::error!("autosave: saving text failed: {e}");
                }
            }
        });
    }

    fn show_saved_toast(&self) {
        self.just_saved.set(true);

        let Some(win) = web_sys::window() else {
            return;
        };

        if let Ok(mut slot) = self.toast_timer.lock() {
            if let Some(tid) = slot.take() {
                let _ = win.clear_timeout_with_handle(tid);
            }
        }

        let just_saved = self.just_saved;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            just_saved.set(false);
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                SAVED_TOAST_MS,
            )
            .unwrap_or(0);

        if let Ok(mut slot) = self.toast_timer.lock() {
            *slot = Some(tid);
        }
    }

    /// Re-fetch the full list of stored snapshots for display. Also used once
    /// on mount to populate the feed.
    pub fn refresh_snapshots(&self) {
        let client = self.app_state.0.client.get_untracked();
        let identity = self.app_state.0.identity.clone();
        let snapshots = self.app_state.0.snapshots;
        let loading = self.app_state.0.snapshots_loading;

        loading.set(true);
        spawn_local(async move {
            match client.list_snapshots(&identity).await {
                Ok(rows) => {
                    save_json_to_storage(SNAPSHOT_CACHE_KEY, &rows);
                    snapshots.set(rows);
                }
                Err(e) => {
                    logging::error!("autosave: loading snapshots failed: {e}");
                }
            }
            loading.set(false);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_onto_missing_snapshot_is_the_draft() {
        assert_eq!(merge_snapshot(None, "A"), "A");
    }

    #[test]
    fn test_merge_onto_empty_snapshot_is_the_draft() {
        assert_eq!(merge_snapshot(Some(""), "A"), "A");
    }

    #[test]
    fn test_merge_appends_after_blank_line() {
        assert_eq!(merge_snapshot(Some("A"), "B"), "A\n\nB");
    }

    #[test]
    fn test_merge_never_truncates_existing_content() {
        let merged = merge_snapshot(Some("A\n\nB"), "C");
        assert_eq!(merged, "A\n\nB\n\nC");
        assert!(merged.starts_with("A\n\nB"));
    }

    #[test]
    fn test_merge_keeps_draft_whitespace_verbatim() {
        assert_eq!(merge_snapshot(Some("x"), "  y\n"), "x\n\n  y\n");
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::state::AppState;
    use wasm_bindgen_test::*;

    // run_in_browser is configured once, in lib.rs.

    fn disarm(controller: &AutosaveController) {
        if let Ok(mut slot) = controller.debounce_timer.lock() {
            if let Some(tid) = slot.take() {
                if let Some(win) = web_sys::window() {
                    let _ = win.clear_timeout_with_handle(tid);
                }
            }
        }
    }

    #[wasm_bindgen_test]
    fn test_rearming_replaces_the_pending_timer() {
        let controller = AutosaveController::new(AppContext(AppState::new()));

        controller.mark_dirty();
        let first = controller
            .debounce_timer
            .lock()
            .unwrap()
            .expect("first edit arms a timer");

        // A second edit inside the quiet period clears the first handle and
        // arms a fresh one; only one save is ever pending.
        controller.mark_dirty();
        let second = controller
            .debounce_timer
            .lock()
            .unwrap()
            .expect("second edit rearms the timer");

        assert_ne!(first, second);
        assert!(!controller.saved.get_untracked());

        disarm(&controller);
    }

    #[wasm_bindgen_test]
    fn test_rapid_edits_keep_a_single_pending_timer() {
        let controller = AutosaveController::new(AppContext(AppState::new()));

        let mut last = None;
        for i in 0..5 {
            controller.on_edit(format!("draft {i}"));
            let current = *controller.debounce_timer.lock().unwrap();
            assert!(current.is_some());
            assert_ne!(current, last);
            last = current;
        }

        // The slot holds exactly the newest handle; the final draft is what a
        // firing flush would read.
        assert_eq!(controller.text.get_untracked(), "draft 4");

        disarm(&controller);
    }
}
