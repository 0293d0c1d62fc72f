use crate::storage::{load_string_from_storage, save_string_to_storage, IDENTITY_KEY};
use leptos::logging;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the per-browser identity token, creating and persisting one on
/// first use. The token is the owner key for every remote snapshot row.
///
/// Resolved once at startup and threaded through `AppState`; nothing else
/// reads the storage key directly.
pub(crate) fn resolve_identity() -> String {
    if let Some(token) = load_string_from_storage(IDENTITY_KEY) {
        if !token.trim().is_empty() {
            return token;
        }
    }

    let token = mint_identity_token(random_bytes());
    save_string_to_storage(IDENTITY_KEY, &token);
    token
}

static FALLBACK_COUNTER: AtomicUsize = AtomicUsize::new(1);

fn random_bytes() -> [u8; 16] {
    let mut bytes = [0u8; 16];
    // getrandom wires through crypto.getRandomValues on wasm (js feature).
    if let Err(e) = getrandom::getrandom(&mut bytes) {
        // Zeroed bytes would mint the same token in every affected browser,
        // merging their snapshot rows. Fall back to hashed time+counter
        // entropy instead.
        logging::error!("identity: entropy source failed: {e}");
        let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::SeqCst) as u64;
        return fallback_entropy(js_sys::Date::now() as u64, counter);
    }
    bytes
}

/// Last-resort entropy when the crypto source is unavailable.
pub(crate) fn fallback_entropy(now_ms: u64, counter: u64) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (i, chunk) in out.chunks_mut(8).enumerate() {
        let mut hasher = DefaultHasher::new();
        (now_ms, counter, i as u64).hash(&mut hasher);
        chunk.copy_from_slice(&hasher.finish().to_le_bytes());
    }
    out
}

/// UUID-v4-shaped token from 16 random bytes.
pub(crate) fn mint_identity_token(mut bytes: [u8; 16]) -> String {
    // RFC 4122 version and variant bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        hex[0..4].join(""),
        hex[4..6].join(""),
        hex[6..8].join(""),
        hex[8..10].join(""),
        hex[10..16].join(""),
    )
}
