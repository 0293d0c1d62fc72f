use serde::{Deserialize, Serialize};

/// One stored snapshot blob, as returned by selects that project `content`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SnapshotRecord {
    pub content: String,
}

/// Full row shape for the `editor_content` table.
///
/// `user_id` is the identity token; the table holds at most one row per
/// identity (upserts are keyed on it).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SnapshotRow {
    pub user_id: String,
    pub content: String,
}
