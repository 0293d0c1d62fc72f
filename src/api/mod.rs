use crate::models::{SnapshotRecord, SnapshotRow};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub table_url: String,
    pub table_key: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        // We support BOTH `window.ENV.TABLE_URL` (documented in README) and
        // `window.ENV.table_url` (legacy/implementation detail) for compatibility.
        let table_url = read_env_var("TABLE_URL", "table_url")
            .unwrap_or_else(|| "http://localhost:54321".to_string());
        let table_key = read_env_var("TABLE_KEY", "table_key").unwrap_or_default();

        Self {
            table_url,
            table_key,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env_var(name: &str, fallback: &str) -> Option<String> {
    let window = web_sys::window()?;
    let env = window.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }

    for key in [name, fallback] {
        if let Ok(value) = js_sys::Reflect::get(&env, &(*key).into()) {
            if let Some(s) = value.as_string() {
                return Some(s);
            }
        }
    }

    None
}

/// Client for the hosted `editor_content` table (PostgREST-style REST).
///
/// Exactly three operations are used: list rows by identity, fetch the single
/// row for an identity, and upsert (identity, content). No retries anywhere;
/// callers decide what a failure means.
#[derive(Clone)]
pub(crate) struct TableClient {
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl TableClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self { base_url, api_key }
    }

    pub fn from_env() -> Self {
        let env = EnvConfig::new();
        Self::new(env.table_url, env.table_key)
    }

    pub(crate) fn table_endpoint(&self) -> String {
        format!("{}/rest/v1/editor_content", self.base_url)
    }

    fn with_table_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // The table key doubles as the bearer token; the identity travels as a
        // plain column value, there is no per-user auth.
        req.header("apikey", self.api_key.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn select(&self, query: &[(&str, String)]) -> ApiResult<serde_json::Value> {
        let client = reqwest::Client::new();
        let req = client.get(self.table_endpoint()).query(query);

        let res = self
            .with_table_headers(req)
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Select failed"))
        }
    }

    /// All stored snapshots for the identity, in server return order (the
    /// query carries no ordering clause).
    pub async fn list_snapshots(&self, identity: &str) -> ApiResult<Vec<SnapshotRecord>> {
        let data = self
            .select(&[
                ("select", "content".to_string()),
                ("user_id", format!("eq.{identity}")),
            ])
            .await?;
        Ok(Self::parse_snapshot_list(data))
    }

    /// The current stored blob for the identity; `None` when no row exists yet.
    pub async fn fetch_snapshot(&self, identity: &str) -> ApiResult<Option<SnapshotRecord>> {
        let data = self
            .select(&[
                ("select", "content".to_string()),
                ("user_id", format!("eq.{identity}")),
                ("limit", "1".to_string()),
            ])
            .await?;
        Ok(Self::parse_snapshot_list(data).into_iter().next())
    }

    /// Create-or-overwrite the row keyed by identity.
    pub async fn upsert_snapshot(&self, identity: &str, content: &str) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let req = client
            .post(self.table_endpoint())
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&SnapshotRow {
                user_id: identity.to_string(),
                content: content.to_string(),
            });

        let res = self
            .with_table_headers(req)
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Upsert failed"))
        }
    }

    /// Rows come back as a JSON array of `{ "content": ... }` objects.
    /// Malformed entries are skipped rather than failing the whole list.
    pub(crate) fn parse_snapshot_list(data: serde_json::Value) -> Vec<SnapshotRecord> {
        let list = data.as_array().cloned().unwrap_or_default();

        let mut out: Vec<SnapshotRecord> = Vec::with_capacity(list.len());
        for item in list {
            if let Some(content) = item.get("content").and_then(|v| v.as_str()) {
                out.push(SnapshotRecord {
                    content: content.to_string(),
                });
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_client_endpoint() {
        let c = TableClient::new("http://localhost:54321".to_string(), "anon".to_string());
        assert_eq!(
            c.table_endpoint(),
            "http://localhost:54321/rest/v1/editor_content"
        );
    }

    #[test]
    fn test_parse_snapshot_list() {
        let data = serde_json::json!([
            { "content": "first" },
            { "content": "second\n\nthird" },
        ]);
        let rows = TableClient::parse_snapshot_list(data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].content, "first");
        assert_eq!(rows[1].content, "second\n\nthird");
    }

    #[test]
    fn test_parse_snapshot_list_skips_malformed_rows() {
        let data = serde_json::json!([
            { "content": "ok" },
            { "content": 42 },
            { "something_else": "x" },
        ]);
        let rows = TableClient::parse_snapshot_list(data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "ok");
    }

    #[test]
    fn test_parse_snapshot_list_non_array() {
        let rows = TableClient::parse_snapshot_list(serde_json::json!({"error": "nope"}));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_snapshot_row_serialization() {
        let row = SnapshotRow {
            user_id: "abc-123".to_string(),
            content: "hello".to_string(),
        };
        let v = serde_json::to_value(row).expect("should serialize");
        assert_eq!(v["user_id"], "abc-123");
        assert_eq!(v["content"], "hello");
    }
}
