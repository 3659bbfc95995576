use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Request, Response};
use serde_json::Value;
use tracing::debug;

use crate::app::ports::{RecordSinkPort, RecordSourcePort};
use crate::config::SupabaseConfig;
use crate::domain::RawRecord;
use crate::error::{Result, WardeadError};

const PREFER_INSERT: &str = "return=minimal";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// Client for the Supabase PostgREST endpoint (`/rest/v1/<table>`).
///
/// Implements both the read and the write port so a single instance serves
/// a whole run.
pub struct SupabaseRest {
    client: Client,
    base_url: String,
}

impl SupabaseRest {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.key)
            .map_err(|_| WardeadError::Config("Supabase key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|_| WardeadError::Config("Supabase key is not a valid header value".to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    pub fn fetch_request(&self, table: &str, offset: usize, limit: usize) -> Result<Request> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[
                ("select", "*".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ])
            .build()?;
        Ok(request)
    }

    pub fn insert_request(&self, table: &str, rows: &[Value]) -> Result<Request> {
        let request = self
            .client
            .post(self.table_url(table))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", PREFER_INSERT)
            .json(rows)
            .build()?;
        Ok(request)
    }

    pub fn upsert_request(&self, table: &str, rows: &[Value], conflict_key: &str) -> Result<Request> {
        let request = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", conflict_key)])
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", PREFER_UPSERT)
            .json(rows)
            .build()?;
        Ok(request)
    }

    async fn send(&self, request: Request) -> Result<Response> {
        debug!("{} {}", request.method(), request.url());
        let resp = self.client.execute(request).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WardeadError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl RecordSourcePort for SupabaseRest {
    async fn fetch_page(&self, table: &str, offset: usize, limit: usize) -> Result<Vec<RawRecord>> {
        let resp = self.send(self.fetch_request(table, offset, limit)?).await?;
        let rows = resp.json::<Vec<RawRecord>>().await?;
        Ok(rows)
    }
}

#[async_trait]
impl RecordSinkPort for SupabaseRest {
    async fn insert(&self, table: &str, rows: &[Value]) -> Result<()> {
        self.send(self.insert_request(table, rows)?).await?;
        Ok(())
    }

    async fn upsert(&self, table: &str, rows: &[Value], conflict_key: &str) -> Result<()> {
        self.send(self.upsert_request(table, rows, conflict_key)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> SupabaseRest {
        SupabaseRest::new(&SupabaseConfig::new("https://abc.supabase.co/", "test-key")).unwrap()
    }

    fn query(request: &Request) -> Vec<(String, String)> {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn body_json(request: &Request) -> Value {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_fetch_request_pages_by_offset() {
        let request = client().fetch_request("staffordshire_wardead", 2000, 1000).unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/staffordshire_wardead");
        assert_eq!(
            query(&request),
            vec![
                ("select".to_string(), "*".to_string()),
                ("offset".to_string(), "2000".to_string()),
                ("limit".to_string(), "1000".to_string()),
            ]
        );
    }

    #[test]
    fn test_insert_request() {
        let rows = vec![json!({"forename": "Arthur", "date_of_death": "1914-08-29"})];
        let request = client().insert_request("wardead_clean", &rows).unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/rest/v1/wardead_clean");
        assert!(request.url().query().is_none());
        assert_eq!(request.headers()["Prefer"], PREFER_INSERT);
        assert_eq!(body_json(&request), json!(rows));
    }

    #[test]
    fn test_upsert_request_merges_on_conflict_key() {
        let rows = vec![json!({"id": 1, "iso_date": null})];
        let request = client().upsert_request("staffordshire_wardead", &rows, "id").unwrap();
        assert_eq!(query(&request), vec![("on_conflict".to_string(), "id".to_string())]);
        assert_eq!(request.headers()["Prefer"], PREFER_UPSERT);
        assert_eq!(body_json(&request), json!([{"id": 1, "iso_date": null}]));
    }

    #[test]
    fn test_invalid_key_is_config_error() {
        let result = SupabaseRest::new(&SupabaseConfig::new("https://abc.supabase.co", "bad\nkey"));
        assert!(matches!(result, Err(WardeadError::Config(_))));
    }
}
