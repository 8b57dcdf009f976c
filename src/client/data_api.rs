//! Transport helpers for the data endpoints. The payloads belong to the
//! views that render them, so most calls return plain JSON.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tracing::debug;

use super::endpoints::{self, StatsKind};
use super::http_client::HttpClient;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct DataApi {
    http: Arc<HttpClient>,
}

impl DataApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        DataApi { http }
    }

    pub async fn list_tables(&self) -> Result<Value> {
        self.http.get(endpoints::DATABASE_TABLES).await?.into_json()
    }

    pub async fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let payload = self
            .http
            .post(endpoints::TABLE_COLUMNS, json!({ "table_name": table }))
            .await?
            .into_json()?;
        serde_json::from_value(payload["columns"].clone())
            .map_err(|e| Error::Decode(format!("column list: {}", e)))
    }

    pub async fn table_count(&self, table: &str) -> Result<u64> {
        let payload = self
            .http
            .get(&endpoints::table_count(table))
            .await?
            .into_json()?;
        payload["count"]
            .as_u64()
            .ok_or_else(|| Error::Decode("row count missing from response".to_string()))
    }

    /// One page of rows, optionally filtered by a search term.
    pub async fn table_rows(
        &self,
        table: &str,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Value> {
        let mut path = format!("{}?page={}&limit={}", endpoints::table_data(table), page, limit);
        if let Some(term) = search.filter(|s| !s.is_empty()) {
            path.push_str("&search=");
            path.push_str(&urlencoding::encode(term));
        }
        self.http.get(&path).await?.into_json()
    }

    pub async fn insert_row(&self, table: &str, row: Value) -> Result<Value> {
        self.http
            .post(&endpoints::table_data(table), row)
            .await?
            .into_json()
    }

    pub async fn update_row(&self, table: &str, id: i64, row: Value) -> Result<Value> {
        self.http
            .put(&endpoints::table_row(table, id), row)
            .await?
            .into_json()
    }

    pub async fn delete_row(&self, table: &str, id: i64) -> Result<Value> {
        self.http
            .delete(&endpoints::table_row(table, id))
            .await?
            .into_json()
    }

    /// Request an aggregate. `params` is forwarded as the JSON body.
    pub async fn stats(&self, kind: StatsKind, params: Value) -> Result<Value> {
        debug!("Requesting {:?} statistics", kind);
        self.http.post(kind.path(), params).await?.into_json()
    }

    pub async fn list_files(&self) -> Result<Value> {
        self.http.get(endpoints::FILES).await?.into_json()
    }

    pub async fn sheets(&self, filename: &str) -> Result<Vec<String>> {
        let payload = self
            .http
            .post(endpoints::SHEETS, json!({ "filename": filename }))
            .await?
            .into_json()?;
        serde_json::from_value(payload["sheets"].clone())
            .map_err(|e| Error::Decode(format!("sheet list: {}", e)))
    }

    pub async fn read_columns(&self, filename: &str, sheet: Option<&str>) -> Result<Vec<String>> {
        let payload = self
            .http
            .post(
                endpoints::READ_COLUMNS,
                json!({ "filename": filename, "sheet": sheet }),
            )
            .await?
            .into_json()?;
        serde_json::from_value(payload["columns"].clone())
            .map_err(|e| Error::Decode(format!("column list: {}", e)))
    }

    pub async fn raw_data(&self) -> Result<Value> {
        self.http.get(endpoints::RAW_DATA).await?.into_json()
    }

    /// Upload a spreadsheet as the `file` part of a multipart form.
    pub async fn upload_file(&self, filename: &str, contents: Vec<u8>) -> Result<Value> {
        let part = Part::bytes(contents).file_name(filename.to_string());
        let form = Form::new().part("file", part);
        self.http.upload(endpoints::UPLOAD, form).await?.into_json()
    }

    /// Ask the server where a file can be downloaded from.
    pub async fn download_url(&self, path: &str) -> Result<String> {
        let payload = self.http.get(path).await?.into_json()?;
        payload["download_url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Decode("response carries no download_url".to_string()))
    }
}
