use anyhow::{anyhow, Context, Result};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin PostgREST client. Every request carries `Prefer: return=representation`
/// so writes echo the affected rows back.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            service_key: config.storage_key().to_string(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key).context("invalid anon key")?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let token = auth_token.unwrap_or(&self.service_key);
        if !token.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).context("invalid bearer token")?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers(auth_token)?;

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// `GET /rest/v1/{table}?{query}`
    pub async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = if query.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, query)
        };
        self.request(Method::GET, &path, None, None).await
    }

    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}", table);
        self.request(Method::POST, &path, None, Some(row)).await
    }

    /// `PATCH` restricted by `filter`. Returns the rows that matched; an empty
    /// result means the filter selected nothing.
    pub async fn update_where<T>(&self, table: &str, filter: &str, patch: Value) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}?{}", table, filter);
        self.request(Method::PATCH, &path, None, Some(patch)).await
    }

    /// Invoke a Postgres function through `/rest/v1/rpc/{function}`.
    pub async fn rpc<T>(&self, function: &str, args: Value) -> Result<T>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, None, Some(args)).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
