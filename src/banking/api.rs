//! 后端 HTTP 客户端
//!
//! 统一 base_url、超时与 Bearer Token（来自 AuthStore）；非 2xx 响应转为 KioskError::Api，
//! message 取响应体中的 message 字段（没有则为空，由页面使用默认文案）。

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthStore;
use crate::core::KioskError;

pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Arc<AuthStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64, auth: Arc<AuthStore>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, KioskError> {
        self.execute(self.client.get(self.url(path))).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, KioskError> {
        self.execute(self.client.post(self.url(path)).json(body)).await
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, KioskError> {
        let req = match self.auth.access_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(KioskError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

/// 从错误响应体中取 message 字段
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_default()
}
