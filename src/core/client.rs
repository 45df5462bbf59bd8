use crate::config::ApiConfig;
use crate::core::normalize::normalize_success;
use crate::domain::model::{DecodeResult, WalkRequest, WalkResponse};
use crate::domain::ports::LedgerApi;
use crate::utils::error::{ResolverError, Result};
use crate::utils::json::{first_truthy, value_to_text};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};

/// 透過 HTTP 存取帳本服務的客戶端
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    client: Client,
    config: ApiConfig,
}

impl HttpLedgerClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// POST JSON；連線失敗或逾時會依 `retry_attempts` 重試
    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Response> {
        let mut attempt = 0;

        loop {
            // 構建請求
            let mut request = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .json(body);

            // 添加自定義標頭
            for (key, value) in &self.config.headers {
                request = request.header(key, value);
            }

            // 設定超時
            if let Some(timeout) = self.config.timeout() {
                request = request.timeout(timeout);
            }

            tracing::debug!("📡 POST {} (attempt {})", url, attempt + 1);

            match request.send().await {
                Ok(response) => {
                    tracing::debug!("📡 Response status: {}", response.status());
                    return Ok(response);
                }
                Err(e)
                    if (e.is_connect() || e.is_timeout())
                        && attempt < self.config.retry_attempts =>
                {
                    attempt += 1;
                    tracing::warn!(
                        "⚠️ Request to {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.config.retry_attempts
                    );
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 呼叫解碼端點；回傳 `Err` 代表傳輸或解析失敗
    pub async fn try_decode(&self, coord: &str) -> Result<DecodeResult> {
        let url = self.config.decode_url();
        let response = self.post_json(&url, &json!({ "coordinate": coord })).await?;

        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;

        Ok(interpret_decode_response(status.is_success(), &body, &text, coord))
    }

    pub async fn try_walk(&self, request: &WalkRequest) -> Result<WalkResponse> {
        let url = self.config.walk_url();
        let response = self.post_json(&url, request).await?;
        let raw: Value = response.json().await?;
        Ok(WalkResponse::from_value(raw))
    }
}

/// 解讀解碼端點的回應 envelope：資料可能在 `data`、`result` 或最上層
pub fn interpret_decode_response(
    http_ok: bool,
    body: &Value,
    text: &str,
    coord: &str,
) -> DecodeResult {
    let payload = first_truthy(body, &["data", "result"]).unwrap_or(body);

    let status_success = body.get("status").and_then(Value::as_str) == Some("success");
    let has_coord = payload.get("coord").is_some() || payload.get("canonical_coord").is_some();

    if http_ok && (status_success || has_coord) {
        return DecodeResult::Success(normalize_success(payload, coord));
    }

    let detail = first_truthy(payload, &["detail", "error"])
        .map(value_to_text)
        .unwrap_or_else(|| text.to_string());
    DecodeResult::error(detail)
}

#[async_trait]
impl LedgerApi for HttpLedgerClient {
    async fn decode(&self, coord: &str) -> DecodeResult {
        match self.try_decode(coord).await {
            Ok(result) => {
                if let Some(detail) = result.detail() {
                    tracing::info!("❌ {} did not resolve: {}", coord, detail);
                } else {
                    tracing::debug!("✅ {} resolved", coord);
                }
                result
            }
            Err(e) => {
                tracing::warn!("❌ Decode of {} failed: {}", coord, e);
                DecodeResult::error(e.to_string())
            }
        }
    }

    async fn walk(&self, request: &WalkRequest) -> Result<WalkResponse> {
        self.try_walk(request)
            .await
            .map_err(|e| ResolverError::BackendError {
                message: format!("Backend handshake failed: {}", e),
            })
    }
}
