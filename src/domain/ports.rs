use crate::domain::model::{DecodeResult, WalkRequest, WalkResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 匯出檔案的寫入目標
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 帳本 API 的抽象；測試時可以換成記憶體內的假實作
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// 解碼失敗 (含網路錯誤) 一律以 `DecodeResult::Error` 表示，不回傳 `Err`
    async fn decode(&self, coord: &str) -> DecodeResult;

    async fn walk(&self, request: &WalkRequest) -> Result<WalkResponse>;
}
