use crate::utils::json::{first_truthy, truthy_field, value_to_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_SUMMARY: &str = "No summary provided.";

/// 一致性分數：後端可能回傳數字或文字 (例如 "N/A")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coherence {
    Score(f64),
    Text(String),
}

impl Default for Coherence {
    fn default() -> Self {
        Coherence::Text(NOT_AVAILABLE.to_string())
    }
}

impl From<&Value> for Coherence {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Coherence::Score)
                .unwrap_or_else(|| Coherence::Text(n.to_string())),
            other => Coherence::Text(value_to_text(other)),
        }
    }
}

impl fmt::Display for Coherence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coherence::Score(score) => write!(f, "{}", score),
            Coherence::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub namespace: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub coherence: Coherence,
    pub mediator: String,
    pub timestamp: String,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub summary: String,
    pub claims: Vec<String>,
    pub context: String,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeSuccess {
    pub meta: Meta,
    pub primes: Vec<u64>,
    pub content: Content,
    pub raw: Value,
}

/// 解碼結果；序列化時帶 `status` 標籤，與後端的 envelope 格式一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DecodeResult {
    Success(DecodeSuccess),
    Error { detail: String },
}

impl DecodeResult {
    pub fn error(detail: impl Into<String>) -> Self {
        DecodeResult::Error {
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DecodeResult::Success(_))
    }

    pub fn as_success(&self) -> Option<&DecodeSuccess> {
        match self {
            DecodeResult::Success(success) => Some(success),
            DecodeResult::Error { .. } => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            DecodeResult::Success(_) => None,
            DecodeResult::Error { detail } => Some(detail),
        }
    }
}

/// `/api/chat/coord/walk` 的請求主體
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkRequest {
    pub start_coord: String,
    pub max_steps: u32,
    pub current_coherence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkResponse {
    pub path: Option<Vec<String>>,
    pub hop_lawfulness: Vec<Value>,
    pub hop_scores: Vec<Value>,
    pub termination_reason: String,
    pub raw: Value,
}

impl WalkResponse {
    /// `path` 可能在最上層，也可能包在 `data` 裡；非陣列視為沒有路徑
    pub fn from_value(raw: Value) -> Self {
        let path = truthy_field(&raw, "path")
            .or_else(|| raw.get("data").and_then(|data| truthy_field(data, "path")))
            .and_then(Value::as_array)
            .map(|items| items.iter().map(value_to_text).collect::<Vec<_>>());

        let list = |key: &str| {
            truthy_field(&raw, key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        };
        let hop_lawfulness = list("hop_lawfulness");
        let hop_scores = list("hop_scores");

        let termination_reason = first_truthy(&raw, &["termination_reason"])
            .map(value_to_text)
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            path,
            hop_lawfulness,
            hop_scores,
            termination_reason,
            raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkNode {
    pub hop: usize,
    pub coord: String,
    pub label: String,
    pub tooltip: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkEdge {
    pub hop: usize,
    pub from: String,
    pub to: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRow {
    pub hop: usize,
    pub coord: String,
    pub lawfulness: Option<Value>,
    pub score: Option<Value>,
}

/// 一次完整遊走的結果：造訪過的節點、邊、逐跳檢查表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkTrace {
    pub start: String,
    pub hops: u32,
    pub path: Vec<String>,
    pub nodes: Vec<WalkNode>,
    pub edges: Vec<WalkEdge>,
    pub inspection: Vec<InspectionRow>,
    pub termination_reason: String,
    pub raw: Value,
}
