//! 後端回傳的 JSON 形狀不固定，這裡集中處理「取第一個有值的欄位」這類規則。

use serde_json::Value;

/// null、false、0、空字串、空陣列與空物件都視為沒有值
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// 讀取物件欄位，只在值為 truthy 時回傳
pub fn truthy_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| is_truthy(v))
}

/// 依序嘗試多個欄位，回傳第一個 truthy 的值
pub fn first_truthy<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| truthy_field(value, key))
}

/// 字串原樣輸出，其他型別使用 JSON 表示
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 只保留物件；其他型別視為空物件
pub fn as_object_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => Value::Object(Default::default()),
    }
}
