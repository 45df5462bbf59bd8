use crate::domain::model::{
    Coherence, Content, DecodeSuccess, Meta, NOT_AVAILABLE, NO_SUMMARY,
};
use crate::utils::json::{as_object_or_empty, first_truthy, is_truthy, truthy_field, value_to_text};
use serde_json::{json, Value};

/// 座標的命名空間：第一個 `:` 之前的文字，沒有 `:` 時就是整個座標
pub fn namespace_of(coord: &str) -> &str {
    coord.split_once(':').map(|(ns, _)| ns).unwrap_or(coord)
}

/// 將後端各種形狀的 payload 正規化成 `DecodeSuccess`
pub fn normalize_success(payload: &Value, coord_hint: &str) -> DecodeSuccess {
    if payload.get("coord").is_some() && payload.get("skim").is_some() {
        normalize_skim_payload(payload, coord_hint)
    } else {
        normalize_legacy_payload(payload, coord_hint)
    }
}

/// 欄位存在且不是 null 就取用 (不做 truthy 判斷)，否則用預設值
fn present_text(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        Some(Value::Null) | None => default.to_string(),
        Some(v) => value_to_text(v),
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    value.map(value_to_text).unwrap_or_else(|| default.to_string())
}

/// 物件型 claim 取 `label`，其餘取字串表示
fn claim_text(claim: &Value) -> Option<String> {
    match claim {
        Value::Object(_) => truthy_field(claim, "label").map(value_to_text),
        other if is_truthy(other) => Some(value_to_text(other)),
        _ => None,
    }
}

fn claims_from(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(claim_text).collect())
        .unwrap_or_default()
}

/// 依 segments 順序找出第一個可以對應到 blobs 字串的內容
fn first_segment_text(payload_blob: Option<&Value>) -> Option<String> {
    let blob = payload_blob?;
    let blobs = blob.get("blobs")?.as_object()?;
    let segments = blob.get("segments")?.as_array()?;

    segments
        .iter()
        .filter(|segment| segment.is_object())
        .find_map(|segment| {
            let blob_ref = truthy_field(segment, "blob_ref")?.as_str()?;
            blobs.get(blob_ref)?.as_str().map(|text| text.trim().to_string())
        })
}

/// 新版帳本格式：帶有 `coord` 與 `skim`，治理資訊在 `governance.appraisal`
fn normalize_skim_payload(payload: &Value, coord_hint: &str) -> DecodeSuccess {
    let skim = as_object_or_empty(truthy_field(payload, "skim"));
    let governance = as_object_or_empty(truthy_field(payload, "governance"));
    let appraisal = as_object_or_empty(governance.get("appraisal"));
    let meta_payload = as_object_or_empty(truthy_field(payload, "meta"));

    let payload_text = first_segment_text(payload.get("payload")).unwrap_or_default();

    let claims = truthy_field(payload, "interpretation")
        .filter(|interpretation| interpretation.is_object())
        .map(|interpretation| claims_from(truthy_field(interpretation, "claims")))
        .unwrap_or_default();

    let namespace = first_truthy(&meta_payload, &["namespace_used", "namespace"])
        .map(value_to_text)
        .unwrap_or_else(|| namespace_of(coord_hint).to_string());

    let coherence = first_truthy(&appraisal, &["coherence", "score", "grace"])
        .map(Coherence::from)
        .unwrap_or_default();

    let mediator = truthy_field(&appraisal, "law")
        .or_else(|| truthy_field(&meta_payload, "provider"));

    let meta = Meta {
        namespace,
        kind: text_or(truthy_field(payload, "type"), "unknown"),
        coherence,
        mediator: text_or(mediator, NOT_AVAILABLE),
        timestamp: text_or(truthy_field(&meta_payload, "created_at"), NOT_AVAILABLE),
        raw: payload.clone(),
    };

    let summary = match truthy_field(&skim, "one_line") {
        Some(one_line) => value_to_text(one_line),
        None if !payload_text.is_empty() => payload_text,
        None => NO_SUMMARY.to_string(),
    };

    let content = Content {
        summary,
        claims,
        context: present_text(payload, "coord", ""),
        raw: truthy_field(payload, "payload")
            .cloned()
            .unwrap_or_else(|| json!({})),
    };

    DecodeSuccess {
        meta,
        primes: Vec::new(),
        content,
        raw: payload.clone(),
    }
}

/// 舊版 / 對話型格式：中繼資料在 `meta` 或 `metadata`，內容可能需要從對話欄位組出來
fn normalize_legacy_payload(payload: &Value, coord_hint: &str) -> DecodeSuccess {
    let meta_source = as_object_or_empty(first_truthy(payload, &["meta", "metadata"]));

    let namespace = first_truthy(payload, &["namespace_used", "namespace"])
        .or_else(|| truthy_field(&meta_source, "namespace"))
        .map(value_to_text)
        .unwrap_or_else(|| namespace_of(coord_hint).to_string());

    let kind = first_truthy(&meta_source, &["type", "kind"])
        .or_else(|| truthy_field(payload, "kind"))
        .map(value_to_text)
        .unwrap_or_else(|| "unknown".to_string());

    let coherence = match first_truthy(&meta_source, &["coherence", "score"]) {
        Some(value) => Coherence::from(value),
        None => match meta_source.get("appraisal").and_then(|a| a.get("score")) {
            Some(Value::Null) | None => Coherence::default(),
            Some(score) => Coherence::from(score),
        },
    };

    let mediator = first_truthy(&meta_source, &["mediator", "provider"])
        .map(value_to_text)
        .unwrap_or_else(|| present_text(payload, "provider", NOT_AVAILABLE));

    let timestamp = truthy_field(&meta_source, "timestamp")
        .or_else(|| truthy_field(payload, "created_at"))
        .map(value_to_text)
        .unwrap_or_else(|| present_text(&meta_source, "session_id", NOT_AVAILABLE));

    let meta_raw = if is_truthy(&meta_source) {
        meta_source.clone()
    } else {
        payload.clone()
    };

    let content_source = match truthy_field(payload, "content") {
        Some(content) if content.is_object() => content.clone(),
        _ => json!({
            "summary": first_truthy(payload, &["assistant_reply", "full_text"])
                .cloned()
                .unwrap_or_else(|| json!(NO_SUMMARY)),
            "claims": truthy_field(payload, "knowledge_tree")
                .cloned()
                .unwrap_or_else(|| json!([])),
            "context": truthy_field(payload, "user_message")
                .cloned()
                .unwrap_or_else(|| json!(coord_hint)),
        }),
    };

    let claims = match truthy_field(&content_source, "claims") {
        Some(claims) => claims_from(Some(claims)),
        None => claims_from(content_source.get("knowledge_tree")),
    };

    let context = match content_source.get("context") {
        Some(Value::Null) | None => present_text(payload, "coordinate", ""),
        Some(context) => value_to_text(context),
    };

    let primes = first_truthy(payload, &["primes", "token_primes"])
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default();

    DecodeSuccess {
        meta: Meta {
            namespace,
            kind,
            coherence,
            mediator,
            timestamp,
            raw: meta_raw,
        },
        primes,
        content: Content {
            summary: present_text(&content_source, "summary", NO_SUMMARY),
            claims,
            context,
            raw: content_source,
        },
        raw: payload.clone(),
    }
}
