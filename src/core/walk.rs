use crate::config::toml_config::{WalkConfig, MAX_HOPS, MIN_HOPS};
use crate::core::graph::{Digraph, START_FILL};
use crate::domain::model::{
    DecodeResult, InspectionRow, WalkEdge, WalkNode, WalkRequest, WalkResponse, WalkTrace,
};
use crate::domain::ports::LedgerApi;
use crate::utils::error::{ResolverError, Result};
use serde_json::Value;
use std::collections::HashSet;

pub const LABEL_PREVIEW_CHARS: usize = 30;
pub const UNRESOLVED_TOOLTIP: &str = "Unresolved";

/// 超過上限時截斷並補上 "..."，以字元而非位元組計算
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// 依解碼結果組出節點的 label 與 tooltip
pub fn node_label(coord: &str, decoded: &DecodeResult) -> (String, String, bool) {
    match decoded {
        DecodeResult::Success(success) => {
            let preview = success
                .content
                .claims
                .first()
                .unwrap_or(&success.content.summary);
            let short_text = truncate_preview(preview, LABEL_PREVIEW_CHARS);
            (
                format!("{}\n[{}]", coord, short_text),
                success.content.summary.clone(),
                true,
            )
        }
        DecodeResult::Error { .. } => (coord.to_string(), UNRESOLVED_TOOLTIP.to_string(), false),
    }
}

/// 逐跳檢查表涵蓋整條路徑；第 idx 跳對應 hop_scores / hop_lawfulness 的第 idx-1 筆
pub fn inspection_rows(path: &[String], response: &WalkResponse) -> Vec<InspectionRow> {
    path.iter()
        .enumerate()
        .map(|(idx, coord)| {
            let previous = idx.checked_sub(1);
            let score = previous
                .and_then(|i| response.hop_scores.get(i))
                .filter(|entry| entry.is_object())
                .and_then(|entry| entry.get("score"))
                .filter(|score| !score.is_null())
                .cloned();
            let lawfulness = previous
                .and_then(|i| response.hop_lawfulness.get(i))
                .filter(|law| !law.is_null())
                .cloned();
            InspectionRow {
                hop: idx,
                coord: coord.clone(),
                lawfulness,
                score,
            }
        })
        .collect()
}

/// 遊走模擬器：向後端要求路徑，再逐一解碼每個節點
pub struct WalkSimulator<A: LedgerApi> {
    api: A,
    config: WalkConfig,
}

impl<A: LedgerApi> WalkSimulator<A> {
    pub fn new(api: A, config: WalkConfig) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    fn validate_input(start: &str, hops: u32) -> Result<()> {
        if start.is_empty() {
            return Err(ResolverError::ValidationError {
                message: "Start coordinate required.".to_string(),
            });
        }
        if !(MIN_HOPS..=MAX_HOPS).contains(&hops) {
            return Err(ResolverError::ValidationError {
                message: format!("Hops must be between {} and {}.", MIN_HOPS, MAX_HOPS),
            });
        }
        Ok(())
    }

    pub async fn simulate(&self, start: &str, hops: u32) -> Result<WalkTrace> {
        self.simulate_with(start, hops, &self.config).await
    }

    /// 以單次呼叫的設定執行遊走 (dashboard 的每次勾選可以覆寫預設值)
    pub async fn simulate_with(
        &self,
        start: &str,
        hops: u32,
        config: &WalkConfig,
    ) -> Result<WalkTrace> {
        let start = start.trim();
        Self::validate_input(start, hops)?;

        tracing::info!("🧭 Calculating traversal path from {} ({} hops)", start, hops);

        let request = WalkRequest {
            start_coord: start.to_string(),
            max_steps: hops,
            current_coherence: config.current_coherence,
        };
        let response = self.api.walk(&request).await?;

        let mut path = match response.path.clone() {
            Some(path) if !path.is_empty() => path,
            _ => {
                return Err(ResolverError::WalkError {
                    message: "Backend returned no path. Walk simulation requires flow-rules output."
                        .to_string(),
                })
            }
        };
        if path[0] != start {
            path.insert(0, start.to_string());
        }

        let visit_limit = path.len().min(hops as usize + 1);
        let mut nodes = Vec::with_capacity(visit_limit);
        let mut edges = Vec::new();
        let mut visited_edges = HashSet::new();

        for (i, node_coord) in path.iter().take(visit_limit).enumerate() {
            tracing::info!("🔗 Hop {}: Resolving {}...", i, node_coord);

            let decoded = self.api.decode(node_coord).await;
            let (label, tooltip, resolved) = node_label(node_coord, &decoded);

            let label = if config.show_hop_numbers {
                format!("[{}] {}", i, label)
            } else {
                label
            };

            nodes.push(WalkNode {
                hop: i,
                coord: node_coord.clone(),
                label,
                tooltip,
                resolved,
            });

            if i > 0 {
                let prev_node = &path[i - 1];
                let edge_key = format!("{}-{}", prev_node, node_coord);
                if visited_edges.insert(edge_key) {
                    edges.push(WalkEdge {
                        hop: i,
                        from: prev_node.clone(),
                        to: node_coord.clone(),
                        label: format!("step {}", i),
                    });
                }
            }

            if !config.hop_delay().is_zero() && i + 1 < visit_limit {
                tokio::time::sleep(config.hop_delay()).await;
            }
        }

        tracing::info!("✅ Traversal complete. Knowledge tree anchored.");

        let inspection = inspection_rows(&path, &response);

        Ok(WalkTrace {
            start: start.to_string(),
            hops,
            path,
            nodes,
            edges,
            inspection,
            termination_reason: response.termination_reason,
            raw: response.raw,
        })
    }
}

impl WalkTrace {
    /// 依造訪順序輸出節點與邊；起點使用不同底色
    pub fn to_graph(&self) -> Digraph {
        let mut graph = Digraph::knowledge_walk();

        for node in &self.nodes {
            if node.hop == 0 {
                graph.node(
                    &node.coord,
                    &[
                        ("label", node.label.as_str()),
                        ("fillcolor", START_FILL),
                        ("tooltip", node.tooltip.as_str()),
                    ],
                );
            } else {
                graph.node(
                    &node.coord,
                    &[("label", node.label.as_str()), ("tooltip", node.tooltip.as_str())],
                );
            }

            for edge in self.edges.iter().filter(|e| e.hop == node.hop) {
                graph.edge(&edge.from, &edge.to, &[("label", edge.label.as_str())]);
            }
        }

        graph
    }

    pub fn to_dot(&self) -> String {
        self.to_graph().to_dot()
    }

    pub fn resolved_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.resolved).count()
    }
}

/// 檢查表欄位的顯示文字；缺值顯示為空白
pub fn cell_text(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
