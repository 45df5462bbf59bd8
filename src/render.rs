//! 終端機輸出：解碼結果與遊走檢查表

use crate::core::walk::cell_text;
use crate::domain::model::{DecodeResult, DecodeSuccess, WalkTrace};
use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "COHERENCE NORM")]
    coherence: String,
    #[tabled(rename = "MEDIATOR PRIME")]
    mediator: String,
    #[tabled(rename = "TYPE")]
    kind: String,
}

#[derive(Tabled)]
struct InspectionTableRow {
    #[tabled(rename = "HOP")]
    hop: usize,
    #[tabled(rename = "COORD")]
    coord: String,
    #[tabled(rename = "LAWFULNESS")]
    lawfulness: String,
    #[tabled(rename = "SCORE")]
    score: String,
}

pub fn render_decode(result: &DecodeResult, show_raw: bool) -> String {
    match result {
        DecodeResult::Success(success) => render_success(success, show_raw),
        DecodeResult::Error { detail } => {
            format!("{} {}\n", "Resolution Failed:".red().bold(), detail)
        }
    }
}

fn render_success(success: &DecodeSuccess, show_raw: bool) -> String {
    let mut out = String::new();

    let metrics = Table::new([MetricRow {
        coherence: success.meta.coherence.to_string(),
        mediator: success.meta.mediator.clone(),
        kind: success.meta.kind.clone(),
    }])
    .to_string();
    let _ = writeln!(out, "{}", metrics);
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", "Reconstructed Knowledge Tree".yellow().bold());
    let _ = writeln!(out, "{} {}", "Summary:".bold(), success.content.summary);
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", "Key Claims (Prime Nodes)".yellow().bold());
    if success.content.claims.is_empty() {
        let _ = writeln!(out, "{}", "No discrete prime nodes returned.".dimmed());
    } else {
        for claim in &success.content.claims {
            let _ = writeln!(out, "  {} {}", "•".green(), claim);
        }
    }

    if show_raw {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Raw Ledger JSON".yellow().bold());
        let _ = writeln!(
            out,
            "{}",
            serde_json::to_string_pretty(&success.raw).unwrap_or_default()
        );
    }

    out
}

pub fn render_inspection(trace: &WalkTrace) -> String {
    let rows: Vec<InspectionTableRow> = trace
        .inspection
        .iter()
        .map(|row| InspectionTableRow {
            hop: row.hop,
            coord: row.coord.clone(),
            lawfulness: cell_text(&row.lawfulness),
            score: cell_text(&row.score),
        })
        .collect();

    Table::new(rows).to_string()
}

pub struct WalkView {
    pub show_inspection: bool,
    pub show_dot: bool,
    pub show_raw: bool,
}

pub fn render_walk(trace: &WalkTrace, view: &WalkView) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {} nodes visited, {} resolved",
        "Traversal Complete.".green().bold(),
        trace.nodes.len(),
        trace.resolved_count()
    );
    for node in &trace.nodes {
        let marker = if node.resolved { "●".green() } else { "○".red() };
        let _ = writeln!(out, "  {} {}", marker, node.label.replace('\n', " "));
    }

    if view.show_inspection {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Walk Inspection".yellow().bold());
        let _ = writeln!(out, "{}", render_inspection(trace));
        let _ = writeln!(out, "Termination: {}", trace.termination_reason);
    }

    if view.show_dot {
        let _ = writeln!(out);
        out.push_str(&trace.to_dot());
    }

    if view.show_raw {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Walk JSON".yellow().bold());
        let _ = writeln!(
            out,
            "{}",
            serde_json::to_string_pretty(&trace.raw).unwrap_or_default()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize_success;
    use crate::domain::model::{InspectionRow, WalkNode};
    use serde_json::json;

    #[test]
    fn test_render_success_lists_claims() {
        let payload = json!({
            "meta": {"type": "episode", "coherence": 0.8, "mediator": "m-3"},
            "content": {"summary": "Demo summary", "claims": ["First claim"]}
        });
        let result = DecodeResult::Success(normalize_success(&payload, "EV-1"));

        let out = render_decode(&result, true);

        assert!(out.contains("0.8"));
        assert!(out.contains("m-3"));
        assert!(out.contains("episode"));
        assert!(out.contains("Demo summary"));
        assert!(out.contains("First claim"));
        assert!(out.contains("\"coherence\": 0.8"));
    }

    #[test]
    fn test_render_success_without_claims() {
        let result = DecodeResult::Success(normalize_success(&json!({}), "EV-1"));
        let out = render_decode(&result, false);
        assert!(out.contains("No discrete prime nodes returned."));
        assert!(!out.contains("Raw Ledger JSON"));
    }

    #[test]
    fn test_render_failure() {
        let out = render_decode(&DecodeResult::error("Coordinate not found"), false);
        assert!(out.contains("Coordinate not found"));
    }

    #[test]
    fn test_render_walk_with_inspection() {
        let trace = WalkTrace {
            start: "EV-1".to_string(),
            hops: 1,
            path: vec!["EV-1".to_string(), "EV-2".to_string()],
            nodes: vec![WalkNode {
                hop: 0,
                coord: "EV-1".to_string(),
                label: "[0] EV-1\n[Start]".to_string(),
                tooltip: "Start".to_string(),
                resolved: true,
            }],
            edges: vec![],
            inspection: vec![InspectionRow {
                hop: 1,
                coord: "EV-2".to_string(),
                lawfulness: Some(json!("lawful")),
                score: Some(json!(0.4)),
            }],
            termination_reason: "max_steps".to_string(),
            raw: json!({}),
        };

        let out = render_walk(
            &trace,
            &WalkView {
                show_inspection: true,
                show_dot: true,
                show_raw: false,
            },
        );

        assert!(out.contains("[0] EV-1 [Start]"));
        assert!(out.contains("lawful"));
        assert!(out.contains("0.4"));
        assert!(out.contains("Termination: max_steps"));
        assert!(out.contains("digraph {"));
    }
}
