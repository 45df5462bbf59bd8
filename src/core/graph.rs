use std::fmt::Write;

pub const NODE_FILL: &str = "#f0fdf4";
pub const START_FILL: &str = "#dbeafe";

/// DOT 字串跳脫：反斜線、雙引號與換行
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

#[derive(Debug, Clone, PartialEq)]
enum Statement {
    Node {
        id: String,
        attrs: Vec<(String, String)>,
    },
    Edge {
        from: String,
        to: String,
        attrs: Vec<(String, String)>,
    },
}

/// 最小化的 Graphviz 有向圖產生器，只輸出 DOT 原始碼
#[derive(Debug, Clone)]
pub struct Digraph {
    comment: String,
    graph_attrs: Vec<(String, String)>,
    node_defaults: Vec<(String, String)>,
    statements: Vec<Statement>,
}

impl Digraph {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            graph_attrs: Vec::new(),
            node_defaults: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// 遊走圖的預設樣式：由左至右、方框、淺綠底色
    pub fn knowledge_walk() -> Self {
        let mut graph = Self::new("Knowledge Walk");
        graph.graph_attr("rankdir", "LR");
        graph.node_default("shape", "box");
        graph.node_default("style", "filled");
        graph.node_default("fillcolor", NODE_FILL);
        graph.node_default("fontname", "Courier New");
        graph
    }

    pub fn graph_attr(&mut self, key: &str, value: &str) -> &mut Self {
        self.graph_attrs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn node_default(&mut self, key: &str, value: &str) -> &mut Self {
        self.node_defaults.push((key.to_string(), value.to_string()));
        self
    }

    pub fn node(&mut self, id: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.statements.push(Statement::Node {
            id: id.to_string(),
            attrs: to_owned_attrs(attrs),
        });
        self
    }

    pub fn edge(&mut self, from: &str, to: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.statements.push(Statement::Edge {
            from: from.to_string(),
            to: to.to_string(),
            attrs: to_owned_attrs(attrs),
        });
        self
    }

    pub fn node_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s, Statement::Node { .. }))
            .count()
    }

    pub fn edge_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s, Statement::Edge { .. }))
            .count()
    }

    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        // String 的 fmt::Write 不會失敗
        let _ = writeln!(out, "// {}", self.comment);
        out.push_str("digraph {\n");
        for (key, value) in &self.graph_attrs {
            let _ = writeln!(out, "\t{}={}", key, value);
        }
        if !self.node_defaults.is_empty() {
            let _ = writeln!(out, "\tnode {}", format_attrs(&self.node_defaults));
        }
        for statement in &self.statements {
            match statement {
                Statement::Node { id, attrs } => {
                    let _ = writeln!(out, "\t\"{}\" {}", escape(id), format_attrs(attrs));
                }
                Statement::Edge { from, to, attrs } => {
                    let _ = writeln!(
                        out,
                        "\t\"{}\" -> \"{}\" {}",
                        escape(from),
                        escape(to),
                        format_attrs(attrs)
                    );
                }
            }
        }
        out.push_str("}\n");
        out
    }
}

fn to_owned_attrs(attrs: &[(&str, &str)]) -> Vec<(String, String)> {
    attrs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn format_attrs(attrs: &[(String, String)]) -> String {
    let body = attrs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape(v)))
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{}]", body)
}
