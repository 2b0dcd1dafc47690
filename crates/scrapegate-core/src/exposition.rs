//! Text exposition writer.
//!
//! Collectors build their snapshot through `Exposition`, which emits
//! `# HELP`/`# TYPE` headers once per family and renders samples with
//! escaped, order-preserving labels.

use std::collections::HashSet;
use std::fmt::Write;

/// Metric family type as rendered in `# TYPE` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Helper to escape label values.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// Snapshot builder.
#[derive(Debug, Default)]
pub struct Exposition {
    out: String,
    declared: HashSet<String>,
}

impl Exposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a family. Repeated declarations of the same name are ignored.
    pub fn family(&mut self, name: &str, kind: MetricKind, help: &str) -> &mut Self {
        if self.declared.insert(name.to_string()) {
            if !help.is_empty() {
                let _ = writeln!(self.out, "# HELP {} {}", name, escape_help(help));
            }
            let _ = writeln!(self.out, "# TYPE {} {}", name, kind.as_str());
        }
        self
    }

    /// Append one sample line.
    pub fn sample(&mut self, name: &str, labels: &[(&str, &str)], value: f64) -> &mut Self {
        if labels.is_empty() {
            let _ = writeln!(self.out, "{} {}", name, format_value(value));
        } else {
            let label_str = labels
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(self.out, "{}{{{}}} {}", name, label_str, format_value(value));
        }
        self
    }

    /// Append pre-rendered exposition text, terminating it with a newline.
    pub fn raw(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        if !text.is_empty() && !text.ends_with('\n') {
            self.out.push('\n');
        }
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}
