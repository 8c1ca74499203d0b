// Optional structured trace hook, enabled with HISTSH_TRACE=1. One JSON
// line per public operation, on stderr; off by default with no behavioral
// effect.

use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Value;

static ENABLED: OnceLock<bool> = OnceLock::new();

pub fn enabled() -> bool {
    *ENABLED.get_or_init(|| {
        std::env::var("HISTSH_TRACE")
            .map(|v| v != "0")
            .unwrap_or(false)
    })
}

#[derive(Serialize)]
struct TraceEvent<'a> {
    op: &'a str,
    pid: u32,
    #[serde(skip_serializing_if = "Value::is_null")]
    detail: Value,
}

pub fn event(op: &str, detail: Value) {
    if !enabled() {
        return;
    }
    let ev = TraceEvent {
        op,
        pid: std::process::id(),
        detail,
    };
    if let Ok(line) = serde_json::to_string(&ev) {
        eprintln!("[trace] {line}");
    }
}
