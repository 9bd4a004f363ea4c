//! In-process tool call metrics, rendered in Prometheus text format.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::netbox::CacheStats;

/// How a tool call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    DryRun,
    Error(&'static str),
}

#[derive(Debug, Default, Clone)]
struct ToolStats {
    calls: u64,
    dry_runs: u64,
    errors: BTreeMap<&'static str, u64>,
    seconds: f64,
}

/// Counters for tool dispatch.
pub struct Metrics {
    started: Instant,
    tools: Mutex<BTreeMap<String, ToolStats>>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            tools: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record one finished call.
    pub fn record(&self, tool: &str, outcome: CallOutcome, elapsed: Duration) {
        let mut tools = self.tools.lock().unwrap_or_else(|p| p.into_inner());
        let stats = tools.entry(tool.to_string()).or_default();
        stats.calls += 1;
        stats.seconds += elapsed.as_secs_f64();
        match outcome {
            CallOutcome::Success => {}
            CallOutcome::DryRun => stats.dry_runs += 1,
            CallOutcome::Error(tag) => *stats.errors.entry(tag).or_default() += 1,
        }
    }

    /// Total calls recorded for a tool.
    pub fn calls(&self, tool: &str) -> u64 {
        self.tools
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(tool)
            .map_or(0, |s| s.calls)
    }

    /// Prometheus exposition text.
    pub fn render(&self, cache: Option<CacheStats>) -> String {
        let tools = self
            .tools
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        let mut out = String::new();

        let _ = writeln!(out, "# HELP netbox_mcp_uptime_seconds Seconds since the server started.");
        let _ = writeln!(out, "# TYPE netbox_mcp_uptime_seconds gauge");
        let _ = writeln!(out, "netbox_mcp_uptime_seconds {:.3}", self.started.elapsed().as_secs_f64());

        let _ = writeln!(out, "# HELP netbox_mcp_tool_calls_total Tool calls dispatched.");
        let _ = writeln!(out, "# TYPE netbox_mcp_tool_calls_total counter");
        for (name, stats) in &tools {
            let _ = writeln!(out, "netbox_mcp_tool_calls_total{{tool=\"{name}\"}} {}", stats.calls);
        }

        let _ = writeln!(out, "# HELP netbox_mcp_tool_dry_runs_total Write tools answered with a preview.");
        let _ = writeln!(out, "# TYPE netbox_mcp_tool_dry_runs_total counter");
        for (name, stats) in &tools {
            let _ = writeln!(out, "netbox_mcp_tool_dry_runs_total{{tool=\"{name}\"}} {}", stats.dry_runs);
        }

        let _ = writeln!(out, "# HELP netbox_mcp_tool_errors_total Failed tool calls by error type.");
        let _ = writeln!(out, "# TYPE netbox_mcp_tool_errors_total counter");
        for (name, stats) in &tools {
            for (tag, count) in &stats.errors {
                let _ = writeln!(
                    out,
                    "netbox_mcp_tool_errors_total{{tool=\"{name}\",type=\"{tag}\"}} {count}"
                );
            }
        }

        let _ = writeln!(out, "# HELP netbox_mcp_tool_duration_seconds_sum Time spent in tool calls.");
        let _ = writeln!(out, "# TYPE netbox_mcp_tool_duration_seconds_sum counter");
        for (name, stats) in &tools {
            let _ = writeln!(
                out,
                "netbox_mcp_tool_duration_seconds_sum{{tool=\"{name}\"}} {:.6}",
                stats.seconds
            );
        }

        if let Some(cache) = cache {
            let _ = writeln!(out, "# HELP netbox_mcp_cache_hits_total NetBox read cache hits.");
            let _ = writeln!(out, "# TYPE netbox_mcp_cache_hits_total counter");
            let _ = writeln!(out, "netbox_mcp_cache_hits_total {}", cache.hits);
            let _ = writeln!(out, "# HELP netbox_mcp_cache_misses_total NetBox read cache misses.");
            let _ = writeln!(out, "# TYPE netbox_mcp_cache_misses_total counter");
            let _ = writeln!(out, "netbox_mcp_cache_misses_total {}", cache.misses);
            let _ = writeln!(out, "# HELP netbox_mcp_cache_entries Live cache entries.");
            let _ = writeln!(out, "# TYPE netbox_mcp_cache_entries gauge");
            let _ = writeln!(out, "netbox_mcp_cache_entries {}", cache.entries);
        }

        out
    }
}
