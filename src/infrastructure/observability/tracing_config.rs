/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub debug: bool,
}

impl TracingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub fn default_filter(&self) -> &'static str {
        if self.debug {
            "info,stt_lanes=debug,tower_http=debug"
        } else {
            "info"
        }
    }
}

/// Debug output is on only for the literal value `true` (any case).
pub fn debug_enabled(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}
