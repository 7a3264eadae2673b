use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Output shape of the log stream: human-readable lines or one JSON object
/// per line for downstream collectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    Plain,
    Json,
}

impl LogFormat {
    /// Only the literal `json` (any case) selects structured output.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(raw) if raw.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Plain,
        }
    }
}

/// Install the global tracing subscriber. Safe to call more than once; only
/// the first installation wins.
pub fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose {
        "rum_loadgen=debug"
    } else {
        "rum_loadgen=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Plain => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .json()
                .flatten_event(true)
                .with_env_filter(filter)
                .with_target(false)
                .try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_opt_in() {
        assert_eq!(LogFormat::parse(None), LogFormat::Plain);
        assert_eq!(LogFormat::parse(Some("plain")), LogFormat::Plain);
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("jsonl")), LogFormat::Plain);
    }
}
