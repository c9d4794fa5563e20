use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shape of the log lines written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines with file and line numbers.
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

impl LogFormat {
    /// JSON in production, pretty everywhere else.
    pub fn for_environment(environment: &str) -> Self {
        if environment.trim().eq_ignore_ascii_case("production") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Filter used when `RUST_LOG` is unset: the service's own crate at debug,
/// request traces at debug, everything else at info.
pub fn default_filter(service_name: &str) -> String {
    let crate_target = service_name.replace('-', "_");
    format!("info,{crate_target}=debug,grace_shared=debug,tower_http=debug")
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(service_name: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true).with_current_span(true))
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }

    tracing::info!(service = service_name, format = ?format, "tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_logs_json() {
        assert_eq!(LogFormat::for_environment("production"), LogFormat::Json);
        assert_eq!(LogFormat::for_environment(" PRODUCTION "), LogFormat::Json);
        assert_eq!(LogFormat::for_environment("development"), LogFormat::Pretty);
        assert_eq!(LogFormat::for_environment(""), LogFormat::Pretty);
    }

    #[test]
    fn default_filter_targets_the_service_crate() {
        let filter = default_filter("grace-portal");
        assert!(filter.contains("grace_portal=debug"));
        assert!(EnvFilter::try_new(&filter).is_ok());
    }
}
