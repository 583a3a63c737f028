use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-container settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Label attached to log lines of this container (e.g., "settings").
    #[serde(default)]
    pub name: Option<String>,
    /// What happens when a subscriber panics during delivery.
    #[serde(default)]
    pub fault_policy: FaultPolicy,
}

/// Handling of a subscriber that panics while being notified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Log the panic and keep delivering to the remaining subscribers.
    #[default]
    Isolate,
    /// Skip the remaining subscribers and resume the panic.
    Propagate,
}

/// Tracing output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Include the event target in output (default: true).
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_with_target() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            with_target: default_with_target(),
        }
    }
}
