//! Server configuration: port, response variant, and model source.
//!
//! Resolution order is CLI args, then environment, then defaults, matching
//! how the rest of the service reads its knobs.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// Response variant selects the reply envelope and input sourcing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Three risk tiers, `hour` read from the query (default 12), silent
    /// defaulting of malformed input, plain-text liveness at `/`.
    #[default]
    Standard,
    /// Two risk tiers, `hour` taken from the server clock, any failure
    /// converted to a fixed degraded reply.
    Reduced,
}

impl Variant {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "reduced" => Some(Self::Reduced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Reduced => "reduced",
        }
    }
}

/// Where the delegate classifier comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Train the five-row logistic model in-process at startup.
    Builtin,
    /// Load a JSON model from disk. A missing file means heuristic mode.
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub variant: Variant,
    pub model: ModelSource,
}

impl ServerConfig {
    /// Resolve configuration from CLI args and the process environment.
    pub fn from_args(args: &[String]) -> Self {
        let port: u16 = arg_value(args, &["--port", "-p"])
            .and_then(|s| s.parse().ok())
            .or_else(|| std::env::var("PORT").ok().and_then(|s| s.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let variant = arg_value(args, &["--variant"])
            .as_deref()
            .and_then(Variant::from_str)
            .or_else(|| {
                std::env::var("RISK_VARIANT")
                    .ok()
                    .as_deref()
                    .and_then(Variant::from_str)
            })
            .unwrap_or_default();

        let model = if args.iter().any(|a| a == "--builtin-model") {
            ModelSource::Builtin
        } else {
            let path = arg_value(args, &["--model", "-m"])
                .or_else(|| std::env::var("RISK_MODEL_PATH").ok())
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
            ModelSource::File(PathBuf::from(path))
        };

        Self {
            port,
            variant,
            model,
        }
    }
}

/// Value following any of the given flags, e.g. `--port 8080`.
fn arg_value(args: &[String], flags: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| flags.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_port_from_cli() {
        let config = ServerConfig::from_args(&args(&["bin", "--port", "8080"]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_port_short_flag() {
        let config = ServerConfig::from_args(&args(&["bin", "-p", "9000"]));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_unparsable_port_falls_back_to_default() {
        let config = ServerConfig::from_args(&args(&["bin", "--port", "not-a-port"]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_variant_from_cli() {
        let config = ServerConfig::from_args(&args(&["bin", "--variant", "reduced"]));
        assert_eq!(config.variant, Variant::Reduced);
    }

    #[test]
    fn test_unknown_variant_defaults_to_standard() {
        let config = ServerConfig::from_args(&args(&["bin", "--variant", "experimental"]));
        assert_eq!(config.variant, Variant::Standard);
    }

    #[test]
    fn test_builtin_model_flag_wins_over_path() {
        let config =
            ServerConfig::from_args(&args(&["bin", "--builtin-model", "-m", "other.json"]));
        assert_eq!(config.model, ModelSource::Builtin);
    }

    #[test]
    fn test_model_path_from_cli() {
        let config = ServerConfig::from_args(&args(&["bin", "--model", "trained.json"]));
        assert_eq!(config.model, ModelSource::File(PathBuf::from("trained.json")));
    }

    #[test]
    fn test_variant_round_trip() {
        for variant in [Variant::Standard, Variant::Reduced] {
            assert_eq!(Variant::from_str(variant.as_str()), Some(variant));
        }
        assert_eq!(Variant::from_str("REDUCED"), Some(Variant::Reduced));
        assert_eq!(Variant::from_str("full"), None);
    }
}
