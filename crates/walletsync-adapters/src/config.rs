#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeProfile {
    #[default]
    Development,
    Production,
}

impl RuntimeProfile {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(RuntimeProfile::Development),
            "production" | "prod" => Some(RuntimeProfile::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub runtime_profile: RuntimeProfile,
    /// JSON-RPC endpoint standing in for `window.ethereum` on native targets.
    pub eip1193_proxy_url: Option<String>,
    pub rpc_timeout_ms: u64,
    pub project_id: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            eip1193_proxy_url: None,
            rpc_timeout_ms: 15_000,
            project_id: String::new(),
        }
    }
}

impl AdapterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let runtime_profile = std::env::var("WALLETSYNC_RUNTIME_PROFILE")
            .ok()
            .and_then(|raw| RuntimeProfile::parse(&raw))
            .unwrap_or(defaults.runtime_profile);
        let eip1193_proxy_url = std::env::var("WALLETSYNC_EIP1193_PROXY_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let rpc_timeout_ms = std::env::var("WALLETSYNC_RPC_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.rpc_timeout_ms);
        let project_id = std::env::var("WALLETSYNC_PROJECT_ID").unwrap_or(defaults.project_id);
        Self {
            runtime_profile,
            eip1193_proxy_url,
            rpc_timeout_ms,
            project_id,
        }
    }

    /// Production refuses to fall back to the deterministic wallet.
    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_names_are_case_insensitive() {
        assert_eq!(
            RuntimeProfile::parse("Production"),
            Some(RuntimeProfile::Production)
        );
        assert_eq!(RuntimeProfile::parse("dev"), Some(RuntimeProfile::Development));
        assert_eq!(RuntimeProfile::parse("staging"), None);
    }

    #[test]
    fn only_production_is_strict() {
        assert!(!AdapterConfig::default().strict_runtime_required());
        let cfg = AdapterConfig {
            runtime_profile: RuntimeProfile::Production,
            ..AdapterConfig::default()
        };
        assert!(cfg.strict_runtime_required());
    }
}
