//! Server configuration.
//!
//! Loaded from `COVENANT_*` environment variables. Unset or blank variables
//! keep their defaults; values that are present but malformed fail startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use covenant_core::{Error, Result};
use covenant_service::WorkflowSettings;
use covenant_service::workflow::{
    DEFAULT_REVISION, DEFAULT_WORKFLOW_NAMESPACE, DEFAULT_WORKFLOW_TEMPLATE,
};

/// Database path that selects a throwaway in-memory store.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Port the gRPC server listens on.
    pub grpc_port: u16,
    /// Development mode: pretty logs, in-memory database allowed.
    pub debug: bool,
    /// SQLite database file, or `:memory:` in debug mode.
    pub db_path: String,
    /// Host of the CSP-info service; creation is disabled when unset.
    pub info_address: Option<String>,
    /// Port of the CSP-info service.
    pub info_port: u16,
    /// Host of the Argo server; creation is disabled when unset.
    pub argo_address: Option<String>,
    /// Port of the Argo server.
    pub argo_port: u16,
    /// Workflow template submitted for new contracts.
    pub workflow_template: String,
    /// Namespace of the workflow template.
    pub workflow_namespace: String,
    /// Revision passed to the workflow.
    pub revision: String,
    /// Bound on each downstream call, in seconds.
    pub downstream_timeout_secs: u64,
    /// Create the default contract at startup when missing.
    pub seed_default_contract: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grpc_port: 9110,
            debug: false,
            db_path: "covenant.db".to_string(),
            info_address: None,
            info_port: 9111,
            argo_address: None,
            argo_port: 2746,
            workflow_template: DEFAULT_WORKFLOW_TEMPLATE.to_string(),
            workflow_namespace: DEFAULT_WORKFLOW_NAMESPACE.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            downstream_timeout_secs: 30,
            seed_default_contract: false,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a variable is present but cannot be parsed,
    /// or if the resulting configuration is inconsistent.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its
    /// raw value.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = env_u16(&lookup, "COVENANT_GRPC_PORT")? {
            config.grpc_port = port;
        }
        if let Some(debug) = env_bool(&lookup, "COVENANT_DEBUG")? {
            config.debug = debug;
        }
        if let Some(path) = env_string(&lookup, "COVENANT_DB_PATH") {
            config.db_path = path;
        }
        config.info_address = env_string(&lookup, "COVENANT_INFO_ADDRESS");
        if let Some(port) = env_u16(&lookup, "COVENANT_INFO_PORT")? {
            config.info_port = port;
        }
        config.argo_address = env_string(&lookup, "COVENANT_ARGO_ADDRESS");
        if let Some(port) = env_u16(&lookup, "COVENANT_ARGO_PORT")? {
            config.argo_port = port;
        }
        if let Some(template) = env_string(&lookup, "COVENANT_WORKFLOW_TEMPLATE") {
            config.workflow_template = template;
        }
        if let Some(namespace) = env_string(&lookup, "COVENANT_WORKFLOW_NAMESPACE") {
            config.workflow_namespace = namespace;
        }
        if let Some(revision) = env_string(&lookup, "COVENANT_REVISION") {
            config.revision = revision;
        }
        if let Some(secs) = env_u64(&lookup, "COVENANT_DOWNSTREAM_TIMEOUT_SECS")? {
            config.downstream_timeout_secs = secs;
        }
        if let Some(seed) = env_bool(&lookup, "COVENANT_SEED_DEFAULT_CONTRACT")? {
            config.seed_default_contract = seed;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero timeout or an in-memory database
    /// outside debug mode.
    pub fn validate(&self) -> Result<()> {
        if self.downstream_timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "COVENANT_DOWNSTREAM_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.uses_in_memory_db() && !self.debug {
            return Err(Error::InvalidInput(format!(
                "COVENANT_DB_PATH={IN_MEMORY_DB} requires COVENANT_DEBUG=true"
            )));
        }
        Ok(())
    }

    /// Returns true if the store should live in memory only.
    #[must_use]
    pub fn uses_in_memory_db(&self) -> bool {
        self.db_path == IN_MEMORY_DB
    }

    /// Returns the CSP-info endpoint URI, if configured.
    #[must_use]
    pub fn info_endpoint(&self) -> Option<String> {
        self.info_address
            .as_deref()
            .map(|host| endpoint_uri(host, self.info_port))
    }

    /// Returns the Argo server base URL, if configured.
    #[must_use]
    pub fn argo_base_url(&self) -> Option<String> {
        self.argo_address
            .as_deref()
            .map(|host| endpoint_uri(host, self.argo_port))
    }

    /// Returns the bound on each downstream call.
    #[must_use]
    pub const fn downstream_timeout(&self) -> Duration {
        Duration::from_secs(self.downstream_timeout_secs)
    }

    /// Returns the workflow submitted for new contracts.
    #[must_use]
    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            template: self.workflow_template.clone(),
            namespace: self.workflow_namespace.clone(),
            revision: self.revision.clone(),
        }
    }
}

/// Prefixes `http://` unless the host already carries a scheme.
fn endpoint_uri(host: &str, port: u16) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        format!("{host}:{port}")
    } else {
        format!("http://{host}:{port}")
    }
}

type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

fn env_string(lookup: &Lookup<'_>, name: &str) -> Option<String> {
    lookup(name).and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(lookup: &Lookup<'_>, name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(lookup, name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u16: {e}")))
}

fn env_u64(lookup: &Lookup<'_>, name: &str) -> Result<Option<u64>> {
    let Some(v) = env_string(lookup, name) else {
        return Ok(None);
    };
    v.parse::<u64>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u64: {e}")))
}

fn env_bool(lookup: &Lookup<'_>, name: &str) -> Result<Option<bool>> {
    let Some(v) = env_string(lookup, name) else {
        return Ok(None);
    };
    parse_bool(name, &v).map(Some)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() -> Result<()> {
        let config = load(&[])?;
        assert_eq!(config, Config::default());
        assert_eq!(config.grpc_port, 9110);
        assert_eq!(config.info_port, 9111);
        assert_eq!(config.argo_port, 2746);
        assert!(config.info_endpoint().is_none());
        assert!(config.argo_base_url().is_none());
        assert_eq!(config.downstream_timeout(), Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn variables_override_defaults() -> Result<()> {
        let config = load(&[
            ("COVENANT_GRPC_PORT", "7000"),
            ("COVENANT_INFO_ADDRESS", "cspinfo.svc"),
            ("COVENANT_ARGO_ADDRESS", "https://argo.example"),
            ("COVENANT_ARGO_PORT", "443"),
            ("COVENANT_WORKFLOW_TEMPLATE", "custom-template"),
            ("COVENANT_REVISION", "v1.2"),
            ("COVENANT_DOWNSTREAM_TIMEOUT_SECS", "5"),
            ("COVENANT_SEED_DEFAULT_CONTRACT", "yes"),
        ])?;
        assert_eq!(config.grpc_port, 7000);
        assert_eq!(
            config.info_endpoint().as_deref(),
            Some("http://cspinfo.svc:9111")
        );
        assert_eq!(
            config.argo_base_url().as_deref(),
            Some("https://argo.example:443")
        );
        assert_eq!(config.workflow_settings().template, "custom-template");
        assert_eq!(config.workflow_settings().namespace, "argo");
        assert_eq!(config.workflow_settings().revision, "v1.2");
        assert_eq!(config.downstream_timeout(), Duration::from_secs(5));
        assert!(config.seed_default_contract);
        Ok(())
    }

    #[test]
    fn blank_values_are_ignored() -> Result<()> {
        let config = load(&[("COVENANT_INFO_ADDRESS", "  "), ("COVENANT_GRPC_PORT", "")])?;
        assert!(config.info_address.is_none());
        assert_eq!(config.grpc_port, 9110);
        Ok(())
    }

    #[test]
    fn malformed_values_fail() {
        for vars in [
            [("COVENANT_GRPC_PORT", "http")],
            [("COVENANT_DEBUG", "maybe")],
            [("COVENANT_DOWNSTREAM_TIMEOUT_SECS", "-1")],
        ] {
            let err = load(&vars).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{vars:?}");
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = load(&[("COVENANT_DOWNSTREAM_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn in_memory_db_requires_debug() -> Result<()> {
        let err = load(&[("COVENANT_DB_PATH", ":memory:")]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let config = load(&[("COVENANT_DB_PATH", ":memory:"), ("COVENANT_DEBUG", "true")])?;
        assert!(config.uses_in_memory_db());
        Ok(())
    }
}
