/// Default OAuth scope requested for the client-credentials grant.
pub const DEFAULT_SCOPE: &str = "monitoring management control";

/// Connection settings for the script registry.
#[derive(Clone)]
pub struct RegistryConfig {
    /// Base URL of the instance, e.g. `https://eu.ninjarmm.com`.
    pub instance_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
}

impl RegistryConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default                         |
    /// |--------------------------|----------|---------------------------------|
    /// | `NINJAONE_INSTANCE_URL`  | yes      | --                              |
    /// | `NINJAONE_CLIENT_ID`     | yes      | --                              |
    /// | `NINJAONE_CLIENT_SECRET` | yes      | --                              |
    /// | `NINJAONE_SCOPE`         | no       | `monitoring management control` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Blank values
    /// count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let instance_url = required("NINJAONE_INSTANCE_URL")?
            .trim_end_matches('/')
            .to_string();
        let client_id = required("NINJAONE_CLIENT_ID")?;
        let client_secret = required("NINJAONE_CLIENT_SECRET")?;
        let scope = lookup("NINJAONE_SCOPE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string());

        Ok(Self {
            instance_url,
            client_id,
            client_secret,
            scope,
        })
    }
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("instance_url", &self.instance_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}
