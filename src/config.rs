use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL for the experiences store
    pub database_url: String,

    /// Password for the experiences store, kept out of the URL
    pub database_password: String,

    /// Maximum number of pooled database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Bearer credential for the chat completion API
    pub llm_api_key: String,

    /// Base URL of an OpenAI-compatible chat completion API
    #[serde(default = "default_llm_api_url")]
    pub llm_api_url: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_llm_api_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects blank endpoints and credentials so startup fails instead of the first request
    pub fn validate(&self) -> anyhow::Result<()> {
        let required = [
            ("DATABASE_URL", &self.database_url),
            ("LLM_API_KEY", &self.llm_api_key),
            ("LLM_API_URL", &self.llm_api_url),
            ("LLM_MODEL", &self.llm_model),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("Failed to load config: {} must not be empty", name);
            }
        }

        if self.db_max_connections == 0 {
            anyhow::bail!("Failed to load config: DB_MAX_CONNECTIONS must be at least 1");
        }

        Ok(())
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            ("DATABASE_URL".to_string(), "postgres://app@db.local:5432/app".to_string()),
            ("DATABASE_PASSWORD".to_string(), "secret".to_string()),
            ("LLM_API_KEY".to_string(), "gsk_test".to_string()),
        ];
        for (k, v) in extra {
            vars.retain(|(name, _)| name != k);
            vars.push((k.to_string(), v.to_string()));
        }
        vars
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(vars(&[])).unwrap();
        config.validate().unwrap();

        assert_eq!(config.llm_api_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.llm_model, "llama3-8b-8192");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_missing_credential_fails() {
        let without_key: Vec<(String, String)> = vars(&[])
            .into_iter()
            .filter(|(name, _)| name != "LLM_API_KEY")
            .collect();

        assert!(envy::from_iter::<_, Config>(without_key).is_err());
    }

    #[test]
    fn test_blank_credential_rejected() {
        let config: Config = envy::from_iter(vars(&[("LLM_API_KEY", "  ")])).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("LLM_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let config: Config = envy::from_iter(vars(&[
            ("PORT", "9090"),
            ("LLM_MODEL", "llama-3.1-8b-instant"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.llm_model, "llama-3.1-8b-instant");
    }
}
