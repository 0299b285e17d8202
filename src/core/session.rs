use std::env;

use reqwest::Client;

use crate::core::config::Config;
use crate::core::constants::{BASE_URL_ENV, CREDENTIAL_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::utils::logging::LoggingState;

/// Everything one running chat session needs: HTTP client, resolved model
/// and endpoint, the optional credential, and the transcript logger.
///
/// The credential may be absent here; its absence is surfaced at send time
/// rather than at startup, so the interactive loop can still browse local
/// conversations.
pub struct SessionContext {
    pub client: Client,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub logging: LoggingState,
}

impl SessionContext {
    /// Resolve session settings. Precedence is CLI flag, then config file,
    /// then built-in default; the credential and base URL also honor their
    /// environment variables.
    pub fn resolve(
        model_flag: Option<String>,
        log_file: Option<String>,
        config: &Config,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Self::resolve_with_env(model_flag, log_file, config, |name| env::var(name).ok())
    }

    /// Resolution with the environment lookup injected, so tests can run
    /// against a fixed environment instead of the process's.
    fn resolve_with_env(
        model_flag: Option<String>,
        log_file: Option<String>,
        config: &Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let api_key = env(CREDENTIAL_ENV).filter(|key| !key.trim().is_empty());

        let base_url = env(BASE_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .or_else(|| config.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = model_flag
            .or_else(|| config.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let logging = LoggingState::new(log_file)?;

        Ok(Self {
            client: Client::new(),
            model,
            api_key,
            base_url,
            logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_in(
        model_flag: Option<&str>,
        config: &Config,
        vars: &[(&str, &str)],
    ) -> SessionContext {
        SessionContext::resolve_with_env(
            model_flag.map(str::to_string),
            None,
            config,
            |name| {
                vars.iter()
                    .find(|(var, _)| *var == name)
                    .map(|(_, value)| value.to_string())
            },
        )
        .expect("session resolves")
    }

    #[test]
    fn model_precedence_is_flag_then_config_then_default() {
        let mut config = Config::default();

        assert_eq!(resolve_in(None, &config, &[]).model, DEFAULT_MODEL);

        config.default_model = Some("config-model".to_string());
        assert_eq!(resolve_in(None, &config, &[]).model, "config-model");

        assert_eq!(
            resolve_in(Some("flag-model"), &config, &[]).model,
            "flag-model"
        );
    }

    #[test]
    fn base_url_precedence_is_env_then_config_then_default() {
        let config = Config::default();
        assert_eq!(resolve_in(None, &config, &[]).base_url, DEFAULT_BASE_URL);

        let config = Config {
            base_url: Some("https://example.test/v1".to_string()),
            ..Config::default()
        };
        assert_eq!(
            resolve_in(None, &config, &[]).base_url,
            "https://example.test/v1"
        );

        assert_eq!(
            resolve_in(None, &config, &[(BASE_URL_ENV, "https://env.test/v1")]).base_url,
            "https://env.test/v1"
        );
    }

    #[test]
    fn blank_credentials_count_as_absent() {
        let config = Config::default();
        assert!(resolve_in(None, &config, &[]).api_key.is_none());
        assert!(resolve_in(None, &config, &[(CREDENTIAL_ENV, "   ")])
            .api_key
            .is_none());
        assert_eq!(
            resolve_in(None, &config, &[(CREDENTIAL_ENV, "sk-test")]).api_key,
            Some("sk-test".to_string())
        );
    }
}
