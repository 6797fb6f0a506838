//! Configuration loader for ads-reporter
//!
//! Layers are merged from lowest to highest priority:
//! defaults, YAML file, environment variables, CLI overrides.

use super::config::{AdsConfig, ConfigFile};
use super::error::ConfigError;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name looked up in the working directory
pub const CONFIG_FILENAME: &str = "ads-config.yaml";

/// Environment variable pattern (${VAR_NAME})
const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Environment variables understood by the loader
const ENV_DEVELOPER_TOKEN: &str = "ADS_DEVELOPER_TOKEN";
const ENV_LOGIN_CUSTOMER_ID: &str = "ADS_LOGIN_CUSTOMER_ID";
const ENV_CUSTOMER_ID: &str = "ADS_CUSTOMER_ID";
const ENV_SERVICE_ACCOUNT_FILE: &str = "ADS_SERVICE_ACCOUNT_FILE";
const ENV_SCOPES: &str = "ADS_SCOPES";
const ENV_API_VERSION: &str = "ADS_API_VERSION";

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Explicit config file; when unset, `./ads-config.yaml` is used if present
    pub config_path: Option<PathBuf>,

    /// CLI overrides (highest priority)
    pub cli_args: Option<ConfigFile>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

impl ConfigLoadOptions {
    /// Options populated from the process environment
    pub fn from_process_env() -> Self {
        Self {
            env: std::env::vars().collect(),
            ..Default::default()
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    pub async fn load(options: ConfigLoadOptions) -> Result<AdsConfig, ConfigError> {
        let mut merged = ConfigFile::default();

        let file_config = match &options.config_path {
            // An explicitly requested file must exist
            Some(path) => Some(Self::load_config_file(path, &options.env).await?),
            None => {
                let default_path = Path::new(CONFIG_FILENAME);
                if fs::try_exists(default_path).await.unwrap_or(false) {
                    Some(Self::load_config_file(default_path, &options.env).await?)
                } else {
                    None
                }
            }
        };
        if let Some(file_config) = file_config {
            merged.merge(file_config);
        }

        if let Some(env_config) = Self::load_env_config(&options.env) {
            merged.merge(env_config);
        }

        if let Some(cli_config) = options.cli_args {
            merged.merge(cli_config);
        }

        let config = merged.resolve();
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Load one YAML layer, then expand `${VAR}` placeholders in its values
    async fn load_config_file(
        path: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ConfigFile, ConfigError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let parsed: ConfigFile =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Self::expand_config(parsed, env)
    }

    /// Expand placeholders field by field; comments never reach this point
    fn expand_config(
        config: ConfigFile,
        env: &HashMap<String, String>,
    ) -> Result<ConfigFile, ConfigError> {
        let env_var_regex =
            Regex::new(ENV_VAR_PATTERN).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let expand = |value: Option<String>| {
            value
                .map(|v| Self::expand_env_vars(&env_var_regex, &v, env))
                .transpose()
        };

        let service_account_file = match config.service_account_file {
            Some(path) => {
                let raw = path.to_string_lossy().into_owned();
                Some(PathBuf::from(Self::expand_env_vars(&env_var_regex, &raw, env)?))
            }
            None => None,
        };
        let scopes = match config.scopes {
            Some(scopes) => Some(
                scopes
                    .iter()
                    .map(|scope| Self::expand_env_vars(&env_var_regex, scope, env))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok(ConfigFile {
            developer_token: expand(config.developer_token)?,
            login_customer_id: expand(config.login_customer_id)?,
            customer_id: expand(config.customer_id)?,
            service_account_file,
            scopes,
            api_endpoint: expand(config.api_endpoint)?,
            api_version: expand(config.api_version)?,
            request_timeout_secs: config.request_timeout_secs,
        })
    }

    /// Load configuration from environment variables
    fn load_env_config(env: &HashMap<String, String>) -> Option<ConfigFile> {
        let get = |name: &str| {
            env.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = ConfigFile {
            developer_token: get(ENV_DEVELOPER_TOKEN),
            login_customer_id: get(ENV_LOGIN_CUSTOMER_ID),
            customer_id: get(ENV_CUSTOMER_ID),
            service_account_file: get(ENV_SERVICE_ACCOUNT_FILE).map(PathBuf::from),
            scopes: get(ENV_SCOPES).map(|s| s.split(',').map(|p| p.trim().to_string()).collect()),
            api_version: get(ENV_API_VERSION),
            ..Default::default()
        };

        if config == ConfigFile::default() {
            None
        } else {
            Some(config)
        }
    }

    /// Expand `${VAR}` placeholders in one value; an unset variable is an error
    fn expand_env_vars(
        env_var_regex: &Regex,
        input: &str,
        env: &HashMap<String, String>,
    ) -> Result<String, ConfigError> {
        if let Some(missing) = env_var_regex
            .captures_iter(input)
            .map(|cap| cap[1].to_string())
            .find(|name| !env.contains_key(name))
        {
            return Err(ConfigError::MissingEnvVar(missing));
        }

        Ok(env_var_regex
            .replace_all(input, |cap: &regex::Captures| env[&cap[1]].clone())
            .into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let file = write_yaml(
            "developer_token: dev-token-value\nlogin_customer_id: \"6385295998\"\ncustomer_id: \"1849790507\"\n",
        );

        let config = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(config.developer_token.expose_secret(), "dev-token-value");
        assert_eq!(config.login_customer_id, "6385295998");
        assert_eq!(config.customer_id, "1849790507");
    }

    #[tokio::test]
    async fn test_env_overrides_file_and_cli_overrides_env() {
        let file = write_yaml("customer_id: \"1111111111\"\napi_version: v18\n");
        let env = HashMap::from([
            (ENV_CUSTOMER_ID.to_string(), "2222222222".to_string()),
            (ENV_API_VERSION.to_string(), "v19".to_string()),
        ]);

        let config = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(file.path().to_path_buf()),
            cli_args: Some(ConfigFile {
                customer_id: Some("3333333333".to_string()),
                ..Default::default()
            }),
            env,
        })
        .await
        .unwrap();

        assert_eq!(config.customer_id, "3333333333");
        assert_eq!(config.api_version, "v19");
    }

    #[tokio::test]
    async fn test_env_var_expansion() {
        let file = write_yaml("developer_token: ${ADS_TEST_TOKEN}\n");
        let env = HashMap::from([("ADS_TEST_TOKEN".to_string(), "expanded".to_string())]);

        let config = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(file.path().to_path_buf()),
            env,
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(config.developer_token.expose_secret(), "expanded");
    }

    #[tokio::test]
    async fn test_missing_env_var_is_error() {
        let file = write_yaml("developer_token: ${ADS_UNSET_TOKEN}\n");

        let result = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        })
        .await;

        assert!(matches!(result, Err(ConfigError::MissingEnvVar(name)) if name == "ADS_UNSET_TOKEN"));
    }

    #[tokio::test]
    async fn test_placeholder_in_comment_is_ignored() {
        let file = write_yaml(
            "# ${VAR} placeholders are read from the environment\n\
             # developer_token: ${ADS_COMMENTED_OUT}\n\
             customer_id: \"1849790507\"\n",
        );

        let config = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(config.customer_id, "1849790507");
    }

    #[tokio::test]
    async fn test_shipped_example_config_loads() {
        let env = HashMap::from([(
            ENV_DEVELOPER_TOKEN.to_string(),
            "example-dev-token".to_string(),
        )]);

        let config = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/ads-config.example.yaml"
            ))),
            env,
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(config.developer_token.expose_secret(), "example-dev-token");
        assert_eq!(config.login_customer_id, "638-529-5998");
        assert_eq!(config.customer_id, "184-979-0507");
        assert_eq!(config.api_version, "v19");
    }

    #[tokio::test]
    async fn test_placeholders_expand_in_path_and_scopes() {
        let file = write_yaml(
            "service_account_file: ${ADS_KEY_DIR}/key.json\nscopes:\n  - ${ADS_SCOPE}\n",
        );
        let env = HashMap::from([
            ("ADS_KEY_DIR".to_string(), "/etc/ads".to_string()),
            ("ADS_SCOPE".to_string(), "scope-x".to_string()),
        ]);

        let config = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(file.path().to_path_buf()),
            env,
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(config.service_account_file, PathBuf::from("/etc/ads/key.json"));
        assert!(config.scopes.contains("scope-x"));
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_error() {
        let result = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/ads-config.yaml")),
            ..Default::default()
        })
        .await;

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_parse_error() {
        let file = write_yaml("customer_id: [unclosed\n");

        let result = ConfigLoader::load(ConfigLoadOptions {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        })
        .await;

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_scopes_are_split() {
        let env = HashMap::from([(
            ENV_SCOPES.to_string(),
            "scope-a, scope-b".to_string(),
        )]);
        let config = ConfigLoader::load_env_config(&env).unwrap();
        assert_eq!(
            config.scopes,
            Some(vec!["scope-a".to_string(), "scope-b".to_string()])
        );
    }

    #[test]
    fn test_empty_env_yields_no_layer() {
        assert!(ConfigLoader::load_env_config(&HashMap::new()).is_none());
    }
}
