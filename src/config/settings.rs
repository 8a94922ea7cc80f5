//! TOML-based configuration for sqlbench.
//!
//! Supports a config file (sqlbench.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! default_environment = "uat"
//!
//! [server]
//! base_url = "https://workbench.example.com"
//! query_path = "/trino"
//!
//! [query]
//! row_limit = 500
//! format = "json"
//!
//! [cache]
//! describe_ttl_seconds = 7200
//! resource_ttl_seconds = 300
//!
//! [credentials]
//! user = "${TRINO_USER}"
//! password = "${TRINO_PASSWORD}"
//! extra = [["catalog.token", "$CATALOG_TOKEN"]]
//!
//! [[environments]]
//! id = "uat"
//! name = "UAT"
//! cluster = "uat"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{DescribeCache, DESCRIBE_CACHE_TTL};
use crate::engine::{EngineAdapter, RemoteRunner};
use crate::resource::{HttpFetcher, ResourceFetcher, ResourceReader, RESOURCE_CACHE_TTL};
use crate::transport::{
    join_url, Credentials, ExtraCredential, HttpTransport, QueryTransport, ResultFormat, Session,
    DEFAULT_QUERY_PATH,
};

/// Engine connection over HTTP, as built by [`Settings::connect`].
pub type HttpConnection = EngineAdapter<RemoteRunner<HttpTransport>, ResourceReader<HttpFetcher>>;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SQLBENCH_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,

    pub query: QuerySettings,

    pub cache: CacheSettings,

    /// Environment used when none is requested.
    pub default_environment: String,

    /// Known engine environments, in display order.
    pub environments: Vec<Environment>,

    pub credentials: CredentialSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            query: QuerySettings::default(),
            cache: CacheSettings::default(),
            default_environment: "uat".to_string(),
            environments: default_environments(),
            credentials: CredentialSettings::default(),
        }
    }
}

fn default_environments() -> Vec<Environment> {
    [("local", "Local"), ("uat", "UAT"), ("prod", "Prod")]
        .into_iter()
        .map(|(id, name)| Environment {
            id: id.to_string(),
            name: name.to_string(),
            cluster: id.to_string(),
        })
        .collect()
}

/// Query endpoint location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub base_url: String,

    pub query_path: String,

    /// Base for `internal://` and `malloy://` resources. Defaults to `base_url`.
    pub asset_base_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            query_path: DEFAULT_QUERY_PATH.to_string(),
            asset_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Default row cap for bounded queries.
    pub row_limit: u64,

    pub format: ResultFormat,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            row_limit: 1000,
            format: ResultFormat::Arrow,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub describe_ttl_seconds: u64,

    pub resource_ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            describe_ttl_seconds: DESCRIBE_CACHE_TTL.as_secs(),
            resource_ttl_seconds: RESOURCE_CACHE_TTL.as_secs(),
        }
    }
}

impl CacheSettings {
    pub fn describe_ttl(&self) -> Duration {
        Duration::from_secs(self.describe_ttl_seconds)
    }

    pub fn resource_ttl(&self) -> Duration {
        Duration::from_secs(self.resource_ttl_seconds)
    }
}

/// A named engine environment (cluster).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    pub cluster: String,
}

/// Credentials forwarded with every query.
///
/// `user`, `password` and extra values support `${VAR}` expansion.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub user: String,

    pub password: String,

    /// Auxiliary `[key, value]` pairs, sent in order.
    pub extra: Vec<ExtraCredential>,
}

impl CredentialSettings {
    /// Credentials with environment variables expanded.
    pub fn resolve(&self) -> Result<(Credentials, Vec<ExtraCredential>), SettingsError> {
        let credentials = Credentials::new(
            expand_env_vars(&self.user)?,
            expand_env_vars(&self.password)?,
        );
        let extra = self
            .extra
            .iter()
            .map(|(key, value)| Ok((key.clone(), expand_env_vars(value)?)))
            .collect::<Result<Vec<_>, SettingsError>>()?;
        Ok((credentials, extra))
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SQLBENCH_CONFIG`
    /// 2. `./sqlbench.toml`
    /// 3. `~/.config/sqlbench/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("sqlbench.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sqlbench").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.query.row_limit == 0 {
            return Err(SettingsError::InvalidConfig(
                "query.row_limit must be positive".to_string(),
            ));
        }
        if self.environments.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "at least one environment is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Environment by id. Unknown ids fall back to the first environment.
    pub fn environment(&self, id: &str) -> Option<&Environment> {
        self.environments
            .iter()
            .find(|env| env.id == id)
            .or_else(|| self.environments.first())
    }

    /// Session for `environment` (or the default), with expanded credentials.
    pub fn session(&self, environment: Option<&str>) -> Result<Session, SettingsError> {
        let requested = environment.unwrap_or(&self.default_environment);
        let env = self.environment(requested).ok_or_else(|| {
            SettingsError::InvalidConfig("at least one environment is required".to_string())
        })?;

        let (credentials, extra) = self.credentials.resolve()?;
        Ok(Session::new(credentials, env.id.clone()).with_extra_credentials(extra))
    }

    /// Full URL of the query endpoint.
    pub fn query_url(&self) -> String {
        join_url(&self.server.base_url, &self.server.query_path)
    }

    pub fn asset_base_url(&self) -> &str {
        self.server
            .asset_base_url
            .as_deref()
            .unwrap_or(&self.server.base_url)
    }

    /// HTTP transport for [`Self::query_url`].
    pub fn transport(&self) -> HttpTransport {
        HttpTransport::with_client(self.query_url(), reqwest::Client::new())
    }

    /// Describe cache with the configured TTL. Build once per process and
    /// share it between sessions.
    pub fn describe_cache(&self) -> DescribeCache {
        DescribeCache::with_ttl(self.cache.describe_ttl())
    }

    /// Resource reader resolving internal locators against
    /// [`Self::asset_base_url`], cached for the configured TTL.
    pub fn resource_reader<F: ResourceFetcher>(&self, fetcher: F) -> ResourceReader<F> {
        ResourceReader::with_ttl(fetcher, self.asset_base_url(), self.cache.resource_ttl())
    }

    /// Runner with the configured row limit and result format.
    pub fn runner<T: QueryTransport>(
        &self,
        transport: T,
        session: Session,
        describe_cache: Arc<DescribeCache>,
    ) -> RemoteRunner<T> {
        RemoteRunner::new(transport, session, describe_cache)
            .with_default_limit(self.query.row_limit)
            .with_format(self.query.format)
    }

    /// Full engine connection for `environment` (or the default).
    pub fn connect(
        &self,
        environment: Option<&str>,
        describe_cache: Arc<DescribeCache>,
    ) -> Result<HttpConnection, SettingsError> {
        let session = self.session(environment)?;
        Ok(EngineAdapter::new(
            self.runner(self.transport(), session, describe_cache),
            self.resource_reader(HttpFetcher::new()),
        ))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
