use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "graphql-mold.json";
pub const DEFAULT_PROFILE_NAME: &str = "default";

/// Contents of a `graphql-mold.json` file.
///
/// ```json
/// {
///     "profiles": {
///         "default": { "url": "http://localhost:4000/graphql", "timeoutSeconds": 30 },
///         "github": {
///             "url": "https://api.github.com/graphql",
///             "headers": { "Authorization": "bearer ..." }
///         }
///     },
///     "debug": false
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub profiles: BTreeMap<String, EndpointConfig>,
    #[serde(default)]
    pub debug: bool,
}

/// One GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EndpointConfig {
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        EndpointConfig { url: url.into(), headers: BTreeMap::new(), timeout_seconds: None }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
    },
    #[error("no profile named \"{0}\"")]
    MissingProfile(String),
    #[error("invalid header \"{name}\"")]
    InvalidHeader { name: String },
    #[error("unable to build http client")]
    Http(#[from] reqwest::Error),
}

impl Config {
    pub fn parse(content: &str) -> Result<Config, serde_path_to_error::Error<serde_json::Error>> {
        let deserializer = &mut serde_json::Deserializer::from_str(content);
        serde_path_to_error::deserialize(deserializer)
    }

    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Config::parse(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Reads the given file, or the default one when no path is given. Only an explicitly
    /// requested file has to exist.
    pub fn read_optional(path: Option<&Path>) -> Result<Option<Config>, ConfigError> {
        match path {
            Some(path) => Config::read(path).map(Some),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    tracing::debug!(path = %path.display(), "using default config file");
                    Config::read(path).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    pub fn profile(&self, name: Option<&str>) -> Result<&EndpointConfig, ConfigError> {
        let name = name.unwrap_or(DEFAULT_PROFILE_NAME);
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::MissingProfile(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_profiles() {
        let config = Config::parse(
            r#"{
                "profiles": {
                    "default": { "url": "http://localhost:4000/graphql" },
                    "github": {
                        "url": "https://api.github.com/graphql",
                        "headers": { "Authorization": "bearer token" },
                        "timeoutSeconds": 10
                    }
                },
                "debug": true
            }"#,
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.profile(None).unwrap(), &EndpointConfig::new("http://localhost:4000/graphql"));
        let github = config.profile(Some("github")).unwrap();
        assert_eq!(github.headers["Authorization"], "bearer token");
        assert_eq!(github.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn missing_profile() {
        let error = Config::default().profile(Some("staging")).unwrap_err();
        assert_eq!(error.to_string(), "no profile named \"staging\"");
    }

    #[test]
    fn errors_name_the_offending_key() {
        let error = Config::parse(r#"{"profiles":{"default":{"url":"x","timeoutSeconds":"soon"}}}"#).unwrap_err();
        assert_eq!(error.path().to_string(), "profiles.default.timeoutSeconds");

        assert!(Config::parse(r#"{"profiles":{"default":{"uri":"x"}}}"#).is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let error = Config::read_optional(Some(Path::new("does/not/exist.json"))).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
