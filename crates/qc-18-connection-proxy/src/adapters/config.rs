use crate::domain::ProxyConfig;
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - fixed config for tests and embedding
// ============================================================================

/// Configuration provider returning a fixed [`ProxyConfig`].
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: ProxyConfig,
}

impl StaticConfigProvider {
    #[must_use]
    pub fn new(config: ProxyConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn proxy_config(&self) -> ProxyConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - file based config (requires "toml-config" feature)
// ============================================================================

#[cfg(feature = "toml-config")]
mod toml_config {
    use super::*;
    use crate::domain::{Network, DEFAULT_MAX_PAYLOAD_SIZE};
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;
    use thiserror::Error;

    #[derive(Debug, Deserialize, Default)]
    struct ConfigFile {
        #[serde(default)]
        network: NetworkSection,
        #[serde(default)]
        proxy: ProxySection,
    }

    #[derive(Debug, Deserialize, Default)]
    struct NetworkSection {
        name: Option<String>,
        magic: Option<u32>,
    }

    #[derive(Debug, Deserialize, Default)]
    struct ProxySection {
        max_payload_size: Option<usize>,
    }

    /// Proxy configuration loaded from TOML.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [network]
    /// name = "regtest"     # mainnet | testnet | regtest
    /// # magic = 0xDAB5BFFA # explicit magic, wins over name
    ///
    /// [proxy]
    /// max_payload_size = 1048576
    /// ```
    ///
    /// Missing sections fall back to mainnet defaults.
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        config: ProxyConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if the file cannot be read or parsed.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let magic = match (file.network.magic, file.network.name) {
                (Some(magic), _) => magic,
                (None, Some(name)) => Network::from_name(&name)
                    .ok_or(ConfigError::UnknownNetwork(name))?
                    .magic(),
                (None, None) => Network::Mainnet.magic(),
            };

            let max_payload_size = file
                .proxy
                .max_payload_size
                .unwrap_or(DEFAULT_MAX_PAYLOAD_SIZE);
            if max_payload_size == 0 {
                return Err(ConfigError::Invalid("max_payload_size must be non-zero"));
            }

            Ok(Self {
                config: ProxyConfig {
                    magic,
                    max_payload_size,
                },
            })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn proxy_config(&self) -> ProxyConfig {
            self.config.clone()
        }
    }

    /// Errors that can occur during config loading.
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ConfigError {
        #[error("failed to read {path}: {error}")]
        Io { path: String, error: String },

        #[error("failed to parse config: {0}")]
        Parse(String),

        #[error("unknown network `{0}`")]
        UnknownNetwork(String),

        #[error("invalid config: {0}")]
        Invalid(&'static str),
    }
}

#[cfg(feature = "toml-config")]
pub use toml_config::{ConfigError, TomlConfigProvider};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Network, MAINNET_MAGIC};

    #[test]
    fn test_static_provider() {
        let config = ProxyConfig::for_network(Network::Testnet).with_max_payload_size(10);
        let provider = StaticConfigProvider::new(config.clone());
        assert_eq!(provider.proxy_config(), config);
        assert_eq!(StaticConfigProvider::default().proxy_config().magic, MAINNET_MAGIC);
    }

    #[cfg(feature = "toml-config")]
    mod toml_file {
        use super::super::*;
        use crate::domain::{DEFAULT_MAX_PAYLOAD_SIZE, MAINNET_MAGIC, REGTEST_MAGIC, TESTNET_MAGIC};

        #[test]
        fn test_named_network() {
            let provider = TomlConfigProvider::parse(
                r#"
                [network]
                name = "regtest"

                [proxy]
                max_payload_size = 1048576
                "#,
            )
            .unwrap();
            let config = provider.proxy_config();
            assert_eq!(config.magic, REGTEST_MAGIC);
            assert_eq!(config.max_payload_size, 1_048_576);
        }

        #[test]
        fn test_explicit_magic_wins() {
            let provider = TomlConfigProvider::parse(
                r#"
                [network]
                name = "regtest"
                magic = 0x0709110B
                "#,
            )
            .unwrap();
            assert_eq!(provider.proxy_config().magic, TESTNET_MAGIC);
        }

        #[test]
        fn test_empty_file_is_mainnet() {
            let config = TomlConfigProvider::parse("").unwrap().proxy_config();
            assert_eq!(config.magic, MAINNET_MAGIC);
            assert_eq!(config.max_payload_size, DEFAULT_MAX_PAYLOAD_SIZE);
        }

        #[test]
        fn test_errors() {
            assert_eq!(
                TomlConfigProvider::parse("[network]\nname = \"signet\"").unwrap_err(),
                ConfigError::UnknownNetwork("signet".into())
            );
            assert!(matches!(
                TomlConfigProvider::parse("[proxy]\nmax_payload_size = 0"),
                Err(ConfigError::Invalid(_))
            ));
            assert!(matches!(
                TomlConfigProvider::parse("[network"),
                Err(ConfigError::Parse(_))
            ));
            assert!(matches!(
                TomlConfigProvider::load("/nonexistent/qc-18.toml"),
                Err(ConfigError::Io { .. })
            ));
        }
    }
}
