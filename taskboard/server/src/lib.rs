pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone, PartialEq)]
    pub struct Config {
        #[serde(default = "default_host")]
        pub host: String,
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default = "default_log_level")]
        pub log_level: String,
        #[serde(default = "default_seed_sample_items")]
        pub seed_sample_items: bool,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_source(config::Environment::default())
        }

        /// Loads configuration from the given environment source.
        pub fn from_source(source: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder().add_source(source).build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Socket address the server binds to.
        pub fn server_address(&self) -> String {
            format!("{}:{}", self.host, self.port)
        }
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                host: default_host(),
                port: default_port(),
                log_level: default_log_level(),
                seed_sample_items: default_seed_sample_items(),
            }
        }
    }

    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        3001
    }

    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_seed_sample_items() -> bool {
        true
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn environment(vars: &[(&str, &str)]) -> config::Environment {
            let map: config::Map<String, String> = vars
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            config::Environment::default().source(Some(map))
        }

        #[test]
        fn can_load_defaults_from_empty_environment() {
            let config = Config::from_source(environment(&[])).unwrap();

            assert_eq!(config, Config::default());
            assert_eq!(config.server_address(), "0.0.0.0:3001");
        }

        #[test]
        fn can_override_settings_from_environment() {
            let config = Config::from_source(environment(&[
                ("PORT", "8080"),
                ("HOST", "127.0.0.1"),
                ("LOG_LEVEL", "debug"),
                ("SEED_SAMPLE_ITEMS", "false"),
            ]))
            .unwrap();

            assert_eq!(config.port, 8080);
            assert_eq!(config.log_level, "debug");
            assert!(!config.seed_sample_items);
            assert_eq!(config.server_address(), "127.0.0.1:8080");
        }

        #[test]
        fn rejects_port_that_is_not_a_number() {
            let result = Config::from_source(environment(&[("PORT", "not-a-port")]));

            assert!(result.is_err());
        }
    }
}

pub mod clock;
pub mod item;
pub mod task;
pub mod web;
