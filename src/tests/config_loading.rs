// Config file loading:
//  - ${VAR} / ${VAR:default} expansion before parsing
//  - defaults for settings
//  - aggregated validation errors

#[cfg(test)]
mod test {

    use std::io::Write;
    use std::time::Duration;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use crate::config::identity::{ClientConfig, Credentials, CredentialsConfig};
    use crate::config::loader::{file_to_config, parse_config};
    use crate::config::settings::LogFormat;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[tokio::test]
    #[serial]
    async fn loads_file_with_env_expansion_and_defaults() {
        std::env::set_var("KEYSTONE_AGENT_TEST_PASSWORD", "from-env");
        std::env::remove_var("KEYSTONE_AGENT_TEST_URL");

        let file = write_config(
            r#"
identity:
  url: ${KEYSTONE_AGENT_TEST_URL:http://127.0.0.1:5000/v2.0}
  credentials:
    type: password
    username: admin
    password: ${KEYSTONE_AGENT_TEST_PASSWORD}
  extra_args:
    tenantName: ops
"#,
        );

        let cfg = file_to_config(file.path()).await.unwrap();
        assert_eq!(cfg.identity.url, "http://127.0.0.1:5000/v2.0");
        assert!(matches!(
            &cfg.identity.credentials,
            CredentialsConfig::Password { password, .. } if password == "from-env"
        ));

        let logging = cfg.settings.logging.clone().unwrap();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);
        assert!(!cfg.settings.metrics.is_enabled);
        assert_eq!(cfg.settings.metrics.path, "/metrics");

        let client_config = ClientConfig::try_from(&cfg).unwrap();
        assert_eq!(client_config.timeout, Duration::from_millis(5000));
        assert_eq!(client_config.extra_args, vec![("tenantName".to_string(), "ops".to_string())]);
        assert_eq!(
            client_config.credentials,
            Credentials::Password { username: "admin".into(), password: "from-env".into() }
        );

        std::env::remove_var("KEYSTONE_AGENT_TEST_PASSWORD");
    }

    #[tokio::test]
    async fn api_key_mode_and_settings() {
        let cfg = parse_config(
            r#"
identity:
  url: https://identity.example.com/v2.0
  credentials:
    type: api_key
    username: admin
    apikey: abc123
settings:
  timeout_ms: 2500
  logging:
    level: debug
    format: json
  server:
    host: 0.0.0.0
    port: "9090"
  metrics:
    is_enabled: true
"#
            .to_string(),
        )
        .await
        .unwrap();

        let client_config = ClientConfig::try_from(&cfg).unwrap();
        assert_eq!(client_config.timeout, Duration::from_millis(2500));
        assert_eq!(client_config.base_url.as_str(), "https://identity.example.com/v2.0");
        assert_eq!(client_config.credentials.username(), "admin");
        assert!(matches!(client_config.credentials, Credentials::ApiKey { ref api_key, .. } if api_key == "abc123"));
        assert_eq!(cfg.settings.server.port, "9090");
        assert!(cfg.settings.metrics.is_enabled);
    }

    #[tokio::test]
    async fn aggregates_validation_errors() {
        let err = parse_config(
            r#"
identity:
  url: ftp://identity.example.com
  credentials:
    type: password
    username: ""
    password: ""
settings:
  timeout_ms: 0
  server:
    host: 127.0.0.1
    port: not-a-port
"#
            .to_string(),
        )
        .await
        .unwrap_err()
        .to_string();

        assert!(err.contains("total errors: 5"), "{}", err);
        assert!(err.contains("identity.url"), "{}", err);
        assert!(err.contains("identity.credentials.password"), "{}", err);
        assert!(err.contains("settings.server.port"), "{}", err);
    }

    #[tokio::test]
    async fn unknown_credential_type_is_rejected() {
        let err = parse_config(
            r#"
identity:
  url: https://identity.example.com/v2.0
  credentials:
    type: token
    username: admin
"#
            .to_string(),
        )
        .await;
        assert!(err.is_err());
    }
}
