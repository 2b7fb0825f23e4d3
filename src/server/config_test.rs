//! Tests for gateway configuration
//! 网关配置的测试

use std::io::Write;
use std::time::Duration;

use serial_test::serial;
use tempfile::NamedTempFile;

use super::config::{CliArgs, GatewayConfig, ProviderConfig};
use crate::predict::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};

const ENV_VARS: [&str; 5] = [
    "PORT",
    "ORRERY_HTTP__ADDR",
    "ORRERY_PROVIDER__MAX_POLL_ATTEMPTS",
    "ORRERY_PROVIDER__MODEL",
    "ORRERY_TEST_TOKEN",
];

fn clear_env() {
    for v in ENV_VARS {
        std::env::remove_var(v);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn args_with_config(file: &NamedTempFile) -> CliArgs {
    CliArgs {
        config: Some(file.path().to_string_lossy().to_string()),
        ..Default::default()
    }
}

#[test]
fn test_defaults() {
    let cfg = GatewayConfig::default();
    assert_eq!(cfg.http.addr.port(), 3001);
    assert_eq!(cfg.provider.base_url, "https://api.replicate.com/v1");
    assert_eq!(cfg.provider.model, DEFAULT_MODEL);
    assert_eq!(cfg.provider.system_prompt, DEFAULT_SYSTEM_PROMPT);
    assert_eq!(cfg.provider.api_token_env, "REPLICATE_API_TOKEN");

    let policy = cfg.provider.poll_policy();
    assert_eq!(policy.interval, Duration::from_millis(1000));
    assert_eq!(policy.max_attempts, 60);
    assert_eq!(policy.failure_tolerance, 0);
    assert_eq!(cfg.provider.request_timeout(), Duration::from_secs(30));
    assert!(cfg.validate().is_ok());
}

#[test]
#[serial]
fn test_load_from_file_with_partial_sections() {
    clear_env();
    let file = write_config(
        r#"
[http]
addr = "127.0.0.1:9100"

[provider]
max_poll_attempts = 10
poll_failure_tolerance = 2
"#,
    );
    let cfg = GatewayConfig::load_with_cli(&args_with_config(&file)).unwrap();
    assert_eq!(cfg.http.addr, "127.0.0.1:9100".parse().unwrap());
    assert_eq!(cfg.provider.max_poll_attempts, 10);
    assert_eq!(cfg.provider.poll_failure_tolerance, 2);
    assert_eq!(cfg.provider.poll_interval_ms, 1000);
    assert_eq!(cfg.log.level, "info");
}

#[test]
#[serial]
fn test_missing_config_file_uses_defaults() {
    clear_env();
    let args = CliArgs {
        config: Some("/nonexistent/orrery/config.toml".to_string()),
        ..Default::default()
    };
    let cfg = GatewayConfig::load_with_cli(&args).unwrap();
    assert_eq!(cfg, GatewayConfig::default());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = write_config("[provider]\nmax_poll_attempts = 10\n");
    std::env::set_var("ORRERY_PROVIDER__MAX_POLL_ATTEMPTS", "5");
    std::env::set_var("ORRERY_PROVIDER__MODEL", "meta/llama-3-8b-instruct");
    let cfg = GatewayConfig::load_with_cli(&args_with_config(&file));
    clear_env();
    let cfg = cfg.unwrap();
    assert_eq!(cfg.provider.max_poll_attempts, 5);
    assert_eq!(cfg.provider.model, "meta/llama-3-8b-instruct");
}

#[test]
#[serial]
fn test_port_and_cli_precedence() {
    clear_env();
    let file = write_config("[http]\naddr = \"127.0.0.1:9100\"\n");
    std::env::set_var("PORT", "4000");

    let cfg = GatewayConfig::load_with_cli(&args_with_config(&file)).unwrap();
    assert_eq!(cfg.http.addr, "127.0.0.1:4000".parse().unwrap());

    let args = CliArgs {
        http_addr: Some("0.0.0.0:5000".to_string()),
        log_level: Some("debug".to_string()),
        log_format: Some("json".to_string()),
        provider_base_url: Some("http://localhost:9999/v1".to_string()),
        model: Some("custom/model".to_string()),
        ..args_with_config(&file)
    };
    let cfg = GatewayConfig::load_with_cli(&args);
    clear_env();
    let cfg = cfg.unwrap();
    assert_eq!(cfg.http.addr, "0.0.0.0:5000".parse().unwrap());
    assert_eq!(cfg.log.level, "debug");
    assert_eq!(cfg.log.format, "json");
    assert_eq!(cfg.provider.base_url, "http://localhost:9999/v1");
    assert_eq!(cfg.provider.model, "custom/model");
}

#[test]
#[serial]
fn test_invalid_port_is_rejected() {
    clear_env();
    std::env::set_var("PORT", "not-a-port");
    let file = write_config("");
    let res = GatewayConfig::load_with_cli(&args_with_config(&file));
    clear_env();
    assert!(res.is_err());
}

#[test]
fn test_apply_port_ignores_blank() {
    let mut cfg = GatewayConfig::default();
    cfg.apply_port(Some("  ")).unwrap();
    cfg.apply_port(None).unwrap();
    assert_eq!(cfg.http.addr.port(), 3001);
    cfg.apply_port(Some("8088")).unwrap();
    assert_eq!(cfg.http.addr.port(), 8088);
}

#[test]
fn test_validate_rejects_bad_values() {
    let bad = [
        ProviderConfig {
            poll_interval_ms: 0,
            ..Default::default()
        },
        ProviderConfig {
            max_poll_attempts: 0,
            ..Default::default()
        },
        ProviderConfig {
            model: "  ".to_string(),
            ..Default::default()
        },
        ProviderConfig {
            api_token_env: String::new(),
            ..Default::default()
        },
        ProviderConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        },
    ];
    for provider in bad {
        let cfg = GatewayConfig {
            provider,
            ..Default::default()
        };
        assert!(cfg.validate().is_err(), "{:?}", cfg.provider);
    }
}

#[test]
#[serial]
fn test_resolve_api_token() {
    clear_env();
    let mut cfg = GatewayConfig::default();
    cfg.provider.api_token_env = "ORRERY_TEST_TOKEN".to_string();
    assert!(cfg.resolve_api_token().is_none());

    std::env::set_var("ORRERY_TEST_TOKEN", "   ");
    assert!(cfg.resolve_api_token().is_none());

    std::env::set_var("ORRERY_TEST_TOKEN", "r8_abc");
    let token = cfg.resolve_api_token();
    clear_env();
    assert_eq!(token.unwrap().expose_secret(), "r8_abc");
}

#[test]
fn test_missing_config_path_reports_only_absent_files() {
    let file = write_config("");
    assert_eq!(GatewayConfig::missing_config_path(&args_with_config(&file)), None);
    assert_eq!(GatewayConfig::missing_config_path(&CliArgs::default()), None);

    let args = CliArgs {
        config: Some("/nonexistent/orrery/config.toml".to_string()),
        ..Default::default()
    };
    assert_eq!(
        GatewayConfig::missing_config_path(&args),
        Some("/nonexistent/orrery/config.toml")
    );
}
