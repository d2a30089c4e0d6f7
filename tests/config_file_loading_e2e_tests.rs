/// E2E 测试：配置文件加载
/// 测试 TOML / YAML / JSON 配置文件的解析、环境变量覆盖和提示词模板解析
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use code_review_server::config::Config;
use code_review_server::review::{ResponseShaping, ReviewProfile, ReviewService};

/// 测试辅助函数：清理环境变量
fn clear_env_vars() {
    let vars = [
        "REVIEW_HOST",
        "REVIEW_PORT",
        "REVIEW_MAX_BODY_BYTES",
        "OLLAMA_API_BASE_URL",
        "REVIEW_OLLAMA_URL",
        "REVIEW_MODEL",
        "REVIEW_TEMPERATURE",
        "REVIEW_MAX_TOKENS",
        "REVIEW_TIMEOUT_SECS",
        "REVIEW_CONNECT_TIMEOUT_SECS",
        "REVIEW_PROFILE",
        "REVIEW_PROMPT_TEMPLATE_FILE",
        "REVIEW_CORS_ORIGINS",
        "REVIEW_LOG_LEVEL",
        "REVIEW_LOG_FORMAT",
    ];

    for var in &vars {
        env::remove_var(var);
    }
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// 创建完整的 TOML 测试配置
fn create_toml_config() -> String {
    r#"
[server]
host = "0.0.0.0"
port = 8088
max_body_bytes = 65536

[inference]
ollama_url = "http://gpu-box:11434/api/generate"
model = "codellama:13b"
temperature = 0.3
max_tokens = 2048
timeout_secs = 45

[review]
profile = "structured"

[cors]
allowed_origins = ["http://editor.local"]

[logging]
level = "debug"
format = "json"
"#
    .to_string()
}

#[test]
#[serial]
fn test_load_toml_config() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "review.toml", &create_toml_config());

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.server_addr(), "0.0.0.0:8088");
    assert_eq!(config.server.max_body_bytes, 65536);
    assert_eq!(config.inference.model, "codellama:13b");
    assert_eq!(config.inference.max_tokens, 2048);
    assert_eq!(config.review.profile, ReviewProfile::Structured);
    assert_eq!(config.cors.allowed_origins, vec!["http://editor.local"]);
    // 未写出的字段保持默认值
    assert_eq!(config.inference.connect_timeout_secs, 10);
    assert!(config.validate().is_ok());

    let provider = config.provider_config();
    assert_eq!(provider.api_url, "http://gpu-box:11434/api/generate");
    assert_eq!(provider.timeout, Duration::from_secs(45));
}

#[test]
#[serial]
fn test_load_yaml_config() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "review.yaml",
        r#"
server:
  port: 9000
inference:
  model: qwen2.5-coder
review:
  profile: comprehensive
"#,
    );

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.inference.model, "qwen2.5-coder");
    assert_eq!(config.review.profile, ReviewProfile::Comprehensive);
}

#[test]
#[serial]
fn test_load_json_config() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "review.json",
        r#"{"inference": {"temperature": 1.2}, "logging": {"level": "warn"}}"#,
    );

    let config = Config::load(Some(&path)).unwrap();
    assert!((config.inference.temperature - 1.2).abs() < f32::EPSILON);
    assert_eq!(config.logging.level, "warn");
    assert!(config.tracing_config().is_ok());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "review.toml", &create_toml_config());

    env::set_var("REVIEW_MODEL", "llama3.1");
    env::set_var("REVIEW_PORT", "7000");
    env::set_var("REVIEW_PROFILE", "comprehensive");

    let config = Config::load(Some(&path)).unwrap();
    clear_env_vars();

    assert_eq!(config.inference.model, "llama3.1");
    assert_eq!(config.server.port, 7000);
    assert_eq!(config.review.profile, ReviewProfile::Comprehensive);
    // 文件中的其它值保留
    assert_eq!(config.inference.max_tokens, 2048);
}

#[test]
#[serial]
fn test_invalid_and_unsupported_files() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();

    let broken = write_file(&dir, "broken.toml", "[server\nport = ");
    assert!(Config::load(Some(&broken)).is_err());

    let unknown = write_file(&dir, "review.ini", "port=1");
    assert!(Config::load(Some(&unknown)).is_err());

    let missing = dir.path().join("missing.toml");
    assert!(Config::load(Some(&missing)).is_err());

    let bad_profile = write_file(&dir, "profile.toml", "[review]\nprofile = \"verbose\"\n");
    assert!(Config::load(Some(&bad_profile)).is_err());
}

#[test]
#[serial]
fn test_validate_rejects_bad_values() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "review.toml",
        "[inference]\nollama_url = \"ftp://example.com\"\n",
    );

    let config = Config::load(Some(&path)).unwrap();
    assert!(config.validate().is_err());

    let path = write_file(&dir, "temp.toml", "[inference]\ntemperature = 3.5\n");
    let config = Config::load(Some(&path)).unwrap();
    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn test_prompt_template_file() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    let template = write_file(
        &dir,
        "security.txt",
        "Audit this code for security issues only.\n\n{{code}}\n",
    );
    let path = write_file(
        &dir,
        "review.toml",
        &format!(
            "[review]\nprofile = \"structured\"\nprompt_template_file = {:?}\n",
            template.display().to_string()
        ),
    );

    let config = Config::load(Some(&path)).unwrap();
    assert!(config.validate().is_ok());

    let rendered = config.prompt_template().unwrap().render_code("eval(x)").unwrap();
    assert!(rendered.starts_with("Audit this code for security issues only."));
    assert!(rendered.contains("eval(x)"));

    let service = ReviewService::from_config(&config).unwrap();
    assert_eq!(service.shaping(), ResponseShaping::Sections);
}

#[test]
#[serial]
fn test_prompt_template_without_placeholder_rejected() {
    clear_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "review.toml",
        "[review]\nprompt_template = \"Review the code please.\"\n",
    );

    let config = Config::load(Some(&path)).unwrap();
    assert!(config.validate().is_err());
    assert!(ReviewService::from_config(&config).is_err());
}
