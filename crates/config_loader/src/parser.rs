//! 配置解析模块
//!
//! TOML 为主要格式，JSON 作为备选；两者共用同一份 serde 模型，
//! 因此也可以把补全默认值后的配置重新渲染出来。

use std::path::Path;

use contracts::{ContractError, PipelineBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式 (大小写不敏感)
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// 按路径的扩展名确定格式
    ///
    /// # Errors
    /// 没有扩展名或扩展名不受支持
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                ContractError::config_parse(format!(
                    "{}: cannot determine file format without an extension",
                    path.display()
                ))
            })?;

        Self::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// 按指定格式解析配置 (仅反序列化，不做校验)
pub fn parse(content: &str, format: ConfigFormat) -> Result<PipelineBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_error(format, e)),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(format, e)),
    }
}

/// 把配置渲染为指定格式 (所有默认值均显式写出)
pub fn render(
    blueprint: &PipelineBlueprint,
    format: ConfigFormat,
) -> Result<String, ContractError> {
    let rendered = match format {
        ConfigFormat::Toml => toml::to_string_pretty(blueprint).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::to_string_pretty(blueprint).map_err(|e| e.to_string()),
    };
    rendered.map_err(|e| {
        ContractError::config_parse(format!("{} render error: {e}", format.name()))
    })
}

fn parse_error<E>(format: ConfigFormat, err: E) -> ContractError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ContractError::ConfigParse {
        message: format!("{} parse error: {err}", format.name()),
        source: Some(Box::new(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BackpressurePolicy, SelectionPolicy, StoreType, WorkerKind};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[inbound]
capacity = 16
backpressure = "reject"

[pool]
policy = "round_robin"

[[workers]]
id = "SVC1"

[[workers]]
id = "SVC2"
kind = "uppercase"
"#;
        let result = parse(content, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.inbound.capacity, Some(16));
        assert_eq!(bp.inbound.backpressure, BackpressurePolicy::Reject);
        assert_eq!(bp.outbound.capacity, None);
        assert_eq!(bp.pool.policy, SelectionPolicy::RoundRobin);
        assert_eq!(bp.workers.len(), 2);
        assert_eq!(bp.workers[0].kind, WorkerKind::Echo);
        assert_eq!(bp.workers[1].kind, WorkerKind::Uppercase);
        assert_eq!(bp.store.store_type, StoreType::Log);
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let bp = parse("", ConfigFormat::Toml).unwrap();
        assert_eq!(bp.dispatcher.tasks, 1);
        assert!(bp.workers.is_empty());
        assert_eq!(bp.store.name, "results");
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "outbound": { "capacity": 8, "backpressure": "block" },
            "dispatcher": { "tasks": 3 },
            "pool": { "policy": "random", "seed": 42 },
            "workers": [{ "id": "SVC1", "kind": "echo" }],
            "store": { "name": "out", "store_type": "file", "params": { "path": "out.jsonl" } }
        }"#;
        let result = parse(content, ConfigFormat::Json);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.dispatcher.tasks, 3);
        assert_eq!(bp.pool.seed, Some(42));
        assert_eq!(bp.store.params.get("path").map(String::as_str), Some("out.jsonl"));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse(content, ConfigFormat::Toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_policy() {
        let err = parse("[pool]\npolicy = \"least_loaded\"\n", ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);

        assert_eq!(
            ConfigFormat::from_path(Path::new("conf/pipeline.Json")).unwrap(),
            ConfigFormat::Json
        );
        let err = ConfigFormat::from_path(Path::new("pipeline")).unwrap_err();
        assert!(err.to_string().contains("without an extension"));
    }

    #[test]
    fn test_render_fills_defaults() {
        let bp = parse("[[workers]]\nid = \"SVC1\"\n", ConfigFormat::Toml).unwrap();
        let toml_text = render(&bp, ConfigFormat::Toml).unwrap();
        assert!(toml_text.contains("tasks = 1"));
        assert!(toml_text.contains("kind = \"echo\""));

        let json: serde_json::Value =
            serde_json::from_str(&render(&bp, ConfigFormat::Json).unwrap()).unwrap();
        assert_eq!(json["pool"]["policy"], "random");
        assert_eq!(json["store"]["store_type"], "log");
    }
}
