//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use config_loader::ConfigLoader;
use contracts::PipelineBlueprint;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    worker_count: usize,
    selection_policy: String,
    dispatchers: usize,
    store: String,
}

impl From<&PipelineBlueprint> for ConfigSummary {
    fn from(blueprint: &PipelineBlueprint) -> Self {
        Self {
            version: format!("{:?}", blueprint.version),
            worker_count: blueprint.workers.len(),
            selection_policy: format!("{:?}", blueprint.pool.policy),
            dispatchers: blueprint.dispatcher.tasks,
            store: format!(
                "{} ({:?})",
                blueprint.store.name, blueprint.store.store_type
            ),
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = ConfigLoader::warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary::from(&blueprint)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Workers: {}", summary.worker_count);
            println!("  Selection: {}", summary.selection_policy);
            println!("  Dispatchers: {}", summary.dispatchers);
            println!("  Store: {}", summary.store);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args_for(path: PathBuf) -> ValidateArgs {
        ValidateArgs {
            config: path,
            json: true,
        }
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_config_with_summary() {
        let file = write_config(
            r#"
[pool]
policy = "round_robin"

[[workers]]
id = "SVC1"

[[workers]]
id = "SVC2"
"#,
        );

        let result = validate_config(&args_for(file.path().to_path_buf()));
        assert!(result.valid);
        assert!(result.warnings.is_none());
        let summary = result.summary.unwrap();
        assert_eq!(summary.worker_count, 2);
        assert_eq!(summary.selection_policy, "RoundRobin");
        assert_eq!(summary.store, "results (Log)");
    }

    #[test]
    fn test_empty_pool_is_a_warning() {
        let file = write_config("[dispatcher]\ntasks = 2\n");
        let result = validate_config(&args_for(file.path().to_path_buf()));
        assert!(result.valid);
        assert!(!result.warnings.unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_workers_are_invalid() {
        let file = write_config("[[workers]]\nid = \"SVC1\"\n\n[[workers]]\nid = \"SVC1\"\n");
        let result = validate_config(&args_for(file.path().to_path_buf()));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("SVC1"));
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&args_for(PathBuf::from("/nonexistent/pipeline.toml")));
        assert!(!result.valid);
        assert!(result.error.unwrap().starts_with("File not found"));
        assert!(run_validate(&args_for(PathBuf::from("/nonexistent/pipeline.toml"))).is_err());
    }
}
