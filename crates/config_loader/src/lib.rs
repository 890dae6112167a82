//! # Config Loader
//!
//! 从 TOML/JSON 文件加载 `PipelineBlueprint`，解析后立即校验，
//! 校验失败的配置不会交给调用方。
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("pipeline.toml")).unwrap();
//! for warning in ConfigLoader::warnings(&blueprint) {
//!     eprintln!("warning: {warning}");
//! }
//! ```

mod parser;
mod validator;

pub use contracts::PipelineBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Entry point for reading, checking and rendering pipeline configuration
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read a config file; the format follows the extension (`.toml` / `.json`)
    ///
    /// # Errors
    /// Unsupported extension, I/O failure, parse or validation failure
    pub fn load_from_path(path: &Path) -> Result<PipelineBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse then validate
    ///
    /// # Errors
    /// Parse or validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-run validation on a (possibly modified) blueprint
    ///
    /// # Errors
    /// First validation failure
    pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Non-fatal findings, e.g. an empty worker list
    pub fn warnings(blueprint: &PipelineBlueprint) -> Vec<String> {
        validator::warnings(blueprint)
    }

    /// Render the blueprint with every default spelled out
    ///
    /// # Errors
    /// Serializer failure
    pub fn render(
        blueprint: &PipelineBlueprint,
        format: ConfigFormat,
    ) -> Result<String, ContractError> {
        parser::render(blueprint, format)
    }
}
