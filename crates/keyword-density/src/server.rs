//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes keyword density analysis over MCP on stdio, so editors and
//! assistants can check copy while it is being written.
//!
//! # Architecture
//!
//! The server is a presentation layer over the same core library the CLI
//! uses. Each `#[tool]` method builds an analyzer, optimizer or validator from
//! the loaded [`Config`] and returns the core report as JSON.

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use keyword_density_core::{
    Config, ContentFormat, DEFAULT_MAX_INPUT_BYTES, DensityAnalyzer, DensityOptimizer, RandomPicker,
    TargetDensity, markdown,
};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `analyze_density` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AnalyzeDensityParams {
    /// The copy to analyze.
    pub text: String,
    /// Keywords to track. Omit to use the configured keywords.
    pub keywords: Option<Vec<String>>,
    /// Lowest optimal density, in percent.
    pub min: Option<f64>,
    /// Highest optimal density, in percent.
    pub max: Option<f64>,
    /// Whether to reduce markdown to its visible copy before analysis.
    #[serde(default)]
    pub strip_markdown: bool,
}

/// Parameters for the `optimize_density` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct OptimizeDensityParams {
    /// The copy to rewrite.
    pub text: String,
    /// Keywords to track. Omit to use the configured keywords.
    pub keywords: Option<Vec<String>>,
    /// Lowest optimal density, in percent.
    pub min: Option<f64>,
    /// Highest optimal density, in percent.
    pub max: Option<f64>,
    /// Seed for reproducible paragraph and synonym choice.
    pub seed: Option<u64>,
    /// Whether the text is markdown: only its paragraphs are edited.
    #[serde(default)]
    pub markdown: bool,
}

/// Parameters for the `validate_keyword` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ValidateKeywordParams {
    /// The copy to validate.
    pub text: String,
    /// Content category, e.g. "usb-driver".
    pub category: String,
    /// Whether to reduce markdown to its visible copy before validation.
    #[serde(default)]
    pub strip_markdown: bool,
}

/// MCP server exposing keyword density tools.
#[derive(Clone)]
pub struct ProjectServer {
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
    config: Arc<Config>,
    max_input_bytes: Option<usize>,
}

impl Default for ProjectServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl ProjectServer {
    /// Create a server with default configuration and the default input limit.
    pub fn new() -> Self {
        Self::with_config(Config::default(), Some(DEFAULT_MAX_INPUT_BYTES))
    }

    /// Create a server backed by a loaded configuration.
    pub fn with_config(config: Config, max_input_bytes: Option<usize>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            max_input_bytes,
        }
    }

    fn check_input(&self, text: &str) -> Result<(), McpError> {
        match self.max_input_bytes {
            Some(max) if text.len() > max => Err(McpError::invalid_params(
                format!("input too large: {} bytes (limit: {max} bytes)", text.len()),
                None,
            )),
            _ => Ok(()),
        }
    }

    fn analyzer(
        &self,
        keywords: Option<&[String]>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> DensityAnalyzer {
        let target = (min.is_some() || max.is_some()).then(|| {
            let base = self.config.target_density.unwrap_or_default();
            TargetDensity::new(min.unwrap_or(base.min), max.unwrap_or(base.max))
        });
        self.config.analyzer(keywords.unwrap_or_default(), target)
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "categories": self.config.validator().categories(),
        });

        let text = if params.format == "json" {
            serde_json::to_string_pretty(&info)
                .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Measure keyword densities.
    #[tool(
        description = "Measure keyword density in copy. Returns word count, per-keyword counts and densities, recommendations, and an overall 0-100 score."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn analyze_density(
        &self,
        Parameters(params): Parameters<AnalyzeDensityParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            tool = "analyze_density",
            strip_md = params.strip_markdown,
            "executing MCP tool"
        );
        self.check_input(&params.text)?;

        let text = if params.strip_markdown {
            markdown::to_copy_text(&params.text)
        } else {
            params.text
        };
        let report = self
            .analyzer(params.keywords.as_deref(), params.min, params.max)
            .analyze(&text);

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "analyze_density",
            score = report.overall_score,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Rewrite copy toward the target densities.
    #[tool(
        description = "Rewrite copy so each keyword lands in its target density range. Returns the new text, its analysis, every change made, and the score improvement."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn optimize_density(
        &self,
        Parameters(params): Parameters<OptimizeDensityParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "optimize_density", seed = ?params.seed, "executing MCP tool");
        self.check_input(&params.text)?;

        let optimizer = DensityOptimizer::from_analyzer(self.analyzer(
            params.keywords.as_deref(),
            params.min,
            params.max,
        ))
        .with_format(if params.markdown {
            ContentFormat::Markdown
        } else {
            ContentFormat::Plain
        });
        let mut picker = RandomPicker::from_seed(params.seed.or(self.config.seed));
        let result = optimizer.optimize_with(&params.text, &mut picker);

        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "optimize_density",
            changes = result.changes.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Check one category's primary keyword.
    #[tool(
        description = "Validate that a page's primary keyword for its category sits inside the required 3-5% band."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", category = %params.category))]
    fn validate_keyword(
        &self,
        Parameters(params): Parameters<ValidateKeywordParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "validate_keyword", category = %params.category, "executing MCP tool");
        self.check_input(&params.text)?;

        let text = if params.strip_markdown {
            markdown::to_copy_text(&params.text)
        } else {
            params.text
        };
        let report = self
            .config
            .validator()
            .validate(&params.category, &text)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "validate_keyword",
            valid = report.is_valid,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for ProjectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Use analyze_density to measure copy, optimize_density to rewrite it, and validate_keyword to gate a page on its primary keyword.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}
