//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes title abbreviation and LTWA lookup to AI assistants over stdio.
//! The server is a thin presentation layer over `iso4-core`: each `#[tool]`
//! method delegates to the shared [`Abbreviator`] and serializes the result
//! as JSON.

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use iso4_core::lemma::{Lemmatizer, NounLemmatizer};
use iso4_core::normalize::normalize_word;
use iso4_core::{AbbreviateOptions, AbbreviationError, Abbreviator};

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

/// Parameters for the `abbreviate_title` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AbbreviateTitleParams {
    /// The publication title to abbreviate.
    pub title: String,
    /// Append a period to each abbreviated word. Defaults to the server setting.
    pub periods: Option<bool>,
    /// ISO 639-2/B language codes of the title (e.g. "eng", "fre"), used only
    /// for words whose abbreviation depends on the language.
    pub languages: Option<Vec<String>>,
    /// Include a per-word breakdown of how the title was abbreviated.
    #[serde(default)]
    pub explain: bool,
}

/// Parameters for the `lookup_word` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LookupWordParams {
    /// The word to look up in the LTWA.
    pub word: String,
}

/// MCP server exposing ISO 4 abbreviation to AI assistants.
#[derive(Clone)]
pub struct ProjectServer {
    abbreviator: Arc<Abbreviator>,
    defaults: AbbreviateOptions,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl Default for ProjectServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl ProjectServer {
    /// A server over the bundled LTWA data with default options.
    pub fn new() -> Self {
        Self::with_abbreviator(Arc::new(Abbreviator::bundled()), AbbreviateOptions::default())
    }

    /// A server over a configured abbreviator.
    ///
    /// `defaults` applies to every call that does not set periods or languages.
    pub fn with_abbreviator(abbreviator: Arc<Abbreviator>, defaults: AbbreviateOptions) -> Self {
        Self {
            abbreviator,
            defaults,
            tool_router: Self::tool_router(),
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and the LTWA data version in use")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        #[allow(unused_variables)] Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let stats = self.abbreviator.lexicon().stats();
        let text = if params.format == "json" {
            let info = serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "description": env!("CARGO_PKG_DESCRIPTION"),
                "ltwa": stats,
            });
            serde_json::to_string_pretty(&info)
                .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?
        } else {
            format!(
                "{} v{}\n{}\nLTWA {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
                stats.version,
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Abbreviate a publication title.
    #[tool(
        description = "Abbreviate a journal or publication title according to ISO 4 and the LTWA. Fails when a word's abbreviation depends on the title language and `languages` does not pick exactly one."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn abbreviate_title(
        &self,
        Parameters(params): Parameters<AbbreviateTitleParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            tool = "abbreviate_title",
            explain = params.explain,
            "executing MCP tool"
        );

        let mut options = self.defaults.clone();
        if let Some(periods) = params.periods {
            options.periods = periods;
        }
        if let Some(languages) = params.languages {
            options.languages = languages.into_iter().collect();
        }

        let report = self
            .abbreviator
            .explain(&params.title, &options)
            .map_err(ambiguity_error)?;

        let json = if params.explain {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string_pretty(&serde_json::json!({
                "title": report.title,
                "abbreviation": report.abbreviation,
            }))
        }
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(tool = "abbreviate_title", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// List the LTWA entries matching a word.
    #[tool(
        description = "Look up a word in the LTWA. Returns every matching full-word, prefix, suffix and infix entry, with per-language abbreviations for language-dependent entries."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn lookup_word(
        &self,
        Parameters(params): Parameters<LookupWordParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "lookup_word", word = %params.word, "executing MCP tool");

        let lexicon = self.abbreviator.lexicon();
        let normalized = normalize_word(&params.word);
        let lemma = NounLemmatizer.lemmatize(&normalized);
        let mut entries = lexicon.lookup(&normalized);
        if lemma != normalized {
            for entry in lexicon.lookup(&lemma) {
                if !entries.contains(&entry) {
                    entries.push(entry);
                }
            }
        }

        let json = serde_json::to_string_pretty(&serde_json::json!({
            "word": params.word,
            "normalized": normalized,
            "stopword": lexicon.is_stopword(&normalized),
            "entries": entries,
        }))
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "lookup_word",
            entries = entries.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

fn ambiguity_error(err: AbbreviationError) -> McpError {
    let data = match &err {
        AbbreviationError::Ambiguous {
            word,
            fragment,
            kind,
            languages,
        } => serde_json::json!({
            "word": word,
            "fragment": fragment,
            "kind": kind,
            "languages": languages,
        }),
    };
    McpError::invalid_params(err.to_string(), Some(data))
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
                "{} MCP server. Use abbreviate_title to produce ISO 4 title abbreviations and lookup_word to inspect LTWA entries.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    #[test]
    fn server_info_has_correct_name() {
        let server = ProjectServer::new();
        let info = ServerHandler::get_info(&server);

        assert_eq!(info.server_info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn server_has_tools_capability() {
        let server = ProjectServer::new();
        let info = ServerHandler::get_info(&server);

        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn server_has_instructions() {
        let server = ProjectServer::new();
        let info = ServerHandler::get_info(&server);

        let instructions = info.instructions.expect("server should have instructions");
        assert!(instructions.contains(env!("CARGO_PKG_NAME")));
    }

    /// Extract text from the first content item in a `CallToolResult`.
    fn extract_text(result: &CallToolResult) -> Option<&str> {
        result.content.first().and_then(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    fn abbreviate(server: &ProjectServer, params: AbbreviateTitleParams) -> serde_json::Value {
        let result = server
            .abbreviate_title(Parameters(params))
            .expect("abbreviate_title should succeed");
        assert!(!result.is_error.unwrap_or(false));
        let text = extract_text(&result).expect("should have text content");
        serde_json::from_str(text).expect("output should be valid JSON")
    }

    fn title(text: &str) -> AbbreviateTitleParams {
        AbbreviateTitleParams {
            title: text.to_string(),
            periods: None,
            languages: None,
            explain: false,
        }
    }

    #[test]
    fn get_info_tool_returns_text_by_default() {
        let server = ProjectServer::new();
        let params = Parameters(GetInfoParams {
            format: "text".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");

        let text = extract_text(&result).expect("should have text content");
        assert!(text.contains(env!("CARGO_PKG_NAME")));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
        assert!(text.contains("LTWA"));
    }

    #[test]
    fn get_info_tool_returns_json_when_requested() {
        let server = ProjectServer::new();
        let params = Parameters(GetInfoParams {
            format: "json".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");
        let text = extract_text(&result).expect("should have text content");
        let json: serde_json::Value =
            serde_json::from_str(text).expect("output should be valid JSON");

        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(json["ltwa"]["version"], iso4_core::lexicon::LTWA_VERSION);
    }

    #[test]
    fn abbreviate_title_tool_works() {
        let server = ProjectServer::new();
        let json = abbreviate(&server, title("Journal of Applied Physics"));
        assert_eq!(json["abbreviation"], "J. Appl. Phys.");
        assert!(json.get("words").is_none());
    }

    #[test]
    fn abbreviate_title_respects_periods() {
        let server = ProjectServer::new();
        let mut params = title("Proceedings of the Royal Society");
        params.periods = Some(false);
        let json = abbreviate(&server, params);
        assert_eq!(json["abbreviation"], "Proc R Soc");
    }

    #[test]
    fn abbreviate_title_explains_words() {
        let server = ProjectServer::new();
        let mut params = title("Journal of Applied Physics");
        params.explain = true;
        let json = abbreviate(&server, params);
        assert_eq!(json["words"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["words"][1]["stopword"], true);
    }

    #[test]
    fn server_defaults_apply() {
        let server = ProjectServer::with_abbreviator(
            Arc::new(Abbreviator::bundled()),
            AbbreviateOptions::new().with_language("eng"),
        );
        let json = abbreviate(&server, title("Labor History"));
        assert_eq!(json["abbreviation"], "Lab. Hist.");
    }

    #[test]
    fn ambiguous_title_is_invalid_params() {
        let server = ProjectServer::new();
        let err = server
            .abbreviate_title(Parameters(title("Labor History")))
            .expect_err("ambiguous title should fail");

        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        let data = err.data.expect("error should carry data");
        assert_eq!(data["languages"], serde_json::json!(["eng", "lat", "spa"]));
    }

    #[test]
    fn lookup_word_tool_lists_conflicts() {
        let server = ProjectServer::new();
        let result = server
            .lookup_word(Parameters(LookupWordParams {
                word: "Labor".to_string(),
            }))
            .expect("lookup_word should succeed");

        let text = extract_text(&result).expect("should have text content");
        let json: serde_json::Value =
            serde_json::from_str(text).expect("output should be valid JSON");
        assert_eq!(json["normalized"], "labor");
        let entries = json["entries"].as_array().expect("entries array");
        assert!(entries.iter().any(|e| e["conflict"] == true && e["key"] == "labor"));
    }
}
