use std::sync::Arc;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};

use crate::assistant::Assistant;
use crate::formatters::format_report;
use crate::models::GetWeatherRequest;

/// MCP server exposing the weather assistant as a tool
#[derive(Clone)]
pub struct WeatherMcp {
    assistant: Arc<Assistant>,
    tool_router: ToolRouter<Self>,
}

impl WeatherMcp {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for WeatherMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "weather-assistant".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Answers natural-language weather questions for US locations using the \
                National Weather Service and a local Ollama model."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl WeatherMcp {
    /// Answers a free-text weather question
    #[tool(description = "Get current weather for a US location from a natural-language question (e.g., 'What's the weather like in Miami?'). Returns the latest NWS observation and a short AI-written summary.")]
    async fn get_weather(
        &self,
        Parameters(request): Parameters<GetWeatherRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting weather for query: {}", request.query);

        let report = self.assistant.ask(&request.query).await.map_err(|e| {
            if e.is_user_error() {
                McpError::invalid_params(e.to_string(), None)
            } else {
                McpError::internal_error(format!("Failed to fetch weather: {}", e), None)
            }
        })?;

        Ok(CallToolResult::success(vec![Content::text(format_report(
            &report,
        ))]))
    }
}
