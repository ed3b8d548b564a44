use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};

use crate::error::AstroError;
use crate::formatters::{format_night_report, format_viewing_levels};
use crate::models::GetViewingPlanRequest;
use crate::night::{NightReport, ViewingPlanner};
use crate::request::{RequestDefaults, ViewingRequest};

/// MCP front end for the viewing planner
#[derive(Clone)]
pub struct Astronomy {
    planner: ViewingPlanner,
    defaults: RequestDefaults,
    tool_router: ToolRouter<Self>,
}

impl Astronomy {
    /// Creates a new Astronomy service instance
    pub fn new(planner: ViewingPlanner, defaults: RequestDefaults) -> Self {
        Self {
            planner,
            defaults,
            tool_router: Self::tool_router(),
        }
    }

    /// Validates the tool arguments and builds the report
    async fn build_report(&self, request: GetViewingPlanRequest) -> Result<NightReport, McpError> {
        tracing::info!(
            "Building viewing plan for coordinates: {}, {}",
            request.latitude,
            request.longitude
        );

        let request = ViewingRequest::new(
            request.latitude,
            request.longitude,
            request.elevation,
            request.viewing_level.as_deref(),
            request.evening_start_hour,
            request.evening_end_hour,
            &self.defaults,
        )
        .map_err(to_mcp_error)?;

        Ok(self.planner.get_viewing_data(&request).await)
    }
}

fn to_mcp_error(e: AstroError) -> McpError {
    match e {
        AstroError::InvalidParameter { .. } => McpError::invalid_params(e.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

#[tool_handler]
impl ServerHandler for Astronomy {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "astronomy-buddy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Recommends celestial objects worth observing tonight from a given location, \
                combining body positions, a seeing forecast, and the observer's equipment."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Astronomy {
    /// Gets a human-readable observing plan for tonight
    #[tool(description = "Get tonight's observing plan for a location. Provide latitude, longitude and elevation in metres (e.g., latitude: 47.6062, longitude: -122.3321, elevation: 50 for Seattle). Optionally set viewingLevel (naked-eye, entry, intermediate, advanced) and the evening window with eveningStartHour/eveningEndHour (0-23, may wrap past midnight).")]
    async fn get_viewing_plan(
        &self,
        Parameters(request): Parameters<GetViewingPlanRequest>,
    ) -> Result<CallToolResult, McpError> {
        let report = self.build_report(request).await?;
        let formatted = format_night_report(&report);

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Gets the full night report as JSON
    #[tool(description = "Get tonight's observing report as JSON: weather verdict plus excellent/good/fair targets with peak hour, altitude and compass direction. Same parameters as get_viewing_plan.")]
    async fn get_viewing_data(
        &self,
        Parameters(request): Parameters<GetViewingPlanRequest>,
    ) -> Result<CallToolResult, McpError> {
        let report = self.build_report(request).await?;
        let json = serde_json::to_string_pretty(&report).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize report: {}", e), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Lists the equipment presets
    #[tool(description = "List the supported viewing levels with their limiting magnitude and minimum altitude.")]
    async fn list_viewing_levels(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(format_viewing_levels())]))
    }
}
