//! Strict placeholder renderer.

use kickstart_core::{
    application::ports::TemplateRenderer, domain::RenderContext, error::KickstartResult,
};
use tracing::instrument;

/// Renderer that refuses any body with an unresolved `{{NAME}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictRenderer;

impl StrictRenderer {
    /// Create a new strict renderer.
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for StrictRenderer {
    #[instrument(skip_all, fields(variables = context.len()))]
    fn render(&self, body: &str, context: &RenderContext) -> KickstartResult<String> {
        Ok(context.render(body)?)
    }
}
