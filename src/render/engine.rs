use crate::error::RenderError;
use serde::Serialize;
use tera::{Context, Tera};

/// Tera-backed template engine. Templates named `*.html` are autoescaped.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Register a batch of templates at once, so `extends` may point at any
    /// template in the batch regardless of order.
    pub fn with_templates(templates: &[(&str, &str)]) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())?;
        Ok(Self { tera })
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String, RenderError> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render a named template with a serializable view as its context.
    pub fn render_view<T: Serialize>(
        &self,
        template_name: &str,
        view: &T,
    ) -> Result<String, RenderError> {
        let context = Context::from_serialize(view)?;
        self.render(template_name, &context)
    }
}
