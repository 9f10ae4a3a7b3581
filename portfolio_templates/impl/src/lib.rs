use std::{collections::HashMap, sync::Arc};

use portfolio_di::Build;
use portfolio_templates_contracts::{Template, TemplateService, BASE_TEMPLATE, TEMPLATES};
use portfolio_utils::{
    html::{escape_html, line_breaks_to_br},
    trace_instrument,
};
use tera::{try_get_value, Tera, Value};

#[derive(Debug, Clone, Build)]
pub struct TemplateServiceImpl {
    #[state]
    state: State,
}

#[derive(Debug, Clone)]
struct State(Arc<Tera>);

impl Default for State {
    fn default() -> Self {
        let mut tera = Tera::default();

        // escaping is explicit via the `escape_html` filter
        tera.autoescape_on(Vec::new());
        tera.register_filter("escape_html", escape_html_filter);
        tera.register_filter("nl2br", nl2br_filter);

        tera.add_raw_template("base", BASE_TEMPLATE).unwrap();

        for &(name, template) in TEMPLATES {
            tera.add_raw_template(name, template).unwrap();
        }

        Self(tera.into())
    }
}

impl TemplateService for TemplateServiceImpl {
    #[trace_instrument(skip(self, template), fields(template = T::NAME))]
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<String> {
        let context = tera::Context::from_serialize(template)?;
        self.state.0.render(T::NAME, &context).map_err(Into::into)
    }
}

fn escape_html_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = try_get_value!("escape_html", "value", String, value);
    Ok(escape_html(&text).into())
}

fn nl2br_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = try_get_value!("nl2br", "value", String, value);
    Ok(line_breaks_to_br(&text).into())
}
