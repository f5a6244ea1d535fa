use std::collections::HashMap;

pub mod context;
#[cfg(test)]
mod tests;

/// A page listing users. Both engines understand this syntax, so the same
/// source is used for each.
pub const TEMPLATE: &str = "<html><head><title>{{title}}</title></head><body><ul>\
{{#each users}}<li>{{@index}}: {{name}} ({{age}}){{#if is_disabled}} disabled{{/if}}</li>{{/each}}\
</ul>{{> footer}}</body></html>";

/// A partial included by [`TEMPLATE`].
pub const FOOTER: &str =
    "<footer>{{#if users}}{{#with users.[0]}}first: {{name}}{{/with}}{{else}}nobody{{/if}}</footer>";

/// Abstraction for a template engine.
pub trait Engine<'a> {
    fn name() -> &'static str;
    fn new() -> Self;
    fn add_template(&mut self, name: &'static str, source: &'a str);
    fn render<S>(&self, name: &'static str, ctx: &S) -> String
    where
        S: serde::Serialize;
}

////////////////////////////////////////////////////////////////////////////////
/// handlebars
////////////////////////////////////////////////////////////////////////////////

pub type Handlebars<'engine> = handlebars::Handlebars<'engine>;

impl<'engine> Engine<'engine> for Handlebars<'engine> {
    #[inline]
    fn name() -> &'static str {
        "handlebars"
    }

    #[inline]
    fn new() -> Self {
        let mut hbs = handlebars::Handlebars::new();
        hbs.register_partial("footer", FOOTER).unwrap();
        hbs
    }

    #[inline]
    fn add_template(&mut self, name: &'static str, source: &'engine str) {
        self.register_template_string(name, source).unwrap();
    }

    #[inline]
    fn render<S>(&self, name: &'static str, ctx: &S) -> String
    where
        S: serde::Serialize,
    {
        self.render(name, ctx).unwrap()
    }
}

////////////////////////////////////////////////////////////////////////////////
/// whisker
////////////////////////////////////////////////////////////////////////////////

/// The whisker engine together with the templates compiled by it.
pub struct Whisker {
    engine: whisker::Engine,
    templates: HashMap<&'static str, whisker::Template>,
}

impl<'engine> Engine<'engine> for Whisker {
    #[inline]
    fn name() -> &'static str {
        "whisker"
    }

    #[inline]
    fn new() -> Self {
        let mut engine = whisker::Engine::new();
        engine.add_partial("footer", FOOTER).unwrap();
        Self {
            engine,
            templates: HashMap::new(),
        }
    }

    #[inline]
    fn add_template(&mut self, name: &'static str, source: &'engine str) {
        let template = self.engine.compile(source).unwrap();
        self.templates.insert(name, template);
    }

    #[inline]
    fn render<S>(&self, name: &'static str, ctx: &S) -> String
    where
        S: serde::Serialize,
    {
        self.templates[name]
            .render(&self.engine, ctx)
            .to_string()
            .unwrap()
    }
}
