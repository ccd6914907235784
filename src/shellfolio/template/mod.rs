//! # Response templates
//!
//! Catalog entries that are not built-ins carry a response template. Three
//! token shapes are recognized:
//!
//! | Shape                      | Example                        |
//! |----------------------------|--------------------------------|
//! | variable                   | `{{user}}`                     |
//! | styling call               | `{{color.green("online")}}`    |
//! | handler call               | `{{project(args[0])}}`         |
//!
//! The template is tokenized once and resolved in three passes, in the order
//! of the table. A pass only looks at tokens no earlier pass resolved, and
//! substituted text is never scanned again, so a context value that happens to
//! contain `{{...}}` is emitted as-is.
//!
//! Processing never fails. A token nothing can resolve (unknown variable,
//! style or handler, or an unrecognized shape) is emitted verbatim.

pub mod context;
pub mod handlers;
pub mod styling;
pub mod tokenizer;

pub use context::TemplateContext;
pub use handlers::Handler;

use std::collections::HashMap;
use termstyle::Styles;
use tokenizer::Segment;
use tracing::debug;

pub struct TemplateProcessor {
    styles: Styles,
    handlers: HashMap<&'static str, Handler>,
    use_color: bool,
}

impl TemplateProcessor {
    /// A processor with the stock style registry and built-in handlers.
    pub fn new(use_color: bool) -> Self {
        let mut processor = Self {
            styles: styling::template_styles(),
            handlers: HashMap::new(),
            use_color,
        };
        for (name, handler) in handlers::builtin_handlers() {
            processor.register_handler(name, handler);
        }
        processor
    }

    pub fn register_handler(&mut self, name: &'static str, handler: Handler) {
        self.handlers.insert(name, handler);
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn process(&self, template: &str, context: &TemplateContext) -> String {
        let mut segments = tokenizer::tokenize(template);

        resolve_pass(&mut segments, |inner| {
            tokenizer::as_variable(inner).and_then(|key| context.lookup(key))
        });
        resolve_pass(&mut segments, |inner| {
            let (name, text) = tokenizer::as_style_call(inner)?;
            if self.use_color {
                self.styles.try_apply(&name, text)
            } else {
                self.styles.has(&name).then(|| text.to_string())
            }
        });
        resolve_pass(&mut segments, |inner| {
            let (name, index) = tokenizer::as_handler_call(inner)?;
            let handler = self.handlers.get(name)?;
            Some(handler(index.and_then(|i| context.arg(i))))
        });

        let mut out = String::with_capacity(template.len());
        for segment in segments {
            match segment {
                Segment::Literal(text) | Segment::Resolved(text) => out.push_str(&text),
                Segment::Token { raw, .. } => {
                    debug!(token = %raw, "unresolved template token");
                    out.push_str(&raw);
                }
            }
        }
        out
    }
}

fn resolve_pass<F>(segments: &mut [Segment], resolve: F)
where
    F: Fn(&str) -> Option<String>,
{
    for segment in segments.iter_mut() {
        if let Segment::Token { inner, .. } = &*segment {
            if let Some(value) = resolve(inner) {
                *segment = Segment::Resolved(value);
            }
        }
    }
}
