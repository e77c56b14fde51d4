use std::borrow::Cow;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use minijinja::value::Value;
use serde::Serialize;

use crate::error::{Chainable, Result};
use crate::layout::Layout;
use crate::tree::{Element, Page};

/// What a page is rendered through.
#[derive(Debug, Clone, Copy)]
pub enum TemplateSource<'a> {
    /// A layout template; the page is only data. Used for markdown pages.
    Layout(&'a Layout),
    /// The page's own content is the template. Used for HTML pages.
    OwnContent,
}

/// The data a template sees.
///
/// Field names are capitalized: templates refer to `Title`, `Content`,
/// `URL`, `Path` and `Filename`.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    #[serde(rename = "Title")]
    pub title: &'a str,
    #[serde(rename = "Content")]
    pub content: &'a str,
    #[serde(rename = "URL")]
    pub url: &'a str,
    #[serde(rename = "Path")]
    pub path: Cow<'a, str>,
    #[serde(rename = "Filename")]
    pub file_name: &'a str,
}

#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.add_function("markdown", ext::markdown);
        env.add_filter("markdown", ext::markdown);
        Renderer { env }
    }

    pub fn render(&self, element: &Element, page: &Page, source: TemplateSource<'_>) -> Result<String> {
        let context = PageContext::new(element, page);
        let (name, template) = match source {
            TemplateSource::Layout(layout) => (layout.path.to_string_lossy(), &*layout.text),
            TemplateSource::OwnContent => (element.path.to_string_lossy(), &*page.content),
        };

        self.env.render_named_str(&name, template, context).chain_with(|| error! {
            "failed to render page",
            "page" => element.path.display(),
            "template" => name,
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

impl<'a> PageContext<'a> {
    pub fn new(element: &'a Element, page: &'a Page) -> Self {
        PageContext {
            title: &page.title,
            content: &page.content,
            url: &element.url,
            path: element.path.to_string_lossy(),
            file_name: &element.file_name,
        }
    }
}

mod ext {
    use super::Value;

    pub fn markdown(input: &str) -> Value {
        Value::from_safe_string(crate::markdown::markdown(input))
    }
}
