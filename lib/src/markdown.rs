use pulldown_cmark::{html, Options, Parser};

/// Converts basic markdown to HTML. No extensions are enabled.
pub fn markdown(input: &str) -> String {
    let parser = Parser::new_ext(input, Options::empty());
    let mut output = String::with_capacity(input.len() + input.len() / 2);
    html::push_html(&mut output, parser);
    output
}
