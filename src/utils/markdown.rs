use pulldown_cmark::{Options, Parser, html};

/// Renders Markdown source to sanitized HTML.
///
/// The output depends only on the input, so rendering the same source twice
/// always yields the same HTML. Raw HTML embedded in the Markdown passes
/// through `ammonia`, which strips scripts, event handlers and other unsafe
/// markup while keeping ordinary formatting tags.
pub fn render(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options);
    let mut unsafe_html = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut unsafe_html, parser);

    ammonia::clean(&unsafe_html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_emphasis() {
        let html = render("# Hi\n\nSome **bold** text");
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let src = "## Title\n\n- a\n- b\n\n```rust\nfn main() {}\n```\n";
        assert_eq!(render(src), render(src));
    }

    #[test]
    fn strips_scripts() {
        let html = render("hello <script>alert(1)</script> <a href=\"#\" onclick=\"x()\">x</a>");
        assert!(!html.contains("<script"));
        assert!(!html.contains("onclick"));
    }
}
