use std::collections::{HashMap, HashSet};

/// Render survey instructions to HTML, keeping only a small inline/block tag set.
#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);

    let parser = pulldown_cmark::Parser::new_ext(input, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "br", "em", "strong", "del", "code", "blockquote", "ul", "ol", "li", "a",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_emphasis_and_lists() {
        let html = markdown_to_html("Answer **honestly**.\n\n- one\n- two");
        assert!(html.contains("<strong>honestly</strong>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn strips_scripts_and_headings() {
        let html = markdown_to_html("# Title\n\n<script>alert(1)</script>plain");
        assert!(!html.contains("<script"));
        assert!(!html.contains("<h1"));
        assert!(html.contains("Title"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(markdown_to_html("").is_empty());
    }
}
