//! Boilerplate-stripping content extraction.
//!
//! Reduces an HTML document to its title, the visible text of
//! content-bearing elements, and its outbound links. Nested content-bearing
//! elements each contribute their full text, so a `<p>` inside a `<div>`
//! appears twice in the body text.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use gameguide_shared::{ExtractedPage, PageLink};

/// Title used when the document has no `<title>`.
pub const UNTITLED: &str = "No title";

/// Element kinds whose text is collected into the body.
const CONTENT_TAGS: &str = "p, div, article, main, span, h1, h2, h3, h4, h5, h6";

/// Element kinds never treated as content.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "header", "footer", "nav", "aside", "comment",
];

/// Class names marking presentational chrome (ads, menus, sidebars).
const EXCLUDED_CLASSES: &[&str] = &[
    "header",
    "footer",
    "nav",
    "sidebar",
    "ad",
    "advertisement",
    "widget",
    "menu",
];

/// Elements whose text content is never visible.
const HIDDEN_TEXT_TAGS: &[&str] = &["script", "style", "template"];

/// Extract title, body text, and links from `markup`.
///
/// Relative hrefs are resolved against `base_url`.
pub fn extract(markup: &str, base_url: &Url) -> ExtractedPage {
    let doc = Html::parse_document(markup);

    ExtractedPage {
        title: extract_title(&doc),
        body_text: extract_body_text(&doc),
        links: extract_links(&doc, base_url),
    }
}

/// Text of the first `<title>`, or [`UNTITLED`].
fn extract_title(doc: &Html) -> String {
    let title_sel = Selector::parse("title").unwrap();
    doc.select(&title_sel)
        .next()
        .map(|el| visible_text(el, ""))
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn extract_body_text(doc: &Html) -> String {
    let content_sel = Selector::parse(CONTENT_TAGS).unwrap();

    let parts: Vec<String> = doc
        .select(&content_sel)
        .filter(|el| !is_chrome(el))
        .map(|el| visible_text(el, " "))
        .filter(|text| !text.is_empty())
        .collect();

    parts
        .join(" ")
        .replace('\n', " ")
        .replace('\r', "")
        .trim()
        .to_string()
}

/// Whether an element is boilerplate by tag name or class.
fn is_chrome(el: &ElementRef<'_>) -> bool {
    let element = el.value();
    if EXCLUDED_TAGS.contains(&element.name()) {
        return true;
    }
    element
        .classes()
        .any(|class| EXCLUDED_CLASSES.contains(&class))
}

/// Every `<a href>` with its text and absolute URL.
fn extract_links(doc: &Html, base_url: &Url) -> Vec<PageLink> {
    let link_sel = Selector::parse("a[href]").unwrap();

    doc.select(&link_sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let url = base_url
                .join(href)
                .map(|resolved| resolved.to_string())
                .unwrap_or_else(|_| href.to_string());
            Some(PageLink {
                text: visible_text(el, ""),
                url,
            })
        })
        .collect()
}

/// Descendant text of `root`, each piece trimmed, empties dropped, joined by `separator`.
fn visible_text(root: ElementRef<'_>, separator: &str) -> String {
    let mut pieces: Vec<&str> = Vec::new();

    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root.id())
            .any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_TEXT_TAGS.contains(&e.name()))
            });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    pieces.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://site.example/page").unwrap()
    }

    #[test]
    fn excludes_ad_class_and_keeps_title() {
        let page = extract(r#"<title>T</title><p class="ad">X</p><p>Y</p>"#, &base());
        assert_eq!(page.title, "T");
        assert!(page.body_text.contains('Y'));
        assert!(!page.body_text.contains('X'));
    }

    #[test]
    fn resolves_relative_links() {
        let page = extract(r#"<a href="/g">G</a>"#, &base());
        assert_eq!(page.links.len(), 1);
        assert_eq!(page.links[0].text, "G");
        assert_eq!(page.links[0].url, "https://site.example/g");
    }

    #[test]
    fn keeps_absolute_links_untouched() {
        let page = extract(
            r#"<a href="https://other.example/wiki?q=1"> Wiki </a><a>no href</a>"#,
            &base(),
        );
        assert_eq!(page.links.len(), 1);
        assert_eq!(page.links[0].text, "Wiki");
        assert_eq!(page.links[0].url, "https://other.example/wiki?q=1");
    }

    #[test]
    fn missing_title_uses_placeholder() {
        let page = extract("<p>body only</p>", &base());
        assert_eq!(page.title, UNTITLED);
        assert_eq!(page.body_text, "body only");
    }

    #[test]
    fn class_match_is_per_token() {
        let page = extract(
            r#"<div class="content main-menu">kept</div><div class="box menu">dropped</div>"#,
            &base(),
        );
        assert!(page.body_text.contains("kept"));
        assert!(!page.body_text.contains("dropped"));
    }

    #[test]
    fn chrome_tags_only_skip_themselves() {
        // Content tags nested in <nav>/<header> still count; only the chrome
        // element itself is skipped.
        let page = extract(
            "<nav><p>Menu text</p></nav><header><h1>Site</h1></header><p>Body</p>",
            &base(),
        );
        assert_eq!(page.body_text, "Menu text Site Body");
    }

    #[test]
    fn nested_text_is_duplicated() {
        let page = extract("<div><p>Hello</p></div>", &base());
        assert_eq!(page.body_text, "Hello Hello");
    }

    #[test]
    fn script_and_style_text_is_invisible() {
        let page = extract(
            "<div>Visible<script>var tracker = 1;</script><style>p{}</style></div>",
            &base(),
        );
        assert_eq!(page.body_text, "Visible");
    }

    #[test]
    fn line_breaks_collapse_to_spaces() {
        let page = extract("<p>first\nline</p><h2>\r\n Heading \r\n</h2>", &base());
        assert_eq!(page.body_text, "first line Heading");
    }

    #[test]
    fn text_outside_content_tags_is_ignored() {
        let page = extract("<body>loose text<ul><li>item</li></ul><h1>Title</h1></body>", &base());
        assert_eq!(page.body_text, "Title");
    }
}
