//! Reference-page fetching and content extraction.
//!
//! This crate provides:
//! - [`PageFetcher`]: single-attempt HTTP GET with a fixed timeout
//! - [`extract`]: reduces markup to title, visible body text, and links
//!
//! Nothing in the chat flow consumes this yet; the `gameguide scrape`
//! command is its only caller.

pub mod extract;
pub mod fetch;

pub use extract::{UNTITLED, extract};
pub use fetch::{PageFetcher, decode_body};

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn fixture_url() -> Url {
        Url::parse("https://guides.example/zelda/lanayru").unwrap()
    }

    #[test]
    fn walkthrough_title() {
        let page = extract(&load_fixture("walkthrough.html"), &fixture_url());
        assert_eq!(page.title, "Shrine Walkthrough – Lanayru Region");
    }

    #[test]
    fn walkthrough_body_strips_chrome() {
        let page = extract(&load_fixture("walkthrough.html"), &fixture_url());

        assert!(page.body_text.contains("Start at the Lanayru Road East Gate"));
        assert!(page.body_text.contains("Battery tips"));
        // Header/footer blocks are dropped by class
        assert!(!page.body_text.contains("Guide Hub Home"));
        assert!(!page.body_text.contains("Copyright"));
        // Head scripts never reach the body
        assert!(!page.body_text.contains("analytics"));
        assert!(!page.body_text.contains('\n'));
    }

    #[test]
    fn walkthrough_ad_survives_inside_main() {
        // The `.ad` block itself is skipped, but its text is still part of
        // the enclosing <main>.
        let page = extract(&load_fixture("walkthrough.html"), &fixture_url());
        assert_eq!(
            page.body_text
                .matches("Buy the official strategy guide!")
                .count(),
            1
        );
    }

    #[test]
    fn walkthrough_links_are_absolute() {
        let page = extract(&load_fixture("walkthrough.html"), &fixture_url());
        let urls: Vec<&str> = page.links.iter().map(|l| l.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://guides.example/",
                "https://guides.example/guides",
                "https://guides.example/zelda/zonaite.html",
                "https://example.org/privacy",
            ]
        );
        assert_eq!(page.links[2].text, "Zonaite");
    }

    #[tokio::test]
    async fn fetch_then_extract() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/zelda/lanayru"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(load_fixture("walkthrough.html")),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/zelda/lanayru", server.uri())).unwrap();
        let fetcher = PageFetcher::new().unwrap();
        let markup = fetcher.fetch(&url).await.expect("markup");
        let page = extract(&markup, &url);

        assert_eq!(page.title, "Shrine Walkthrough – Lanayru Region");
        assert_eq!(
            page.links[2].url,
            format!("{}/zelda/zonaite.html", server.uri())
        );
    }
}
