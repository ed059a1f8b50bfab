//! Input classification and URL-shape rules.
//!
//! The same rules serve typed input, back/forward traversal and session
//! restore: only the URL survives on the stack, so the page variant is
//! always re-derived from it.

use tidewave_core::types::PageVariant;
use url::Url;

/// Sentinel address of the new-tab page
pub const NEW_TAB_URL: &str = "internal://newtab";

/// Prefix of canonical search URLs
pub const SEARCH_URL_PREFIX: &str = "internal://search?q=";

/// Address of the search page without its query string
const SEARCH_PAGE_URL: &str = "internal://search";

/// Label used for the new-tab page
pub const NEW_TAB_TITLE: &str = "New Tab";

/// Where a piece of typed input leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    NewTab,
    Search { query: String, url: String },
    External { url: String },
}

/// Classify raw address-bar input.
pub fn classify_input(raw: &str) -> NavigationTarget {
    let input = raw.trim();

    if input.is_empty() || input == NEW_TAB_URL {
        return NavigationTarget::NewTab;
    }

    if input.contains("://") {
        return match classify(input) {
            PageVariant::NewTab => NavigationTarget::NewTab,
            PageVariant::SearchResults => NavigationTarget::Search {
                query: query_from_url(input),
                url: input.to_string(),
            },
            PageVariant::External => NavigationTarget::External {
                url: input.to_string(),
            },
        };
    }

    if input.contains('.') && !input.chars().any(char::is_whitespace) {
        return NavigationTarget::External {
            url: format!("https://{}", input),
        };
    }

    NavigationTarget::Search {
        query: input.to_string(),
        url: search_url(input),
    }
}

/// Page variant for a URL already on the stack.
pub fn classify(url: &str) -> PageVariant {
    if url == NEW_TAB_URL {
        PageVariant::NewTab
    } else if is_search_page(url) {
        PageVariant::SearchResults
    } else {
        PageVariant::External
    }
}

fn is_search_page(url: &str) -> bool {
    match url.strip_prefix(SEARCH_PAGE_URL) {
        Some(rest) => rest.is_empty() || rest.starts_with('?'),
        None => false,
    }
}

/// Canonical URL for a search query
pub fn search_url(query: &str) -> String {
    format!("{}{}", SEARCH_URL_PREFIX, urlencoding::encode(query))
}

/// Recover the query from a canonical search URL. Missing or undecodable
/// queries come back empty.
pub fn query_from_url(url: &str) -> String {
    if let Some(encoded) = url.strip_prefix(SEARCH_URL_PREFIX) {
        if !encoded.contains('&') {
            return urlencoding::decode(encoded)
                .map(|q| q.into_owned())
                .unwrap_or_else(|_| encoded.to_string());
        }
    }

    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

/// Display title from a URL's host, falling back to the raw string
pub fn host_title(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => url.to_string(),
        },
        Err(err) => {
            tracing::debug!(url, error = %err, "Cannot parse URL for title");
            url.to_string()
        }
    }
}

/// Title for a search results page
pub fn search_title(query: &str) -> String {
    format!("Search: {}", query)
}

/// Title for any URL, following the page-type rule.
pub fn title_for_url(url: &str) -> String {
    match classify(url) {
        PageVariant::NewTab => NEW_TAB_TITLE.to_string(),
        PageVariant::SearchResults => search_title(&query_from_url(url)),
        PageVariant::External => host_title(url),
    }
}

/// Host portion of a URL, if it has one
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_https() {
        assert_eq!(
            classify_input("wikipedia.org"),
            NavigationTarget::External {
                url: "https://wikipedia.org".to_string()
            }
        );
    }

    #[test]
    fn test_phrase_is_search() {
        assert_eq!(
            classify_input("  best coffee shop "),
            NavigationTarget::Search {
                query: "best coffee shop".to_string(),
                url: "internal://search?q=best%20coffee%20shop".to_string(),
            }
        );
    }

    #[test]
    fn test_dotted_phrase_with_space_is_search() {
        assert!(matches!(
            classify_input("node.js tutorial"),
            NavigationTarget::Search { .. }
        ));
        assert!(matches!(classify_input("localhost"), NavigationTarget::Search { .. }));
    }

    #[test]
    fn test_explicit_url_kept_verbatim() {
        assert_eq!(
            classify_input("http://example.com/a?b=c"),
            NavigationTarget::External {
                url: "http://example.com/a?b=c".to_string()
            }
        );
    }

    #[test]
    fn test_new_tab_inputs() {
        assert_eq!(classify_input(""), NavigationTarget::NewTab);
        assert_eq!(classify_input("   "), NavigationTarget::NewTab);
        assert_eq!(classify_input(NEW_TAB_URL), NavigationTarget::NewTab);
    }

    #[test]
    fn test_typed_search_url_opens_search_page() {
        assert_eq!(
            classify_input("internal://search?q=rust%20lang"),
            NavigationTarget::Search {
                query: "rust lang".to_string(),
                url: "internal://search?q=rust%20lang".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_url_shapes() {
        assert_eq!(classify(NEW_TAB_URL), PageVariant::NewTab);
        assert_eq!(classify("internal://search?q=x"), PageVariant::SearchResults);
        assert_eq!(classify("https://example.com"), PageVariant::External);
    }

    #[test]
    fn test_search_lookalike_hosts_are_external() {
        assert_eq!(classify("internal://search"), PageVariant::SearchResults);
        assert_eq!(
            classify("internal://searchengine.example/x"),
            PageVariant::External
        );
        assert_eq!(
            classify_input("internal://searchengine.example/x"),
            NavigationTarget::External {
                url: "internal://searchengine.example/x".to_string()
            }
        );
    }

    #[test]
    fn test_query_round_trip_through_url() {
        let query = "caffè & crema + 100%";
        assert_eq!(query_from_url(&search_url(query)), query);
    }

    #[test]
    fn test_titles() {
        assert_eq!(host_title("https://docs.rs/serde"), "docs.rs");
        assert_eq!(host_title("not a url"), "not a url");
        assert_eq!(title_for_url(NEW_TAB_URL), NEW_TAB_TITLE);
        assert_eq!(title_for_url(&search_url("rust")), "Search: rust");
        assert_eq!(title_for_url("https://example.com/x"), "example.com");
    }
}
