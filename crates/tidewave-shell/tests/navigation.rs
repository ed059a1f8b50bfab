//! End-to-end navigation behavior of the session controller

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tidewave_core::types::PageVariant;
use tidewave_core::{Config, MemoryStore};
use tidewave_shell::{BrowserSession, NEW_TAB_URL};

fn session() -> BrowserSession<MemoryStore> {
    BrowserSession::open(MemoryStore::new(), Config::default()).with_rng(StdRng::seed_from_u64(7))
}

#[test]
fn query_classification() {
    let mut session = session();

    session.navigate("wikipedia.org");
    assert_eq!(session.active_page(), PageVariant::External);
    assert_eq!(session.current_url(), "https://wikipedia.org");

    session.navigate("best coffee shop");
    assert_eq!(session.active_page(), PageVariant::SearchResults);
    assert_eq!(
        session.current_url(),
        "internal://search?q=best%20coffee%20shop"
    );
    assert_eq!(session.search_results().len(), 8);
}

#[test]
fn explicit_scheme_is_kept() {
    let mut session = session();
    session.navigate("http://example.com/a b");
    assert_eq!(session.current_url(), "http://example.com/a b");
    assert_eq!(session.active_page(), PageVariant::External);
}

#[test]
fn forward_truncation() {
    let mut session = session();
    session.navigate("a.example");
    session.navigate("b.example");
    session.navigate("c.example");
    assert_eq!(session.history().current_index(), 3);

    assert!(session.back());
    session.navigate("d.example");

    assert_eq!(
        session.history().entries(),
        &[
            NEW_TAB_URL.to_string(),
            "https://a.example".to_string(),
            "https://b.example".to_string(),
            "https://d.example".to_string(),
        ]
    );
    assert_eq!(session.history().current_index(), 3);
    assert!(!session.history().can_go_forward());
}

#[test]
fn history_index_stays_in_range() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut session = session();
    let inputs = ["", "rust", "docs.rs", "https://x.example", "a b c"];

    for _ in 0..500 {
        match rng.gen_range(0..4) {
            0 => {
                let input = inputs[rng.gen_range(0..inputs.len())];
                session.navigate(input);
            }
            1 => {
                session.back();
            }
            2 => {
                session.forward();
            }
            _ => {
                session.reload();
            }
        }

        let history = session.history();
        assert!(history.current_index() < history.len());
        assert_eq!(session.current_url(), history.entries()[history.current_index()]);
    }
}

#[test]
fn only_latest_load_completes() {
    let mut session = session();
    let search = session.navigate("slow query").expect("search load");
    let external = session.navigate("fast.example").expect("external load");

    assert!(search.latency < external.latency);
    // The shorter search timer fires first but belongs to a superseded load.
    assert!(!session.finish_load(search.generation));
    assert!(session.is_loading());
    assert!(session.finish_load(external.generation));
    assert!(!session.is_loading());
}

#[test]
fn traversal_does_not_start_loading() {
    let mut session = session();
    let pending = session.navigate("a.example").unwrap();
    session.finish_load(pending.generation);
    let pending = session.navigate("b.example").unwrap();
    session.finish_load(pending.generation);

    assert!(session.back());
    assert!(!session.is_loading());
    assert!(session.forward());
    assert!(!session.is_loading());
}

#[test]
fn search_page_survives_traversal() {
    let mut session = session();
    session.navigate("ownership and borrowing");
    let first = session.search_results().to_vec();
    session.navigate("");
    session.back();

    assert_eq!(session.active_query(), "ownership and borrowing");
    assert_eq!(session.search_results(), first.as_slice());
}
