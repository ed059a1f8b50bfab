//! Deterministic mock search results.
//!
//! Output depends on the query string alone, so the same query renders the
//! same page across reloads and restarts. No RNG is involved.

use tidewave_core::types::SearchResult;

/// Results produced per query
pub const RESULT_COUNT: usize = 8;

const TAGS: [&str; 4] = ["Guide", "News", "Reference", "Forum"];

/// 32-bit rolling hash, `h = h * 31 + c` over UTF-16 code units
pub fn query_hash(query: &str) -> i32 {
    query.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Build the fixed-size result page for `query`.
pub fn synthesize(query: &str) -> Vec<SearchResult> {
    let hash = query_hash(query);
    let slug = slugify(query);

    (0..RESULT_COUNT)
        .map(|slot| {
            // Signed seed; euclidean remainders keep negative hashes in 0..4.
            let seed = i64::from(hash) + slot as i64;
            let is_ad = seed.rem_euclid(4) == 0;
            let tag = TAGS[seed.div_euclid(4).rem_euclid(4) as usize];
            let id = format!("{:08x}-{}", hash as u32, slot);

            if is_ad {
                SearchResult {
                    id,
                    title: format!("{} - Sponsored offers", query),
                    url: format!("https://ads.example/{}/{}", slug, slot),
                    snippet: format!(
                        "Sponsored. Compare top-rated deals on {} and save today.",
                        query
                    ),
                    is_ad,
                }
            } else {
                SearchResult {
                    id,
                    title: format!("{}: {} ({})", tag, query, slot + 1),
                    url: format!(
                        "https://{}.example/{}/{}",
                        tag.to_ascii_lowercase(),
                        slug,
                        slot
                    ),
                    snippet: format!(
                        "{} coverage of \"{}\". Result {} of {} collected for this query.",
                        tag,
                        query,
                        slot + 1,
                        RESULT_COUNT
                    ),
                    is_ad,
                }
            }
        })
        .collect()
}

fn slugify(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    for c in query.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "query".to_string()
    } else {
        slug.to_string()
    }
}
