//! Permalink-pattern detection for pruning boilerplate navigation.
//!
//! Sites with paginated listings (blog indexes, product archives) repeat the
//! same permalink structure across dozens of navigation links. Grouping URLs
//! by a wildcarded path template lets us drop those listings in bulk while
//! keeping the structurally unique pages.

use std::collections::{HashMap, HashSet};

use url::Url;

use crate::extract::Link;

/// Number of links that must share a pattern before the whole group is
/// considered a repeated structural listing and excluded.
pub const PATTERN_THRESHOLD: usize = 10;

/// Compute the permalink pattern of a URL relative to a base URL.
///
/// The base URL's path prefix is stripped, the remainder is split into
/// segments, and with two or more segments the last one is replaced with a
/// wildcard: `https://a.com/blog/2023/post-1` against `https://a.com/blog`
/// yields `/2023/*/`. Shorter paths keep their raw path as the pattern, and
/// a URL that fails to parse is its own pattern so it can never be grouped
/// away.
pub fn url_pattern(link: &str, base_url: &str) -> String {
    let parsed = match Url::parse(link) {
        Ok(url) => url,
        Err(_) => return link.to_string(),
    };

    let base_path = Url::parse(base_url)
        .map(|u| u.path().trim_matches('/').to_string())
        .unwrap_or_default();
    let full_path = parsed.path().trim_matches('/').to_string();

    let relative = if !base_path.is_empty() && full_path.starts_with(&base_path) {
        full_path[base_path.len()..].trim_matches('/').to_string()
    } else {
        full_path
    };

    if !relative.is_empty() {
        let parts: Vec<&str> = relative.split('/').collect();
        if parts.len() >= 2 {
            let mut pattern_parts: Vec<&str> = parts[..parts.len() - 1].to_vec();
            pattern_parts.push("*");
            return format!("/{}/", pattern_parts.join("/"));
        }
    }

    parsed.path().to_string()
}

/// Find the URLs whose pattern occurs at least [`PATTERN_THRESHOLD`] times
/// across the given links.
pub fn repeated_pattern_urls(links: &[Link], base_url: &str) -> HashSet<String> {
    let mut pattern_counts: HashMap<String, usize> = HashMap::new();
    let mut url_to_pattern: HashMap<&str, String> = HashMap::new();

    for link in links {
        let pattern = url_pattern(&link.url, base_url);
        *pattern_counts.entry(pattern.clone()).or_insert(0) += 1;
        url_to_pattern.insert(link.url.as_str(), pattern);
    }

    let repeated: HashSet<&String> = pattern_counts
        .iter()
        .filter(|(_, count)| **count >= PATTERN_THRESHOLD)
        .map(|(pattern, _)| pattern)
        .collect();

    url_to_pattern
        .into_iter()
        .filter(|(_, pattern)| repeated.contains(pattern))
        .map(|(url, _)| url.to_string())
        .collect()
}

/// Drop every link whose pattern is shared by [`PATTERN_THRESHOLD`] or more
/// links. Relative order of the survivors is preserved.
pub fn filter_repeated(links: Vec<Link>, base_url: &str) -> Vec<Link> {
    let excluded = repeated_pattern_urls(&links, base_url);
    links
        .into_iter()
        .filter(|link| !excluded.contains(&link.url))
        .collect()
}

/// Merge link lists preserving first-seen order, deduplicating by absolute
/// URL string.
pub fn dedup_links(lists: Vec<Vec<Link>>) -> Vec<Link> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for link in list {
            if seen.insert(link.url.clone()) {
                merged.push(link);
            }
        }
    }
    merged
}

/// Whether `target_url` is on the same registrable domain as `base_host`,
/// subdomains included. `base_host` must already be lowercase.
pub fn is_same_domain(base_host: &str, target_url: &str) -> bool {
    match Url::parse(target_url) {
        Ok(url) => match url.host_str() {
            Some(host) => {
                let host = host.to_ascii_lowercase();
                host == base_host || host.ends_with(&format!(".{}", base_host))
            }
            None => false,
        },
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str) -> Link {
        Link {
            text: "x".into(),
            url: url.into(),
            content_headings: Vec::new(),
        }
    }

    #[test]
    fn test_pattern_strips_base_path_and_wildcards_last_segment() {
        let pattern = url_pattern("https://example.com/blog/2023/post-1", "https://example.com/blog");
        assert_eq!(pattern, "/2023/*/");
    }

    #[test]
    fn test_pattern_single_segment_keeps_raw_path() {
        let pattern = url_pattern("https://example.com/blog/about", "https://example.com/blog");
        assert_eq!(pattern, "/blog/about");
    }

    #[test]
    fn test_pattern_without_base_path() {
        let pattern = url_pattern("https://example.com/shop/items/42", "https://example.com");
        assert_eq!(pattern, "/shop/items/*/");
    }

    #[test]
    fn test_pattern_is_deterministic() {
        let first = url_pattern("https://example.com/a/b/c", "https://example.com/a");
        let second = url_pattern("https://example.com/a/b/c", "https://example.com/a");
        assert_eq!(first, second);
    }

    #[test]
    fn test_unparseable_url_is_its_own_pattern() {
        assert_eq!(url_pattern("not a url", "https://example.com"), "not a url");
    }

    #[test]
    fn test_repeated_patterns_excluded_at_threshold() {
        let base = "https://example.com/blog";
        let mut links: Vec<Link> = (1..=12)
            .map(|i| link(&format!("https://example.com/blog/2023/post-{}", i)))
            .collect();
        links.push(link("https://example.com/blog/about"));

        let filtered = filter_repeated(links, base);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].url, "https://example.com/blog/about");
    }

    #[test]
    fn test_below_threshold_nothing_excluded() {
        let base = "https://example.com/blog";
        let links: Vec<Link> = (1..=9)
            .map(|i| link(&format!("https://example.com/blog/2023/post-{}", i)))
            .collect();

        let filtered = filter_repeated(links, base);
        assert_eq!(filtered.len(), 9);
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let merged = dedup_links(vec![
            vec![link("https://a.com/1"), link("https://a.com/2")],
            vec![link("https://a.com/2"), link("https://a.com/3")],
        ]);
        let urls: Vec<&str> = merged.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/1", "https://a.com/2", "https://a.com/3"]);
    }

    #[test]
    fn test_same_domain_allows_subdomains() {
        assert!(is_same_domain("example.com", "https://example.com/page"));
        assert!(is_same_domain("example.com", "https://sub.example.com/page"));
        assert!(!is_same_domain("example.com", "https://notexample.com/page"));
    }
}
