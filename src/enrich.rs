//! Bounded concurrent heading enrichment for filtered link lists.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use url::Url;

use crate::extract::{self, Link};
use crate::fetch::PageFetcher;
use crate::pattern;

/// Maximum number of link targets visited per enrichment pass.
pub const MAX_ENRICH_URLS: usize = 20;

/// Concurrent fetch limit within one enrichment pass.
pub const ENRICH_CONCURRENCY: usize = 5;

/// Per-URL fetch budget during enrichment.
pub const ENRICH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetch sub-heading lists for same-domain links, in place.
///
/// Only links on the base URL's domain (or a subdomain) are visited, capped
/// at [`MAX_ENRICH_URLS`] with [`ENRICH_CONCURRENCY`] fetches in flight.
/// Results are written back by index, so completion order never reorders the
/// list; a failed fetch leaves that link's heading list empty.
pub async fn enrich_with_headings(fetcher: &PageFetcher, base_url: &Url, links: &mut [Link]) {
    let base_host = match base_url.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return,
    };

    let eligible: Vec<(usize, String)> = links
        .iter()
        .enumerate()
        .filter(|(_, link)| pattern::is_same_domain(&base_host, &link.url))
        .map(|(idx, link)| (idx, link.url.clone()))
        .take(MAX_ENRICH_URLS)
        .collect();

    if eligible.is_empty() {
        return;
    }
    tracing::debug!("enriching {} of {} links with headings", eligible.len(), links.len());

    let results: Vec<(usize, Vec<String>)> = stream::iter(eligible.into_iter().map(
        |(idx, url)| async move { (idx, fetch_headings(fetcher, &url).await) },
    ))
    .buffer_unordered(ENRICH_CONCURRENCY)
    .collect()
    .await;

    for (idx, headings) in results {
        links[idx].content_headings = headings;
    }
}

async fn fetch_headings(fetcher: &PageFetcher, url: &str) -> Vec<String> {
    match fetcher.fetch_with_timeout(url, ENRICH_TIMEOUT).await {
        Ok(html) => extract::extract_headings(&html),
        Err(e) => {
            tracing::debug!("heading fetch failed for {}: {}", url, e);
            Vec::new()
        }
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

    #[tokio::test]
    async fn test_offsite_links_left_untouched() {
        // No same-domain link means no fetch is attempted at all.
        let fetcher = PageFetcher::new();
        let base = Url::parse("https://example.com").unwrap();
        let mut links = vec![link("https://elsewhere.org/a"), link("https://elsewhere.org/b")];

        enrich_with_headings(&fetcher, &base, &mut links).await;

        assert!(links.iter().all(|l| l.content_headings.is_empty()));
    }

    #[test]
    fn test_eligibility_respects_cap_and_domain() {
        let base_host = "example.com";
        let links: Vec<Link> = (0..30)
            .map(|i| {
                if i % 2 == 0 {
                    link(&format!("https://example.com/p{}", i))
                } else {
                    link(&format!("https://other.net/p{}", i))
                }
            })
            .collect();

        let eligible: Vec<usize> = links
            .iter()
            .enumerate()
            .filter(|(_, l)| pattern::is_same_domain(base_host, &l.url))
            .map(|(idx, _)| idx)
            .take(MAX_ENRICH_URLS)
            .collect();

        assert_eq!(eligible.len(), 15);
        assert!(eligible.iter().all(|idx| idx % 2 == 0));
    }
}
