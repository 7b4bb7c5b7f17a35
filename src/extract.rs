//! HTML region identification and content extraction.
//!
//! Everything in this module is synchronous and operates on an already
//! fetched HTML string: `scraper::Html` is not `Send`, so parsed documents
//! must never be held across an await point.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

/// Cap on the number of headings reported per page.
pub const MAX_HEADINGS: usize = 100;

/// A navigation link harvested from a page region.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    /// Visible anchor text, whitespace-collapsed.
    pub text: String,
    /// Absolute URL the anchor resolves to.
    pub url: String,
    /// Sub-headings found on the target page, filled in by enrichment.
    pub content_headings: Vec<String>,
}

/// Per-region harvest counts, reported for diagnostics.
#[derive(Debug, Default, Serialize)]
pub struct SectionCounts {
    /// Links collected from the header region (pre-dedup).
    pub header_links: usize,
    /// Links collected from the footer region (pre-dedup).
    pub footer_links: usize,
    /// Links collected from independent nav regions (pre-dedup).
    pub nav_links: usize,
}

/// Result of harvesting a page's navigation regions.
#[derive(Debug)]
pub struct Harvest {
    /// Merged links, deduplicated by URL in first-seen order.
    pub links: Vec<Link>,
    /// How many links each region contributed.
    pub sections: SectionCounts,
}

/// Main-content text extracted from a page.
#[derive(Debug, Default)]
pub struct PageContent {
    /// Page `<title>` text, empty when absent.
    pub title: String,
    /// Normalized body text, one non-empty line per text run.
    pub text: String,
}

/// Contact links (mailto:/tel:) found anywhere on a page.
#[derive(Debug, Default)]
pub struct Contacts {
    /// Email addresses, first-seen order.
    pub emails: Vec<String>,
    /// Phone numbers, first-seen order.
    pub phones: Vec<String>,
}

// Content region candidates, in priority order.
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    r#"[role="main"]"#,
    "#content",
    ".content",
    "#main",
    ".main",
    "body",
];

// Tags whose text never belongs to the main content.
const EXCLUDED_TAGS: &[&str] = &["script", "style", "noscript", "header", "footer", "nav"];

/// Harvest navigation links from the page's header, footer, and independent
/// nav regions.
///
/// Header is the first `header` element (else `[role="banner"]`), footer the
/// first `footer` (else `[role="contentinfo"]`). Nav regions are `nav`
/// elements not nested inside the header. Anchors need non-empty visible
/// text and a resolvable href; `tel:`, `mailto:`, `javascript:` and
/// fragment-only hrefs are skipped.
pub fn harvest_links(html: &str, page_url: &Url) -> Harvest {
    let document = Html::parse_document(html);

    // Constant selectors, known valid.
    let header_sel = Selector::parse("header").unwrap();
    let banner_sel = Selector::parse(r#"[role="banner"]"#).unwrap();
    let footer_sel = Selector::parse("footer").unwrap();
    let contentinfo_sel = Selector::parse(r#"[role="contentinfo"]"#).unwrap();
    let nav_sel = Selector::parse("nav").unwrap();

    let header = document
        .select(&header_sel)
        .next()
        .or_else(|| document.select(&banner_sel).next());
    let footer = document
        .select(&footer_sel)
        .next()
        .or_else(|| document.select(&contentinfo_sel).next());

    let header_nav_ids: HashSet<_> = header
        .map(|h| h.select(&nav_sel).map(|nav| nav.id()).collect())
        .unwrap_or_default();
    let independent_navs: Vec<ElementRef<'_>> = document
        .select(&nav_sel)
        .filter(|nav| !header_nav_ids.contains(&nav.id()))
        .collect();

    let header_links = header
        .map(|el| links_in_region(el, page_url))
        .unwrap_or_default();
    let footer_links = footer
        .map(|el| links_in_region(el, page_url))
        .unwrap_or_default();
    let mut nav_links = Vec::new();
    for nav in independent_navs {
        nav_links.extend(links_in_region(nav, page_url));
    }

    let sections = SectionCounts {
        header_links: header_links.len(),
        footer_links: footer_links.len(),
        nav_links: nav_links.len(),
    };
    let links = crate::pattern::dedup_links(vec![header_links, footer_links, nav_links]);

    Harvest { links, sections }
}

/// Fallback harvest that scans every anchor in the document, for pages whose
/// markup carries no semantic header/footer/nav regions at all.
pub fn harvest_all_anchors(html: &str, page_url: &Url) -> Vec<Link> {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if is_non_navigational(href) {
            continue;
        }
        let Ok(absolute) = page_url.join(href) else {
            continue;
        };
        let absolute = absolute.to_string();
        if !seen.insert(absolute.clone()) {
            continue;
        }
        let mut text = collapse_whitespace(&anchor.text().collect::<String>());
        if text.is_empty() {
            text = "No text".into();
        }
        links.push(Link {
            text,
            url: absolute,
            content_headings: Vec::new(),
        });
    }
    links
}

/// Extract the page title and main-content text.
///
/// Candidate regions are tried in priority order (`main`, `article`,
/// `[role="main"]`, common content ids/classes, then `body`); script, style,
/// noscript, header, footer, and nav subtrees are excluded from the text.
pub fn extract_main_content(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    let title_sel = Selector::parse("title").unwrap();
    let title = document
        .select(&title_sel)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default();

    let mut region = None;
    for css in CONTENT_SELECTORS {
        let sel = Selector::parse(css).unwrap();
        if let Some(el) = document.select(&sel).next() {
            region = Some(el);
            break;
        }
    }

    let mut raw = String::new();
    if let Some(el) = region {
        collect_text(el, &mut raw);
    }
    let text = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    PageContent { title, text }
}

/// Extract level-2 then level-3 heading texts, deduplicated in first-seen
/// order and capped at [`MAX_HEADINGS`].
pub fn extract_headings(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut headings = Vec::new();
    for css in ["h2", "h3"] {
        let sel = Selector::parse(css).unwrap();
        for el in document.select(&sel) {
            let text = collapse_whitespace(&el.text().collect::<String>());
            if text.is_empty() || !seen.insert(text.clone()) {
                continue;
            }
            headings.push(text);
            if headings.len() >= MAX_HEADINGS {
                return headings;
            }
        }
    }
    headings
}

/// Collect email addresses and phone numbers from `mailto:` and `tel:`
/// anchors anywhere on the page.
pub fn extract_contacts(html: &str) -> Contacts {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").unwrap();

    let mut contacts = Contacts::default();
    let mut seen_emails = HashSet::new();
    let mut seen_phones = HashSet::new();
    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        let lower = href.to_ascii_lowercase();
        if lower.starts_with("mailto:") {
            let address = href[7..].split('?').next().unwrap_or("").to_string();
            if !address.is_empty() && seen_emails.insert(address.to_ascii_lowercase()) {
                contacts.emails.push(address);
            }
        } else if lower.starts_with("tel:") {
            let number = href[4..].to_string();
            if !number.is_empty() && seen_phones.insert(number.clone()) {
                contacts.phones.push(number);
            }
        }
    }
    contacts
}

fn links_in_region(region: ElementRef<'_>, page_url: &Url) -> Vec<Link> {
    let anchor_sel = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for anchor in region.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if is_non_navigational(href) {
            continue;
        }
        let text = collapse_whitespace(&anchor.text().collect::<String>());
        if text.is_empty() {
            continue;
        }
        let Ok(absolute) = page_url.join(href) else {
            continue;
        };
        links.push(Link {
            text,
            url: absolute.to_string(),
            content_headings: Vec::new(),
        });
    }
    links
}

fn is_non_navigational(href: &str) -> bool {
    href.starts_with("tel:")
        || href.starts_with("mailto:")
        || href.starts_with("javascript:")
        || href.starts_with('#')
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if EXCLUDED_TAGS.contains(&child_el.value().name()) {
                continue;
            }
            collect_text(child_el, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push('\n');
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/base/").unwrap()
    }

    #[test]
    fn test_harvest_collects_from_all_regions() {
        let html = r#"
            <header><a href="/home">Home</a></header>
            <nav><a href="/shop">Shop</a></nav>
            <footer><a href="/contact">Contact</a></footer>
        "#;
        let harvest = harvest_links(html, &page_url());
        // Merge order is header, then footer, then nav.
        let urls: Vec<&str> = harvest.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/home",
                "https://example.com/contact",
                "https://example.com/shop"
            ]
        );
        assert_eq!(harvest.sections.header_links, 1);
        assert_eq!(harvest.sections.footer_links, 1);
        assert_eq!(harvest.sections.nav_links, 1);
    }

    #[test]
    fn test_nav_inside_header_not_counted_twice() {
        let html = r#"
            <header><nav><a href="/one">One</a></nav></header>
            <nav><a href="/two">Two</a></nav>
        "#;
        let harvest = harvest_links(html, &page_url());
        assert_eq!(harvest.sections.header_links, 1);
        assert_eq!(harvest.sections.nav_links, 1);
        assert_eq!(harvest.links.len(), 2);
    }

    #[test]
    fn test_banner_role_is_header_fallback() {
        let html = r#"<div role="banner"><a href="/a">A</a></div>"#;
        let harvest = harvest_links(html, &page_url());
        assert_eq!(harvest.sections.header_links, 1);
    }

    #[test]
    fn test_non_navigational_schemes_skipped() {
        let html = r##"
            <nav>
                <a href="mailto:a@b.com">Mail</a>
                <a href="tel:+123">Call</a>
                <a href="javascript:void(0)">JS</a>
                <a href="#top">Top</a>
                <a href="/real">Real</a>
            </nav>
        "##;
        let harvest = harvest_links(html, &page_url());
        assert_eq!(harvest.links.len(), 1);
        assert_eq!(harvest.links[0].url, "https://example.com/real");
    }

    #[test]
    fn test_anchor_without_text_skipped() {
        let html = r#"<nav><a href="/icon-only"><img src="i.png"></a></nav>"#;
        let harvest = harvest_links(html, &page_url());
        assert!(harvest.links.is_empty());
    }

    #[test]
    fn test_relative_urls_resolved_against_page() {
        let html = r#"<nav><a href="deep/page">Deep</a></nav>"#;
        let harvest = harvest_links(html, &page_url());
        assert_eq!(harvest.links[0].url, "https://example.com/base/deep/page");
    }

    #[test]
    fn test_main_content_prefers_main_over_body() {
        let html = r#"
            <html><head><title>  My   Page </title></head>
            <body>
                <header>Site chrome</header>
                <main><p>Hello</p><script>ignored()</script><p>World</p></main>
            </body></html>
        "#;
        let content = extract_main_content(html);
        assert_eq!(content.title, "My Page");
        assert_eq!(content.text, "Hello\nWorld");
    }

    #[test]
    fn test_main_content_body_fallback_excludes_chrome() {
        let html = r#"
            <body>
                <header>Chrome</header>
                <p>Body text</p>
                <footer>More chrome</footer>
            </body>
        "#;
        let content = extract_main_content(html);
        assert_eq!(content.text, "Body text");
    }

    #[test]
    fn test_headings_merged_and_deduped() {
        let html = r#"
            <h2>Alpha</h2>
            <h3>Beta</h3>
            <h2>Alpha</h2>
            <h3> </h3>
        "#;
        assert_eq!(extract_headings(html), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_contacts_extracted_from_anchors() {
        let html = r#"
            <a href="mailto:info@example.com?subject=hi">Mail</a>
            <a href="tel:+1-555-0100">Call</a>
            <a href="mailto:info@example.com">Mail again</a>
        "#;
        let contacts = extract_contacts(html);
        assert_eq!(contacts.emails, vec!["info@example.com"]);
        assert_eq!(contacts.phones, vec!["+1-555-0100"]);
    }

    #[test]
    fn test_all_anchor_fallback_dedupes() {
        let html = r#"
            <div><a href="/a">A</a><a href="/a">A again</a><a href="/b"></a></div>
        "#;
        let links = harvest_all_anchors(html, &page_url());
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].text, "No text");
    }
}
