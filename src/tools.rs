//! Tool definitions and registry for the scraping MCP server.
//!
//! Each tool is a self-contained fetch-parse-format sequence. Failures are
//! caught at the tool boundary and converted into structured payloads (JSON
//! with an `error` key, or a text summary) so nothing propagates to the
//! transport as a protocol error.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::enrich;
use crate::error::{Error, Result};
use crate::extract::{self, Contacts, PageContent};
use crate::fetch::{PageFetcher, RenderedFetcher};
use crate::pattern;
use crate::protocol::{ContentItem, ToolCallResult, ToolDefinition};

/// Tool trait for implementing MCP tools.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult>;
}

/// Context passed to tools during execution.
pub struct ToolContext {
    /// Shared HTTP fetcher (connection-pooled).
    pub http: PageFetcher,
    /// Rendered-page fetcher, session-limited server-wide.
    pub browser: RenderedFetcher,
}

impl ToolContext {
    /// Create a new tool context targeting the given WebDriver endpoint.
    pub fn new(webdriver_url: &str) -> Self {
        Self {
            http: PageFetcher::new(),
            browser: RenderedFetcher::new(webdriver_url),
        }
    }
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    context: Arc<ToolContext>,
}

impl ToolRegistry {
    /// Create a registry with the built-in scraping tools.
    pub fn new(webdriver_url: &str) -> Self {
        Self::with_context(ToolContext::new(webdriver_url))
    }

    fn with_context(context: ToolContext) -> Self {
        let context = Arc::new(context);
        let mut tools: HashMap<String, Arc<dyn Tool>> = HashMap::new();

        let fetch_tool = Arc::new(FetchPageTool);
        tools.insert(fetch_tool.definition().name.clone(), fetch_tool);

        let fetch_rendered_tool = Arc::new(FetchPageRenderedTool);
        tools.insert(
            fetch_rendered_tool.definition().name.clone(),
            fetch_rendered_tool,
        );

        let links_tool = Arc::new(ExtractSiteLinksTool);
        tools.insert(links_tool.definition().name.clone(), links_tool);

        let links_rendered_tool = Arc::new(ExtractSiteLinksRenderedTool);
        tools.insert(
            links_rendered_tool.definition().name.clone(),
            links_rendered_tool,
        );

        Self { tools, context }
    }

    /// Get tool definitions.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, arguments: serde_json::Value) -> Result<ToolCallResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        tool.execute(arguments, &self.context).await
    }

    /// Register a custom tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name.clone();
        self.tools.insert(name, tool);
    }
}

#[derive(Debug, Deserialize)]
struct UrlArgs {
    /// Target page URL.
    url: String,
}

fn url_input_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": description
            }
        },
        "required": ["url"]
    })
}

fn parse_url_args(arguments: serde_json::Value) -> Result<UrlArgs> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))
}

fn is_pdf_url(url: &str) -> bool {
    url.to_ascii_lowercase().ends_with(".pdf")
}

// ============================================================================
// Page content tools
// ============================================================================

/// Tool for fetching a page and extracting its main content text.
pub struct FetchPageTool;

#[async_trait::async_trait]
impl Tool for FetchPageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "fetch_page_content".into(),
            description: "Fetch a URL over HTTP and extract the main content text. \
                Best for regular server-rendered HTML pages."
                .into(),
            input_schema: url_input_schema("URL to fetch (e.g. https://example.com/page)"),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args = parse_url_args(arguments)?;
        tracing::info!("fetch_page_content called with url={}", args.url);

        match context.http.fetch(&args.url).await {
            Ok(html) => {
                let content = extract::extract_main_content(&html);
                tracing::info!("extracted {} chars from {}", content.text.len(), args.url);
                Ok(ToolCallResult {
                    content: vec![ContentItem::text(format_page_content(
                        &args.url, &content, None, false,
                    ))],
                    is_error: false,
                })
            }
            Err(e) => {
                tracing::error!("fetch_page_content failed for {}: {}", args.url, e);
                Ok(error_text_result(&args.url, &e))
            }
        }
    }
}

/// Tool for fetching a JavaScript-rendered page via WebDriver and extracting
/// its main content text plus any contact links.
pub struct FetchPageRenderedTool;

#[async_trait::async_trait]
impl Tool for FetchPageRenderedTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "fetch_page_content_rendered".into(),
            description: "Fetch a URL through the WebDriver browser and extract the main \
                content text. Best for JavaScript/SPA pages; also reports mailto:/tel: \
                contacts found on the page."
                .into(),
            input_schema: url_input_schema("URL to fetch (e.g. https://example.com/spa-page)"),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args = parse_url_args(arguments)?;
        tracing::info!("fetch_page_content_rendered called with url={}", args.url);

        if is_pdf_url(&args.url) {
            tracing::warn!("skipping PDF: {}", args.url);
            return Ok(ToolCallResult {
                content: vec![ContentItem::text(format!(
                    "Error: PDF files are not supported\nURL: {}",
                    args.url
                ))],
                is_error: true,
            });
        }

        match context.browser.fetch(&args.url).await {
            Ok(html) => {
                let content = extract::extract_main_content(&html);
                let contacts = extract::extract_contacts(&html);
                tracing::info!("extracted {} chars from {}", content.text.len(), args.url);
                Ok(ToolCallResult {
                    content: vec![ContentItem::text(format_page_content(
                        &args.url,
                        &content,
                        Some(&contacts),
                        true,
                    ))],
                    is_error: false,
                })
            }
            Err(e) => {
                tracing::error!("fetch_page_content_rendered failed for {}: {}", args.url, e);
                Ok(error_text_result(&args.url, &e))
            }
        }
    }
}

// ============================================================================
// Site link tools
// ============================================================================

/// Tool that harvests header/footer/nav links from a site, prunes repeated
/// permalink patterns, and enriches same-domain links with page headings.
pub struct ExtractSiteLinksTool;

#[async_trait::async_trait]
impl Tool for ExtractSiteLinksTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "extract_site_links".into(),
            description: "Extract header/footer/nav links from a site and build a virtual \
                sitemap. Repeated permalink patterns (e.g. paginated listings) are pruned \
                and same-domain links are enriched with their page headings."
                .into(),
            input_schema: url_input_schema("Site URL (e.g. https://example.com)"),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args = parse_url_args(arguments)?;
        tracing::info!("extract_site_links called with url={}", args.url);

        let payload = match extract_links_plain(context, &args.url).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("extract_site_links failed for {}: {}", args.url, e);
                error_links_payload(&args.url, &e)
            }
        };
        json_result(payload)
    }
}

/// Tool that harvests header/footer/nav links from a JavaScript-rendered site
/// via WebDriver.
pub struct ExtractSiteLinksRenderedTool;

#[async_trait::async_trait]
impl Tool for ExtractSiteLinksRenderedTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "extract_site_links_rendered".into(),
            description: "Extract header/footer/nav links from a JavaScript-rendered site \
                via the WebDriver browser. Falls back to scanning every anchor when no \
                navigation regions are found."
                .into(),
            input_schema: url_input_schema("Site URL (e.g. https://example.com)"),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolCallResult> {
        let args = parse_url_args(arguments)?;
        tracing::info!("extract_site_links_rendered called with url={}", args.url);

        if is_pdf_url(&args.url) {
            tracing::warn!("skipping PDF: {}", args.url);
            return json_result(json!({
                "error": "PDF files are not supported",
                "base_url": args.url,
                "links": []
            }));
        }

        let payload = match extract_links_rendered(context, &args.url).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("extract_site_links_rendered failed for {}: {}", args.url, e);
                error_links_payload(&args.url, &e)
            }
        };
        json_result(payload)
    }
}

async fn extract_links_plain(context: &ToolContext, url: &str) -> Result<serde_json::Value> {
    let page_url = Url::parse(url)?;
    let html = context.http.fetch(url).await?;

    let harvest = extract::harvest_links(&html, &page_url);
    let total = harvest.links.len();
    let mut filtered = pattern::filter_repeated(harvest.links, url);

    enrich::enrich_with_headings(&context.http, &page_url, &mut filtered).await;

    tracing::info!("extracted {} links from {}", filtered.len(), url);
    Ok(json!({
        "base_url": url,
        "total_links": total,
        "filtered_links": filtered.len(),
        "links": filtered,
        "sections": harvest.sections
    }))
}

async fn extract_links_rendered(context: &ToolContext, url: &str) -> Result<serde_json::Value> {
    let page_url = Url::parse(url)?;
    let html = context.browser.fetch(url).await?;

    let harvest = extract::harvest_links(&html, &page_url);
    let sections = harvest.sections;
    let all_links = if harvest.links.is_empty() {
        tracing::warn!("no region links found for {}, scanning whole document", url);
        extract::harvest_all_anchors(&html, &page_url)
    } else {
        harvest.links
    };

    let total = all_links.len();
    // Heading enrichment is skipped on the rendered path to keep WebDriver
    // session hold times short; every link keeps an empty heading list.
    let filtered = pattern::filter_repeated(all_links, url);

    tracing::info!("extracted {} links from {}", filtered.len(), url);
    Ok(json!({
        "base_url": url,
        "total_links": total,
        "filtered_links": filtered.len(),
        "links": filtered,
        "sections": sections
    }))
}

// ============================================================================
// Result formatting
// ============================================================================

fn format_page_content(
    url: &str,
    content: &PageContent,
    contacts: Option<&Contacts>,
    rendered: bool,
) -> String {
    let mut out = format!(
        "# {}\n\n- **URL**: {}\n- **Content length**: {} chars\n",
        if content.title.is_empty() {
            "(untitled)"
        } else {
            &content.title
        },
        url,
        content.text.len()
    );

    if rendered {
        out.push_str("- **Extraction**: WebDriver (JavaScript rendering)\n");
    }
    if let Some(contacts) = contacts {
        if !contacts.emails.is_empty() {
            out.push_str(&format!("- **Emails**: {}\n", contacts.emails.join(", ")));
        }
        if !contacts.phones.is_empty() {
            out.push_str(&format!("- **Phones**: {}\n", contacts.phones.join(", ")));
        }
    }

    out.push('\n');
    out.push_str(&content.text);

    if content.text.len() < 100 {
        out.push_str(
            "\n\n*Warning: very little content was extracted. The page may require \
             authentication or render its content late.*",
        );
    }

    out
}

fn error_text_result(url: &str, error: &Error) -> ToolCallResult {
    ToolCallResult {
        content: vec![ContentItem::text(format!("Error: {}\nURL: {}", error, url))],
        is_error: true,
    }
}

fn error_links_payload(url: &str, error: &Error) -> serde_json::Value {
    json!({
        "error": error.to_string(),
        "base_url": url,
        "links": []
    })
}

fn json_result(payload: serde_json::Value) -> Result<ToolCallResult> {
    let is_error = payload.get("error").is_some();
    Ok(ToolCallResult {
        content: vec![ContentItem::text(serde_json::to_string(&payload)?)],
        is_error,
    })
}
