//! # webharvest-mcp
//!
//! MCP (Model Context Protocol) server for web scraping and site-link
//! harvesting.
//!
//! This crate provides an MCP server that exposes web-scraping tools to AI
//! assistants: main-content extraction from plain or JavaScript-rendered
//! pages, and navigation-link harvesting with repeated-permalink pruning.
//!
//! ## Features
//!
//! - **MCP-compliant**: Implements JSON-RPC 2.0 over stdio (standard MCP
//!   transport)
//! - **Region-aware link harvest**: collects links from header, footer, and
//!   independent nav regions with boilerplate-pattern dedup
//! - **Bounded enrichment**: same-domain links are annotated with their page
//!   headings under fixed concurrency and visit caps
//! - **Graceful degradation**: per-URL failures become empty results, tool
//!   failures become structured error payloads
//!
//! ## Available Tools
//!
//! - `fetch_page_content`: Extract main-content text from an HTML page
//! - `fetch_page_content_rendered`: Same via a WebDriver browser, for SPA
//!   pages; also reports contact (mailto:/tel:) links
//! - `extract_site_links`: Build a virtual sitemap from header/footer/nav
//!   links, pruned and heading-enriched
//! - `extract_site_links_rendered`: Same over WebDriver-rendered HTML
//!
//! ## Usage with an MCP client
//!
//! ```json
//! {
//!   "servers": {
//!     "webharvest": {
//!       "command": "webharvest-mcp",
//!       "args": ["--stdio"],
//!       "env": {}
//!     }
//!   }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod enrich;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pattern;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, McpMessage};
pub use server::McpServer;
pub use tools::{Tool, ToolRegistry};
