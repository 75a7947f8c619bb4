//! Service layer for the portal client.
//!
//! - HTTP session and page classification (`Session`)
//! - Hierarchy crawling (`HierarchyCrawler`)
//! - The portal client tying both to the catalog (`EbCommand`)

mod commander;
mod crawler;
mod session;

pub use commander::EbCommand;
pub use crawler::{HierarchyCrawler, LinkRule, extract_links};
pub use session::{PATH_ATTACHMENT, PATH_DEPLOY, PATH_LOGIN, Page, Session};
