//! State module for tracking crawl progress
//!
//! - `CrawlPhase`: the orchestrator's `Idle → Running → Draining → Done` machine

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
