//! State module for tracking pipeline progress
//!
//! A single crawl moves through [`CrawlStage`] values in a fixed order. The
//! first failure stops the run and is reported together with the stage it
//! happened in.

mod stage;

pub use stage::CrawlStage;
