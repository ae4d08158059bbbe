//! menuacquire - restaurant menu acquisition pipeline.
//!
//! Turns a restaurant's online menu (HTML page, JavaScript app, PDF, or
//! photographed image) into a normalized structured menu plus a short prose
//! summary, cached in SQLite so repeat questions about the same place never
//! re-scrape within the freshness window.
//!
//! The pipeline runs a fixed sequence per place: cache lookup, menu URL
//! discovery, content classification, then an ordered chain of extraction
//! tiers where each tier only runs if every cheaper tier came up empty.

pub mod classify;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod extract;
pub mod llm;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod services;
