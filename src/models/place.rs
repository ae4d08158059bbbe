//! Place lookup collaborator contract.
//!
//! The place/website directory is owned by another subsystem; this pipeline
//! only needs the stored website and explicit menu link for a place.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the upstream directory knows about a place's web presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceDetails {
    /// The place's base website URL, if known.
    pub website: Option<String>,
    /// An explicitly stored menu link. Authoritative when present.
    pub menu_link: Option<String>,
}

impl PlaceDetails {
    pub fn with_website(website: impl Into<String>) -> Self {
        Self {
            website: Some(website.into()),
            menu_link: None,
        }
    }
}

/// Supplies place web details by place id.
///
/// A `None` result means the place is unknown (or the lookup failed); the
/// pipeline treats both the same way, as a discovery failure.
#[async_trait]
pub trait PlaceDirectory: Send + Sync {
    async fn place_details(&self, place_id: &str) -> Option<PlaceDetails>;
}

/// In-memory directory, used by the CLI (details passed on the command line)
/// and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPlaceDirectory {
    places: HashMap<String, PlaceDetails>,
}

impl StaticPlaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, place_id: impl Into<String>, details: PlaceDetails) {
        self.places.insert(place_id.into(), details);
    }
}

#[async_trait]
impl PlaceDirectory for StaticPlaceDirectory {
    async fn place_details(&self, place_id: &str) -> Option<PlaceDetails> {
        self.places.get(place_id).cloned()
    }
}
