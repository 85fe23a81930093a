// handlers/mod.rs - two handler tiers
//
// Public handlers are reachable without a token because their paths are on
// the auth gate's allow-list. Protected handlers take a `Principal` extractor
// and rely on the gate having attached one.
pub mod protected;
pub mod public;

use serde::Serialize;

/// Body returned by create and update endpoints
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Identified {
    pub id: i64,
}

impl From<i64> for Identified {
    fn from(id: i64) -> Self {
        Self { id }
    }
}
