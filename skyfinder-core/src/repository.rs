use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intake::TripQuery;
use crate::offer::FlightOffer;
use crate::search::ResolvedOffers;
use crate::CoreResult;

/// A completed search whose offers can be re-filtered and re-sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSession {
    pub id: Uuid,
    pub query: TripQuery,
    pub offers: Vec<FlightOffer>,
    pub fallback: bool,
    pub created_at: DateTime<Utc>,
}

impl SearchSession {
    pub fn new(query: TripQuery, resolved: ResolvedOffers) -> Self {
        Self {
            id: Uuid::new_v4(),
            query,
            offers: resolved.offers,
            fallback: resolved.fallback,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for search session storage
#[async_trait]
pub trait SearchSessionRepository: Send + Sync {
    async fn save_session(&self, session: SearchSession) -> CoreResult<Uuid>;

    async fn get_session(&self, id: Uuid) -> CoreResult<Option<SearchSession>>;

    async fn session_count(&self) -> CoreResult<usize>;
}
