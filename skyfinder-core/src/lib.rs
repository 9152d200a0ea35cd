pub mod intake;
pub mod offer;
pub mod presentation;
pub mod view;
pub mod format;
pub mod fallback;
pub mod search;
pub mod repository;

pub use intake::{TripField, TripForm, TripQuery, FieldErrors};
pub use offer::{Connection, FlightOffer, OfferId};
pub use presentation::{FilterMode, SortKey};
pub use view::{ResultsPage, ResultsView};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
