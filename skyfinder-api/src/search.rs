use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use skyfinder_core::fallback::example_flights;
use skyfinder_core::repository::SearchSession;
use skyfinder_core::search::{resolve_offers, SearchRequest};
use skyfinder_core::view::render_results;
use skyfinder_core::{CoreError, FilterMode, ResultsPage, SortKey, TripForm};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// `?filter=&sort=` on every results endpoint. Missing means the default.
#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    pub filter: Option<String>,
    pub sort: Option<String>,
}

impl ViewParams {
    fn parse(&self) -> Result<(FilterMode, SortKey), AppError> {
        let filter = match self.filter.as_deref() {
            Some(raw) => raw.parse::<FilterMode>().map_err(bad_request)?,
            None => FilterMode::default(),
        };
        let sort = match self.sort.as_deref() {
            Some(raw) => raw.parse::<SortKey>().map_err(bad_request)?,
            None => SortKey::default(),
        };
        Ok((filter, sort))
    }
}

fn bad_request(err: CoreError) -> AppError {
    AppError::BadRequestError(err.to_string())
}

#[derive(Debug, Serialize)]
pub struct SearchResultsResponse {
    pub search_id: Uuid,
    pub fallback: bool,
    pub summary: String,
    pub results: ResultsPage,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/search", post(search_flights))
        .route("/v1/searches/{id}", get(get_search))
        .route("/v1/examples", get(get_examples))
}

/// POST /v1/search
/// Validate the trip form, forward it to the search service once and
/// render the first results page
pub async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
    Json(form): Json<TripForm>,
) -> Result<Json<SearchResultsResponse>, AppError> {
    let (filter, sort) = params.parse()?;
    let query = form.validate().map_err(AppError::ValidationError)?;

    let request = SearchRequest::from_query(&query, state.settings.user_age);
    info!("Forwarding search: {}", request.user_query);

    let response = state.search.search(&request).await.map_err(AppError::UpstreamError)?;

    let resolved = resolve_offers(response.into_results(), &query, state.settings.fallback_to_examples);
    let session = SearchSession::new(query, resolved);

    let results = render_results(Some(&session.query), &session.offers, filter, sort);
    let summary = session.query.summary();
    let fallback = session.fallback;
    info!("Search returned {} offers (fallback: {})", session.offers.len(), fallback);

    let search_id = state
        .sessions
        .save_session(session)
        .await
        .context("Failed to save search session")?;

    Ok(Json(SearchResultsResponse { search_id, fallback, summary, results }))
}

/// GET /v1/searches/{id}
/// Re-render a stored search with another filter or sort
pub async fn get_search(
    State(state): State<AppState>,
    Path(search_id): Path<Uuid>,
    Query(params): Query<ViewParams>,
) -> Result<Json<SearchResultsResponse>, AppError> {
    let (filter, sort) = params.parse()?;

    let session = state
        .sessions
        .get_session(search_id)
        .await
        .context("Failed to load search session")?
        .ok_or_else(|| AppError::NotFoundError(format!("Search {} not found", search_id)))?;

    Ok(Json(SearchResultsResponse {
        search_id,
        fallback: session.fallback,
        summary: session.query.summary(),
        results: render_results(Some(&session.query), &session.offers, filter, sort),
    }))
}

/// GET /v1/examples
/// The example flights, without a search
pub async fn get_examples(Query(params): Query<ViewParams>) -> Result<Json<ResultsPage>, AppError> {
    let (filter, sort) = params.parse()?;
    let offers = example_flights(None);
    Ok(Json(render_results(None, &offers, filter, sort)))
}
