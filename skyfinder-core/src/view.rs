use serde::Serialize;

use crate::fallback::{
    DEFAULT_DEPARTURE_DATE, DEFAULT_DESTINATION, DEFAULT_DESTINATION_CODE, DEFAULT_ORIGIN,
    DEFAULT_ORIGIN_CODE,
};
use crate::format;
use crate::intake::TripQuery;
use crate::offer::{FlightOffer, OfferId};
use crate::presentation::{arrange, FilterMode, SortKey};

pub const NO_RESULTS_TITLE: &str = "Рейсы не найдены";
pub const NO_RESULTS_MESSAGE: &str = "К сожалению, по вашему запросу не найдено доступных рейсов.";
const PRICE_NOTE: &str = "за 1 пассажира";

/// Rendered results: header, active controls and either cards or the
/// no-results state.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsPage {
    pub header: SearchHeader,
    pub filter: FilterMode,
    pub sort: SortKey,
    #[serde(flatten)]
    pub view: ResultsView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHeader {
    pub route: String,
    pub date_label: String,
    pub passengers_label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResultsView {
    Offers { cards: Vec<OfferCard> },
    NoResults { title: String, message: String },
}

impl ResultsView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResultsView::NoResults { .. })
    }

    pub fn cards(&self) -> &[OfferCard] {
        match self {
            ResultsView::Offers { cards } => cards,
            ResultsView::NoResults { .. } => &[],
        }
    }
}

/// One offer, with every label preformatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferCard {
    pub id: OfferId,
    pub flight_number: String,
    pub stops_label: String,
    pub departure_time: String,
    pub origin_code: String,
    pub arrival_time: String,
    pub destination_code: String,
    pub duration: String,
    pub connections: Vec<String>,
    pub promo_text: Option<String>,
    pub price_label: String,
    pub original_price_label: Option<String>,
    pub price_note: &'static str,
    pub has_luggage: bool,
}

impl OfferCard {
    pub fn from_offer(offer: &FlightOffer) -> Self {
        let connections = if offer.direct {
            Vec::new()
        } else {
            offer
                .connections()
                .iter()
                .map(|c| format!("Пересадка в {} ({}), {}", c.airport, c.code, c.wait_time))
                .collect()
        };

        Self {
            id: offer.id.clone(),
            flight_number: offer.flight_number.clone(),
            stops_label: format::stops_label(offer.stop_count()),
            departure_time: offer.departure_time.clone(),
            origin_code: offer.origin_code.clone(),
            arrival_time: offer.arrival_time.clone(),
            destination_code: offer.destination_code.clone(),
            duration: offer.duration.clone(),
            connections,
            promo_text: if offer.has_promo { offer.promo_text.clone() } else { None },
            price_label: format::price_label(offer.price),
            original_price_label: offer.original_price.map(format::price_label),
            price_note: PRICE_NOTE,
            has_luggage: offer.has_luggage,
        }
    }
}

impl SearchHeader {
    /// Route codes come from the first offer of the unfiltered list.
    pub fn new(query: Option<&TripQuery>, offers: &[FlightOffer]) -> Self {
        let origin = query.map(TripQuery::origin).unwrap_or(DEFAULT_ORIGIN);
        let destination = query.map(TripQuery::destination).unwrap_or(DEFAULT_DESTINATION);
        let first = offers.first();
        let origin_code = first
            .map(|o| o.origin_code.as_str())
            .filter(|code| !code.is_empty())
            .unwrap_or(DEFAULT_ORIGIN_CODE);
        let destination_code = first
            .map(|o| o.destination_code.as_str())
            .filter(|code| !code.is_empty())
            .unwrap_or(DEFAULT_DESTINATION_CODE);

        let date_label = match query {
            Some(q) => format::short_date(q.departure_date()),
            None => format::short_date_str(DEFAULT_DEPARTURE_DATE),
        };
        let passengers = query.map(TripQuery::passengers).unwrap_or(1);

        Self {
            route: format!("{} ({}) → {} ({})", origin, origin_code, destination, destination_code),
            date_label,
            passengers_label: format::passengers_label(passengers),
        }
    }
}

/// Filters, sorts and renders `offers`.
pub fn render_results(
    query: Option<&TripQuery>,
    offers: &[FlightOffer],
    filter: FilterMode,
    sort: SortKey,
) -> ResultsPage {
    let arranged = arrange(offers, filter, sort);
    let view = if arranged.is_empty() {
        ResultsView::NoResults {
            title: NO_RESULTS_TITLE.to_string(),
            message: NO_RESULTS_MESSAGE.to_string(),
        }
    } else {
        ResultsView::Offers {
            cards: arranged.into_iter().map(OfferCard::from_offer).collect(),
        }
    };

    ResultsPage {
        header: SearchHeader::new(query, offers),
        filter,
        sort,
        view,
    }
}
