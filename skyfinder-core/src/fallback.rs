use crate::intake::TripQuery;
use crate::offer::{Connection, FlightOffer, OfferId};

pub const DEFAULT_ORIGIN: &str = "Новосибирск";
pub const DEFAULT_ORIGIN_CODE: &str = "OVB";
pub const DEFAULT_DESTINATION: &str = "Санкт-Петербург";
pub const DEFAULT_DESTINATION_CODE: &str = "LED";
pub const DEFAULT_DEPARTURE_DATE: &str = "2025-04-07";

const LATE_DEPARTURE_DATE: &str = "2025-04-08";

struct Route {
    origin: String,
    destination: String,
    departure_date: Option<String>,
}

impl Route {
    fn from_query(query: Option<&TripQuery>) -> Self {
        match query {
            Some(q) => Self {
                origin: q.origin().to_string(),
                destination: q.destination().to_string(),
                departure_date: Some(q.departure_date().to_string()),
            },
            None => Self {
                origin: DEFAULT_ORIGIN.to_string(),
                destination: DEFAULT_DESTINATION.to_string(),
                departure_date: None,
            },
        }
    }

    fn offer(&self, id: u64, flight_number: &str, default_date: &str) -> FlightOffer {
        FlightOffer {
            id: OfferId::Number(id),
            flight_number: flight_number.to_string(),
            origin: self.origin.clone(),
            origin_code: DEFAULT_ORIGIN_CODE.to_string(),
            destination: self.destination.clone(),
            destination_code: DEFAULT_DESTINATION_CODE.to_string(),
            departure_date: Some(
                self.departure_date.clone().unwrap_or_else(|| default_date.to_string()),
            ),
            departure_time: String::new(),
            arrival_time: String::new(),
            duration: String::new(),
            direct: true,
            connections: None,
            price: 0,
            original_price: None,
            has_promo: false,
            promo_text: None,
            has_luggage: false,
        }
    }
}

fn stop(airport: &str, code: &str, wait_time: &str) -> Connection {
    Connection {
        airport: airport.to_string(),
        code: code.to_string(),
        wait_time: wait_time.to_string(),
    }
}

/// The fixed example flights shown when the search service returns no
/// result list. Route names and date follow the query when there is one.
pub fn example_flights(query: Option<&TripQuery>) -> Vec<FlightOffer> {
    let route = Route::from_query(query);

    vec![
        FlightOffer {
            departure_time: "12:10".to_string(),
            arrival_time: "12:50".to_string(),
            duration: "4ч 40м".to_string(),
            price: 11499,
            original_price: Some(12930),
            has_luggage: true,
            ..route.offer(1, "S7 2051", DEFAULT_DEPARTURE_DATE)
        },
        FlightOffer {
            departure_time: "15:05".to_string(),
            arrival_time: "15:40".to_string(),
            duration: "4ч 35м".to_string(),
            price: 11499,
            ..route.offer(2, "S7 2053", DEFAULT_DEPARTURE_DATE)
        },
        FlightOffer {
            departure_time: "08:15".to_string(),
            arrival_time: "11:05".to_string(),
            duration: "6ч 50м".to_string(),
            direct: false,
            connections: Some(vec![stop("Москва", "DME", "1ч 20м")]),
            price: 11322,
            original_price: Some(12930),
            has_luggage: true,
            ..route.offer(3, "S7 2066", DEFAULT_DEPARTURE_DATE)
        },
        FlightOffer {
            departure_time: "14:30".to_string(),
            arrival_time: "18:45".to_string(),
            duration: "8ч 15м".to_string(),
            direct: false,
            connections: Some(vec![stop("Екатеринбург", "SVX", "2ч 05м")]),
            price: 16484,
            original_price: Some(19302),
            has_promo: true,
            promo_text: Some("Для молодежи и пенсионеров".to_string()),
            has_luggage: true,
            ..route.offer(4, "S7 2028", LATE_DEPARTURE_DATE)
        },
    ]
}
