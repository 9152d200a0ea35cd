use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Offer identifier as the search service sends it: numeric or text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OfferId {
    Number(u64),
    Text(String),
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferId::Number(n) => write!(f, "{}", n),
            OfferId::Text(s) => f.write_str(s),
        }
    }
}

/// An intermediate stop on a flight with connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub airport: String,
    pub code: String,
    pub wait_time: String,
}

/// One bookable flight option.
///
/// `duration` is expected as `"<hours>ч <minutes>м"`; see
/// [`parse_duration_minutes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: OfferId,
    #[serde(default)]
    pub flight_number: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub origin_code: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub destination_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<String>,
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    pub duration: String,
    pub direct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Connection>>,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: u64,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub original_price: Option<u64>,
    #[serde(default)]
    pub has_promo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_text: Option<String>,
    #[serde(default)]
    pub has_luggage: bool,
}

impl FlightOffer {
    pub fn duration_minutes(&self) -> Option<u32> {
        parse_duration_minutes(&self.duration)
    }

    pub fn connections(&self) -> &[Connection] {
        self.connections.as_deref().unwrap_or(&[])
    }

    /// Number of stops. A non-direct offer without a stop list counts as one.
    pub fn stop_count(&self) -> usize {
        if self.direct {
            0
        } else {
            self.connections().len().max(1)
        }
    }
}

/// Total minutes of a `"<hours>ч <minutes>м"` duration, taken from the
/// first two integers in the text.
pub fn parse_duration_minutes(text: &str) -> Option<u32> {
    let mut numbers = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .map(str::parse::<u32>);

    let hours = numbers.next()?.ok()?;
    let minutes = numbers.next()?.ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Whole rubles from any JSON number. Fractions round to the nearest ruble;
/// negative and non-finite amounts are rejected.
fn price_from_number(number: &serde_json::Number) -> Option<u64> {
    if let Some(whole) = number.as_u64() {
        return Some(whole);
    }
    let amount = number.as_f64()?;
    if amount.is_finite() && amount >= 0.0 && amount <= u64::MAX as f64 {
        Some(amount.round() as u64)
    } else {
        None
    }
}

fn deserialize_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let number = serde_json::Number::deserialize(deserializer)?;
    price_from_number(&number).ok_or_else(|| de::Error::custom(format!("invalid price {}", number)))
}

fn deserialize_optional_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<serde_json::Number>::deserialize(deserializer)? {
        Some(number) => price_from_number(&number)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid price {}", number))),
        None => Ok(None),
    }
}
