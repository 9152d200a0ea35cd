use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::format;

/// Highest passenger count the trip form offers.
pub const MAX_PASSENGERS: u32 = 9;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw trip form submission, before validation.
///
/// Dates arrive as `YYYY-MM-DD` text; blank text counts as missing.
/// `passengers` may be a number or numeric text, as a `<select>` posts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripForm {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub depart_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default = "default_passengers", deserialize_with = "deserialize_passengers")]
    pub passengers: u32,
    #[serde(default)]
    pub baggage: bool,
}

fn default_passengers() -> u32 { 1 }

#[derive(Deserialize)]
#[serde(untagged)]
enum PassengerCount {
    Number(u32),
    Text(String),
}

fn deserialize_passengers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match PassengerCount::deserialize(deserializer)? {
        PassengerCount::Number(count) => Ok(count),
        PassengerCount::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid passenger count {:?}", text))),
    }
}

impl Default for TripForm {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            depart_date: String::new(),
            return_date: None,
            passengers: default_passengers(),
            baggage: false,
        }
    }
}

impl TripForm {
    pub fn validate(&self) -> Result<TripQuery, FieldErrors> {
        validate(self)
    }
}

/// Form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TripField {
    Origin,
    Destination,
    DepartDate,
    ReturnDate,
    Passengers,
}

impl TripField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripField::Origin => "origin",
            TripField::Destination => "destination",
            TripField::DepartDate => "departDate",
            TripField::ReturnDate => "returnDate",
            TripField::Passengers => "passengers",
        }
    }
}

/// Field-level validation errors, keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<TripField, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: TripField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: TripField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: TripField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TripField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// A validated trip query, built by [`validate`]. Fields are read-only
/// once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripQuery {
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
    passengers: u32,
    baggage: bool,
}

impl TripQuery {
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub fn passengers(&self) -> u32 {
        self.passengers
    }

    pub fn baggage(&self) -> bool {
        self.baggage
    }

    /// One-line "your search" summary, e.g. `Новосибирск → Москва, пн, 7 апр.`
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} → {}, {}",
            self.origin,
            self.destination,
            format::short_date(self.departure_date)
        );
        if let Some(back) = self.return_date {
            line.push_str(" - ");
            line.push_str(&format::short_date(back));
        }
        line
    }
}

/// Validates a form submission, collecting every field error.
pub fn validate(form: &TripForm) -> Result<TripQuery, FieldErrors> {
    let mut errors = FieldErrors::default();

    let origin = non_blank(&form.origin);
    if origin.is_none() {
        errors.insert(TripField::Origin, "Укажите город отправления");
    }

    let destination = non_blank(&form.destination);
    if destination.is_none() {
        errors.insert(TripField::Destination, "Укажите город прибытия");
    }

    let departure_date = match non_blank(&form.depart_date) {
        None => {
            errors.insert(TripField::DepartDate, "Выберите дату вылета");
            None
        }
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                errors.insert(TripField::DepartDate, "Некорректная дата вылета");
            }
            parsed
        }
    };

    let return_date = match form.return_date.as_deref().and_then(non_blank) {
        None => None,
        Some(raw) => match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                errors.insert(TripField::ReturnDate, "Некорректная дата возвращения");
                None
            }
        },
    };

    if let (Some(out), Some(back)) = (departure_date, return_date) {
        if back < out {
            errors.insert(TripField::ReturnDate, "Дата возвращения раньше даты вылета");
        }
    }

    if form.passengers == 0 || form.passengers > MAX_PASSENGERS {
        errors.insert(
            TripField::Passengers,
            format!("Количество пассажиров от 1 до {}", MAX_PASSENGERS),
        );
    }

    match (origin, destination, departure_date) {
        (Some(origin), Some(destination), Some(departure_date)) if errors.is_empty() => Ok(TripQuery {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date,
            return_date,
            passengers: form.passengers,
            baggage: form.baggage,
        }),
        _ => Err(errors),
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}
