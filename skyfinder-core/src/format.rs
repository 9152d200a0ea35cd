//! ru-RU display helpers for the results view.

use chrono::{Datelike, NaiveDate, Weekday};

/// Grouping separator used by ru-RU number formatting.
const GROUP_SEPARATOR: char = '\u{a0}';

const MONTHS_SHORT: [&str; 12] = [
    "янв.", "февр.", "мар.", "апр.", "мая", "июн.",
    "июл.", "авг.", "сент.", "окт.", "нояб.", "дек.",
];

/// Digits grouped by three. ru-RU leaves four-digit numbers ungrouped.
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 4 {
        return digits;
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 2);
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

pub fn price_label(price: u64) -> String {
    format!("{} ₽", group_digits(price))
}

/// Short weekday, day and month, e.g. `пн, 7 апр.`
pub fn short_date(date: NaiveDate) -> String {
    let month = MONTHS_SHORT[date.month0() as usize];
    format!("{}, {} {}", weekday_short(date.weekday()), date.day(), month)
}

/// Same as [`short_date`] for `YYYY-MM-DD` text; other text is returned as is.
pub fn short_date_str(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => short_date(date),
        Err(_) => raw.to_string(),
    }
}

fn weekday_short(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "пн",
        Weekday::Tue => "вт",
        Weekday::Wed => "ср",
        Weekday::Thu => "чт",
        Weekday::Fri => "пт",
        Weekday::Sat => "сб",
        Weekday::Sun => "вс",
    }
}

/// `1 пассажир`, `3 пассажира`, `6 пассажиров`.
pub fn passengers_label(count: u32) -> String {
    let suffix = match count {
        0 | 1 => "",
        2..=4 => "а",
        _ => "ов",
    };
    format!("{} пассажир{}", count, suffix)
}

/// `Прямой` for zero stops, otherwise `1 пересадка` / `2 пересадки`.
pub fn stops_label(stops: usize) -> String {
    match stops {
        0 => "Прямой".to_string(),
        1 => "1 пересадка".to_string(),
        n => format!("{} пересадки", n),
    }
}
