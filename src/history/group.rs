use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashMap;

use super::models::{HistoryRecord, HistorySection};

pub const TODAY_LABEL: &str = "Hoy";
pub const YESTERDAY_LABEL: &str = "Ayer";

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

fn weekday_es(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

/// "lunes, 3 de noviembre de 2025"
pub fn long_date_es(date: NaiveDate) -> String {
    format!(
        "{}, {} de {} de {}",
        weekday_es(date.weekday()),
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year()
    )
}

pub fn section_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        TODAY_LABEL.to_string()
    } else if date == today - Duration::days(1) {
        YESTERDAY_LABEL.to_string()
    } else {
        long_date_es(date)
    }
}

/// Splits records into date sections.
///
/// Sections come out in the order their key is first seen and records keep
/// their input order, so a later page holding an older date than an existing
/// section simply appends a new section at the end.
pub fn group(records: &[HistoryRecord], today: NaiveDate) -> Vec<HistorySection> {
    let mut sections: Vec<HistorySection> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let title = section_label(record.entry_date(), today);
        let slot = *index.entry(title.clone()).or_insert_with(|| {
            sections.push(HistorySection {
                title,
                records: Vec::new(),
            });
            sections.len() - 1
        });
        sections[slot].records.push(record.clone());
    }

    sections
}
