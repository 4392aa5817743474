use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const WEEK_WINDOW_DAYS: i64 = 7;
pub const MONTH_WINDOW_DAYS: i64 = 30;

/// Time window applied to a history listing. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "lowercase")]
pub enum HistoryFilter {
    #[default]
    All,
    Today,
    Week,
    Month,
    Custom(NaiveDate),
}

impl HistoryFilter {
    /// Inclusive date range covered by the filter, `None` for `All`.
    pub fn window(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            HistoryFilter::All => None,
            HistoryFilter::Today => Some((today, today)),
            HistoryFilter::Week => Some((today - Duration::days(WEEK_WINDOW_DAYS), today)),
            HistoryFilter::Month => Some((today - Duration::days(MONTH_WINDOW_DAYS), today)),
            HistoryFilter::Custom(date) => Some((*date, *date)),
        }
    }

    pub fn matches(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.window(today) {
            None => true,
            Some((from, to)) => date >= from && date <= to,
        }
    }

    /// Query parameters understood by the history endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            HistoryFilter::All => Vec::new(),
            HistoryFilter::Today => vec![("filter", "today".to_string())],
            HistoryFilter::Week => vec![("filter", "week".to_string())],
            HistoryFilter::Month => vec![("filter", "month".to_string())],
            HistoryFilter::Custom(date) => vec![("date", date.format("%Y-%m-%d").to_string())],
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryFilter::All => write!(f, "all"),
            HistoryFilter::Today => write!(f, "today"),
            HistoryFilter::Week => write!(f, "week"),
            HistoryFilter::Month => write!(f, "month"),
            HistoryFilter::Custom(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl std::str::FromStr for HistoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "todos" => Ok(HistoryFilter::All),
            "today" | "hoy" => Ok(HistoryFilter::Today),
            "week" | "semana" => Ok(HistoryFilter::Week),
            "month" | "mes" => Ok(HistoryFilter::Month),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(HistoryFilter::Custom)
                .map_err(|_| format!("Invalid history filter: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_week_window() {
        let today = d("2025-11-10");
        let kept: Vec<u32> = (1..=10)
            .map(|day| NaiveDate::from_ymd_opt(2025, 11, day).unwrap())
            .filter(|date| HistoryFilter::Week.matches(*date, today))
            .map(|date| chrono::Datelike::day(&date))
            .collect();
        assert_eq!(kept, vec![3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_today_month_custom() {
        let today = d("2025-11-10");
        assert!(HistoryFilter::Today.matches(today, today));
        assert!(!HistoryFilter::Today.matches(d("2025-11-09"), today));
        assert!(HistoryFilter::Month.matches(d("2025-10-11"), today));
        assert!(!HistoryFilter::Month.matches(d("2025-10-10"), today));
        assert!(!HistoryFilter::Month.matches(d("2025-11-11"), today));
        assert!(HistoryFilter::Custom(d("2025-11-08")).matches(d("2025-11-08"), today));
        assert!(!HistoryFilter::Custom(d("2025-11-08")).matches(d("2025-11-09"), today));
        assert!(HistoryFilter::All.matches(d("1999-01-01"), today));
    }

    #[test]
    fn test_query_params_and_parse() {
        assert!(HistoryFilter::All.query_params().is_empty());
        assert_eq!(
            HistoryFilter::Week.query_params(),
            vec![("filter", "week".to_string())]
        );
        assert_eq!(
            HistoryFilter::Custom(d("2025-11-08")).query_params(),
            vec![("date", "2025-11-08".to_string())]
        );
        assert_eq!("semana".parse::<HistoryFilter>(), Ok(HistoryFilter::Week));
        assert_eq!(
            "2025-11-08".parse::<HistoryFilter>(),
            Ok(HistoryFilter::Custom(d("2025-11-08")))
        );
        assert!("ayer".parse::<HistoryFilter>().is_err());
    }
}
