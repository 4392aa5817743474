use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use super::filter::HistoryFilter;
use super::group::group;
use super::models::{HistoryRecord, HistorySection};

/// Everything needed to run one page request, stamped with the feed generation
/// that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub plate: String,
    pub page: u32,
    pub filter: HistoryFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The page was appended; carries how many new records it contributed.
    Appended(usize),
    /// The page was empty, so the current filter has no more pages.
    Exhausted,
    /// The ticket belongs to an older generation and was ignored.
    Stale,
}

/// One normalized page together with what the backend reported about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageBatch {
    pub records: Vec<HistoryRecord>,
    /// Records the backend sent, counted before normalization dropped any.
    pub received: usize,
    pub total: Option<u64>,
    pub pages: Option<u32>,
}

impl PageBatch {
    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        Self {
            received: records.len(),
            records,
            ..Self::default()
        }
    }
}

/// What the history screen should show right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HistoryView {
    Loading,
    Empty,
    Sections {
        sections: Vec<HistorySection>,
        loading_more: bool,
        can_load_more: bool,
        /// Matching records on the backend, when it reports a count.
        total: Option<u64>,
    },
}

/// Accumulated, paginated history for one plate under one filter.
///
/// Changing the filter discards everything and starts a new generation;
/// page results carrying an older generation are dropped on arrival.
#[derive(Debug, Clone)]
pub struct HistoryFeed {
    plate: String,
    filter: HistoryFilter,
    next_page: u32,
    records: Vec<HistoryRecord>,
    seen: HashSet<String>,
    exhausted: bool,
    in_flight: bool,
    generation: u64,
    total: Option<u64>,
    pages: Option<u32>,
}

impl HistoryFeed {
    pub fn new(plate: impl Into<String>) -> Self {
        Self {
            plate: plate.into().trim().to_string(),
            filter: HistoryFilter::All,
            next_page: 1,
            records: Vec::new(),
            seen: HashSet::new(),
            exhausted: false,
            in_flight: false,
            generation: 0,
            total: None,
            pages: None,
        }
    }

    pub fn plate(&self) -> &str {
        &self.plate
    }

    pub fn filter(&self) -> HistoryFilter {
        self.filter
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        match self.filter {
            HistoryFilter::Custom(date) => Some(date),
            _ => None,
        }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Backend-reported record and page counts for the current filter.
    pub fn totals(&self) -> (Option<u64>, Option<u32>) {
        (self.total, self.pages)
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    /// Switches filter, clears accumulated state and returns the page-1 ticket.
    pub fn set_filter(&mut self, filter: HistoryFilter) -> FetchTicket {
        self.filter = filter;
        self.reload()
    }

    /// Picking a calendar date replaces any named filter.
    pub fn select_date(&mut self, date: NaiveDate) -> FetchTicket {
        self.set_filter(HistoryFilter::Custom(date))
    }

    /// Restarts the current filter from page 1.
    pub fn reload(&mut self) -> FetchTicket {
        self.generation += 1;
        self.next_page = 1;
        self.records.clear();
        self.seen.clear();
        self.exhausted = false;
        self.in_flight = false;
        self.total = None;
        self.pages = None;
        log::debug!(
            "History feed for {} reset to filter {} (generation {})",
            self.plate,
            self.filter,
            self.generation
        );
        self.issue()
    }

    /// Ticket for the next page, or `None` while a request is outstanding or
    /// once the filter is exhausted.
    pub fn load_more(&mut self) -> Option<FetchTicket> {
        if self.in_flight || self.exhausted {
            return None;
        }
        Some(self.issue())
    }

    fn issue(&mut self) -> FetchTicket {
        self.in_flight = true;
        FetchTicket {
            generation: self.generation,
            plate: self.plate.clone(),
            page: self.next_page,
            filter: self.filter,
        }
    }

    /// Applies the result of a ticket. Only a page on which the backend sent
    /// nothing ends the listing; a page whose records were all unreadable
    /// still moves on to the next one.
    pub fn apply(&mut self, ticket: &FetchTicket, batch: PageBatch) -> ApplyOutcome {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding stale history page {} (generation {} != {})",
                ticket.page,
                ticket.generation,
                self.generation
            );
            return ApplyOutcome::Stale;
        }

        self.in_flight = false;
        if batch.total.is_some() {
            self.total = batch.total;
        }
        if batch.pages.is_some() {
            self.pages = batch.pages;
        }

        if batch.received == 0 {
            self.exhausted = true;
            return ApplyOutcome::Exhausted;
        }

        let mut added = 0;
        for record in batch.records {
            if self.seen.insert(record.id.clone()) {
                self.records.push(record);
                added += 1;
            } else {
                log::debug!("Skipping repeated history record {}", record.id);
            }
        }
        self.next_page = ticket.page + 1;
        ApplyOutcome::Appended(added)
    }

    pub fn sections(&self, today: NaiveDate) -> Vec<HistorySection> {
        group(&self.records, today)
    }

    pub fn view(&self, today: NaiveDate) -> HistoryView {
        if self.records.is_empty() {
            if self.in_flight {
                return HistoryView::Loading;
            }
            return HistoryView::Empty;
        }

        HistoryView::Sections {
            sections: self.sections(today),
            loading_more: self.in_flight,
            can_load_more: !self.exhausted && !self.in_flight,
            total: self.total,
        }
    }
}
