//! Province history timeline builder
//!
//! Turns one province's parsed history file into a minimal, chronologically
//! ordered sequence of `(start year, culture, religion, temple)` states.
//!
//! # Pipeline
//!
//! 1. Files without a top-level `title` statement are not real provinces
//!    (wasteland, external) and yield `None`.
//! 2. Top-level statements fold into a record at [`Date::EPOCH`]; that
//!    record must establish both culture and religion.
//! 3. Each dated block at or before the cutoff year folds into its own
//!    record; records that carry nothing relevant are dropped.
//! 4. Records are stably sorted by date, so same-date records keep file
//!    order and the epoch record comes first.
//! 5. Years inside an unplayable range snap forward to the range's end.
//! 6. Records coalesce into one entry per distinct effective year.

use serde::Serialize;
use tracing::debug;

use crate::date::Date;
use crate::parser::ast::{Block, KeyClass, KnownKey, Obj, Stmt};
use crate::title::Tier;
use crate::{Error, Result};

// ── Configuration ─────────────────────────────────────────

/// Ordered open intervals `(start, end)` of years nobody can play in
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnplayableRanges {
    ranges: Vec<(u32, u32)>,
}

impl UnplayableRanges {
    /// # Errors
    /// `Data` if a range is empty (`start >= end`) or two ranges overlap.
    /// Touching ranges such as `(0, 867), (867, 1066)` are fine.
    pub fn new(ranges: Vec<(u32, u32)>) -> Result<Self> {
        for &(start, end) in &ranges {
            if start >= end {
                return Err(Error::data(format!(
                    "unplayable range ({}, {}) is empty",
                    start, end
                )));
            }
        }
        for (i, &(s1, e1)) in ranges.iter().enumerate() {
            for &(s2, e2) in &ranges[i + 1..] {
                if s1 < e2 && s2 < e1 {
                    return Err(Error::data(format!(
                        "unplayable ranges ({}, {}) and ({}, {}) overlap",
                        s1, e1, s2, e2
                    )));
                }
            }
        }
        Ok(UnplayableRanges { ranges })
    }

    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    /// Snap a year strictly inside a range to that range's end; boundary
    /// years are already playable. First matching range wins.
    pub fn round(&self, year: u32) -> u32 {
        self.ranges
            .iter()
            .find(|&&(start, end)| start < year && year < end)
            .map_or(year, |&(_, end)| end)
    }
}

/// Parameters for [`build_timeline`]
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryOptions {
    /// Dated entries after this year are ignored
    pub cutoff_year: u32,
    pub unplayable: UnplayableRanges,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        HistoryOptions {
            cutoff_year: 1337,
            unplayable: UnplayableRanges {
                ranges: vec![(0, 867), (867, 1066)],
            },
        }
    }
}

// ── Records & entries ─────────────────────────────────────

/// One partial update; `None` fields leave the prior state unchanged.
#[derive(Debug, Clone, PartialEq)]
struct HistoryRecord {
    date: Date,
    culture: Option<String>,
    religion: Option<String>,
    has_temple: bool,
}

impl HistoryRecord {
    fn new(date: Date) -> Self {
        HistoryRecord {
            date,
            culture: None,
            religion: None,
            has_temple: false,
        }
    }

    fn is_relevant(&self) -> bool {
        self.culture.is_some() || self.religion.is_some() || self.has_temple
    }

    /// Fold a block's statements into this record.
    fn fold(&mut self, block: &Block) -> Result<()> {
        for stmt in block {
            match stmt.classify() {
                KeyClass::Known(KnownKey::Culture) => {
                    self.culture = Some(string_value(stmt, "culture")?.to_string());
                }
                KeyClass::Known(KnownKey::Religion) => {
                    self.religion = Some(string_value(stmt, "religion")?.to_string());
                }
                KeyClass::Title(title) => {
                    if title.tier() != Tier::Barony {
                        return Err(Error::contract(format!(
                            "holding key '{}' is {} tier, expected barony",
                            title,
                            title.tier()
                        )));
                    }
                    match &stmt.value {
                        Obj::Integer(0) => {}
                        Obj::Integer(i) => {
                            return Err(Error::contract(format!(
                                "holding '{}' = {}: only 0 is allowed as an integer value",
                                title, i
                            )))
                        }
                        Obj::String { value, .. } => {
                            if value.eq_ignore_ascii_case("temple") {
                                self.has_temple = true;
                            }
                        }
                        other => {
                            return Err(Error::data(format!(
                                "holding '{}' has a {} value, expected a holding type",
                                title,
                                other.kind()
                            )))
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn string_value<'a>(stmt: &'a Stmt, field: &str) -> Result<&'a str> {
    stmt.value.as_str().ok_or_else(|| {
        Error::data(format!(
            "{} must be a string, found a {}",
            field,
            stmt.value.kind()
        ))
    })
}

/// One interval of a province's history, lasting until the next entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub start_year: u32,
    pub culture: String,
    pub religion: String,
    pub has_temple: bool,
}

impl TimelineEntry {
    pub fn holding_type(&self) -> &'static str {
        if self.has_temple {
            "temple"
        } else {
            "tribal"
        }
    }
}

/// Culture/religion/temple as of the records folded so far
#[derive(Debug, Default)]
struct WorkingState {
    culture: Option<String>,
    religion: Option<String>,
    has_temple: bool,
}

impl WorkingState {
    fn apply(&mut self, record: &HistoryRecord) {
        if let Some(c) = &record.culture {
            self.culture = Some(c.clone());
        }
        if let Some(r) = &record.religion {
            self.religion = Some(r.clone());
        }
        self.has_temple |= record.has_temple;
    }

    fn entry(&self, start_year: u32) -> Result<TimelineEntry> {
        match (&self.culture, &self.religion) {
            (Some(culture), Some(religion)) => Ok(TimelineEntry {
                start_year,
                culture: culture.clone(),
                religion: religion.clone(),
                has_temple: self.has_temple,
            }),
            _ => Err(Error::data(format!(
                "no culture/religion established by year {}",
                start_year
            ))),
        }
    }
}

// ── Builder ───────────────────────────────────────────────

/// True if the block has a top-level `title = ...` statement
pub fn has_title_stmt(block: &Block) -> bool {
    block
        .iter()
        .any(|s| s.classify() == KeyClass::Known(KnownKey::Title))
}

/// Build the timeline for one province history.
///
/// Returns `Ok(None)` for files without a top-level `title` statement.
///
/// # Errors
/// - `Data` if the top level lacks a culture or religion, a dated entry is
///   not a block, or a field has the wrong kind of value
/// - `ContractViolation` for a non-barony holding key or a non-zero
///   integer holding value
pub fn build_timeline(block: &Block, opts: &HistoryOptions) -> Result<Option<Vec<TimelineEntry>>> {
    if !has_title_stmt(block) {
        return Ok(None);
    }

    let records = collect_records(block, opts.cutoff_year)?;

    for r in &records {
        debug!(
            date = %r.date,
            culture = r.culture.as_deref(),
            religion = r.religion.as_deref(),
            temple = r.has_temple,
            "history record"
        );
    }

    let timeline = coalesce(&records, &opts.unplayable)?;

    for e in &timeline {
        debug!(
            year = e.start_year,
            culture = %e.culture,
            religion = %e.religion,
            holding = e.holding_type(),
            "timeline entry"
        );
    }

    Ok(Some(timeline))
}

/// Steps 2-4: epoch record, dated records, stable sort.
fn collect_records(block: &Block, cutoff_year: u32) -> Result<Vec<HistoryRecord>> {
    let mut epoch = HistoryRecord::new(Date::EPOCH);
    epoch.fold(block)?;

    if epoch.culture.is_none() {
        return Err(Error::data("missing top-level culture assignment"));
    }
    if epoch.religion.is_none() {
        return Err(Error::data("missing top-level religion assignment"));
    }

    let mut records = vec![epoch];

    for stmt in block {
        let date = match stmt.classify() {
            KeyClass::Date(d) => d,
            _ => {
                if let Obj::String { value, .. } = &stmt.key {
                    if looks_like_date(value) {
                        return Err(Error::data(format!("malformed date '{}'", value)));
                    }
                }
                continue;
            }
        };

        if u32::from(date.year) > cutoff_year {
            continue;
        }

        let entry = stmt.value.as_block().ok_or_else(|| {
            Error::data(format!(
                "history entry {} must be a block, found a {}",
                date,
                stmt.value.kind()
            ))
        })?;

        let mut record = HistoryRecord::new(date.max(Date::EPOCH));
        record.fold(entry)?;
        if record.is_relevant() {
            records.push(record);
        }
    }

    records.sort_by_key(|r| r.date);
    Ok(records)
}

/// Digits and dots, starting with a digit: meant as a date key
fn looks_like_date(key: &str) -> bool {
    key.starts_with(|c: char| c.is_ascii_digit())
        && key.contains('.')
        && key.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Steps 5-6: round years and merge records into timeline entries.
fn coalesce(records: &[HistoryRecord], unplayable: &UnplayableRanges) -> Result<Vec<TimelineEntry>> {
    let mut timeline = Vec::new();
    let mut state = WorkingState::default();

    let mut open_year = match records.first() {
        Some(first) => unplayable.round(u32::from(first.date.year)),
        None => return Ok(timeline),
    };

    for record in records {
        let year = unplayable.round(u32::from(record.date.year));
        if year > open_year {
            timeline.push(state.entry(open_year)?);
            open_year = year;
        }
        state.apply(record);
    }

    timeline.push(state.entry(open_year)?);
    Ok(timeline)
}
