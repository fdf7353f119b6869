//! Batch driver: find each land province's history file and build its timeline
//!
//! Provinces are independent, so each one is lexed, parsed and built on a
//! rayon worker. Results come back in id order; the first failure in id
//! order halts the run unless `keep_going` is set.

use std::path::{Path, PathBuf};

use pdx_core::{build_timeline, parse_file, HistoryOptions, TimelineEntry};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::definitions::DefinitionsTable;
use crate::error::{CliError, Result};
use crate::map::DefaultMap;

const HISTORY_DIR: &str = "history/provinces";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Province {
    pub id: u32,
    pub name: String,
    pub timeline: Vec<TimelineEntry>,
}

/// A land province with a name, waiting to be processed
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceRef {
    pub id: u32,
    pub name: String,
}

/// History file lookup: primary root first, then the secondary root
#[derive(Debug, Clone)]
pub struct HistoryResolver {
    primary: PathBuf,
    secondary: Option<PathBuf>,
}

impl HistoryResolver {
    pub fn new(primary: &Path, secondary: Option<&Path>) -> Self {
        HistoryResolver {
            primary: primary.join(HISTORY_DIR),
            secondary: secondary.map(|s| s.join(HISTORY_DIR)),
        }
    }

    pub fn file_name(p: &ProvinceRef) -> String {
        format!("{} - {}.txt", p.id, p.name)
    }

    pub fn resolve(&self, p: &ProvinceRef) -> Result<PathBuf> {
        let file = Self::file_name(p);

        let primary = self.primary.join(&file);
        if primary.is_file() {
            return Ok(primary);
        }

        if let Some(dir) = &self.secondary {
            let secondary = dir.join(&file);
            if secondary.is_file() {
                return Ok(secondary);
            }
        }

        let mut searched = self.primary.display().to_string();
        if let Some(dir) = &self.secondary {
            searched.push_str(&format!(" and {}", dir.display()));
        }
        Err(CliError::MissingHistory { file, searched })
    }
}

/// Land provinces with a name; sea zones, major rivers and unnamed rows are skipped.
pub fn land_provinces(map: &DefaultMap, table: &DefinitionsTable) -> Vec<ProvinceRef> {
    table
        .rows
        .iter()
        .filter(|r| !map.is_water(r.id) && !r.name.is_empty())
        .map(|r| ProvinceRef {
            id: r.id,
            name: r.name.clone(),
        })
        .collect()
}

/// Resolve, parse and build one province. `Ok(None)` if its history has no title.
pub fn process_province(
    p: &ProvinceRef,
    resolver: &HistoryResolver,
    opts: &HistoryOptions,
) -> Result<Option<Province>> {
    let path = resolver.resolve(p)?;
    debug!(id = p.id, path = %path.display(), "processing history");

    let block = parse_file(&path)?;
    let timeline = build_timeline(&block, opts).map_err(|e| e.with_path(&path))?;

    Ok(timeline.map(|timeline| Province {
        id: p.id,
        name: p.name.clone(),
        timeline,
    }))
}

/// Process every province in parallel, returning results in id order.
pub fn process_all(
    provinces: &[ProvinceRef],
    resolver: &HistoryResolver,
    opts: &HistoryOptions,
    keep_going: bool,
) -> Result<Vec<Province>> {
    let results: Vec<Result<Option<Province>>> = provinces
        .par_iter()
        .map(|p| process_province(p, resolver, opts))
        .collect();

    let mut done = Vec::with_capacity(results.len());
    for (p, result) in provinces.iter().zip(results) {
        match result {
            Ok(Some(province)) => done.push(province),
            Ok(None) => debug!(id = p.id, name = %p.name, "no title statement, skipped"),
            Err(e) if keep_going => warn!(id = p.id, "skipping province: {}", e),
            Err(e) => return Err(e),
        }
    }

    info!(
        processed = done.len(),
        candidates = provinces.len(),
        "province histories built"
    );
    Ok(done)
}
