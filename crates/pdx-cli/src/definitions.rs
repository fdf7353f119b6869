//! Province definitions table (`map/definition.csv`)
//!
//! Semicolon-delimited, one header line, then `id;red;green;blue;name;...`
//! rows numbered consecutively from 1. Lines starting with `#` are skipped.

use std::fmt::Write as _;
use std::path::Path;

use crate::encoding::{decode_latin1, encode_latin1};
use crate::error::{CliError, Result};
use crate::map::DefaultMap;

const HEADER: &str = "province;red;green;blue;x;x";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionRow {
    pub id: u32,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Empty for wasteland and off-map provinces
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DefinitionsTable {
    pub rows: Vec<DefinitionRow>,
}

impl DefinitionsTable {
    pub fn load(map: &DefaultMap) -> Result<Self> {
        let path = map.definitions_path();
        let bytes = std::fs::read(&path).map_err(|e| CliError::io(&path, e))?;
        Self::parse(&decode_latin1(&bytes), &path, map.max_province_id())
    }

    /// Parse rows `1..=max_id`; anything after row `max_id` is ignored.
    pub fn parse(text: &str, path: &Path, max_id: u32) -> Result<Self> {
        let err = |line: usize, message: String| CliError::Table {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
        if lines.next().is_none() {
            return Err(err(1, "definitions table lacks a header line".into()));
        }

        let mut rows = Vec::new();
        for (n_line, line) in lines {
            if rows.len() as u32 >= max_id {
                break;
            }
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let cols: Vec<&str> = line.split(';').collect();
            if cols.len() < 5 {
                return Err(err(n_line, format!("expected 5 columns, found {}", cols.len())));
            }

            let id: u32 = cols[0]
                .trim()
                .parse()
                .map_err(|_| err(n_line, format!("bad province id '{}'", cols[0])))?;
            let channel = |i: usize, what: &str| -> Result<u8> {
                cols[i]
                    .trim()
                    .parse()
                    .map_err(|_| err(n_line, format!("bad {} value '{}'", what, cols[i])))
            };
            let (red, green, blue) = (channel(1, "red")?, channel(2, "green")?, channel(3, "blue")?);

            let expected = rows.len() as u32 + 1;
            if id != expected {
                return Err(err(
                    n_line,
                    format!("unexpected province id {}, expected {}", id, expected),
                ));
            }

            rows.push(DefinitionRow {
                id,
                red,
                green,
                blue,
                name: cols[4].to_string(),
            });
        }

        if rows.len() as u32 != max_id {
            return Err(CliError::Map {
                path: path.to_path_buf(),
                message: format!("{} provinces defined for a map with {}", rows.len(), max_id),
            });
        }

        Ok(DefinitionsTable { rows })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", HEADER);
        for r in &self.rows {
            let _ = writeln!(out, "{};{};{};{};{};x", r.id, r.red, r.green, r.blue, r.name);
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, encode_latin1(&self.to_text())).map_err(|e| CliError::io(path, e))
    }
}
