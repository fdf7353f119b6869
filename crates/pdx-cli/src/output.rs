//! Generated output: PDX script (default) or JSON

use std::fmt::Write as _;
use std::path::Path;

use pdx_core::{Block, Obj, Stmt, TimelineEntry};

use crate::encoding::encode_latin1;
use crate::error::{CliError, Result};
use crate::provinces::Province;

const BANNER: &str = "# generated by pdxhist; do not edit";

/// One `YEAR = { culture = .. religion = .. holding = .. }` statement
fn entry_stmt(e: &TimelineEntry) -> Stmt {
    let mut body = Block::new();
    body.push(Stmt {
        key: Obj::bareword("culture"),
        value: Obj::bareword(e.culture.as_str()),
    });
    body.push(Stmt {
        key: Obj::bareword("religion"),
        value: Obj::bareword(e.religion.as_str()),
    });
    body.push(Stmt {
        key: Obj::bareword("holding"),
        value: Obj::bareword(e.holding_type()),
    });
    Stmt {
        key: Obj::Integer(i64::from(e.start_year)),
        value: Obj::Block(body),
    }
}

fn province_stmt(p: &Province) -> Stmt {
    let mut timeline = Block::new();
    for e in &p.timeline {
        timeline.push(entry_stmt(e));
    }
    Stmt {
        key: Obj::Integer(i64::from(p.id)),
        value: Obj::Block(timeline),
    }
}

pub fn render_pdx(provinces: &[Province]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", BANNER);
    for p in provinces {
        let _ = writeln!(out, "\n# {} - {}", p.id, p.name);
        let _ = writeln!(out, "{}", province_stmt(p));
    }
    out
}

pub fn render_json(provinces: &[Province]) -> Result<String> {
    Ok(serde_json::to_string_pretty(provinces)?)
}

pub fn write(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, encode_latin1(text)).map_err(|e| CliError::io(path, e))
}
