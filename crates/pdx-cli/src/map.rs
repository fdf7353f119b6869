//! `map/default.map`: province count, definitions file, water provinces

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pdx_core::{parse_file, Block, Obj};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultMap {
    root: PathBuf,
    /// Highest valid province id (`max_provinces - 1`)
    max_province_id: u32,
    definitions: String,
    sea_zones: Vec<(u32, u32)>,
    major_rivers: BTreeSet<u32>,
}

impl DefaultMap {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("map").join("default.map");
        let block = parse_file(&path)?;
        Self::from_block(root, &path, &block)
    }

    fn from_block(root: &Path, path: &Path, block: &Block) -> Result<Self> {
        let err = |message: String| CliError::Map {
            path: path.to_path_buf(),
            message,
        };

        let max_provinces = block
            .get("max_provinces")
            .and_then(Obj::as_integer)
            .ok_or_else(|| err("missing integer 'max_provinces'".into()))?;
        let max_province_id = max_provinces
            .checked_sub(1)
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(|| err(format!("max_provinces = {} is out of range", max_provinces)))?;

        let definitions = block
            .get("definitions")
            .and_then(Obj::as_str)
            .ok_or_else(|| err("missing string 'definitions'".into()))?
            .to_string();

        let mut sea_zones = Vec::new();
        for value in block.get_all("sea_zones") {
            let ids = id_list(value).ok_or_else(|| err("sea_zones must be a list of ids".into()))?;
            match ids.as_slice() {
                [start, end] if start <= end => sea_zones.push((*start, *end)),
                _ => return Err(err("sea_zones must be a '{ first last }' id range".into())),
            }
        }

        let mut major_rivers = BTreeSet::new();
        for value in block.get_all("major_rivers") {
            let ids =
                id_list(value).ok_or_else(|| err("major_rivers must be a list of ids".into()))?;
            major_rivers.extend(ids);
        }

        Ok(DefaultMap {
            root: root.to_path_buf(),
            max_province_id,
            definitions,
            sea_zones,
            major_rivers,
        })
    }

    pub fn max_province_id(&self) -> u32 {
        self.max_province_id
    }

    pub fn definitions_path(&self) -> PathBuf {
        self.root.join("map").join(&self.definitions)
    }

    /// Sea zone or major river
    pub fn is_water(&self, id: u32) -> bool {
        self.major_rivers.contains(&id)
            || self
                .sea_zones
                .iter()
                .any(|&(start, end)| start <= id && id <= end)
    }
}

fn id_list(value: &Obj) -> Option<Vec<u32>> {
    let list = value.as_list()?;
    list.iter()
        .map(|o| o.as_integer().and_then(|i| u32::try_from(i).ok()))
        .collect()
}
