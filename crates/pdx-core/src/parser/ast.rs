//! PDX object model: the tree the parser builds
//!
//! A file is a [`Block`]: an ordered sequence of [`Stmt`] key/value pairs.
//! Values are [`Obj`], a closed sum type; nested blocks and lists are owned
//! outright by the `Obj` holding them, so the tree has no sharing and no
//! cycles.
//!
//! Source order and duplicate keys are preserved. Consumers decide how to
//! fold repeated statements.
//!
//! `Display` on every node writes PDX script back out. Scalars print exactly
//! as they were spelled in the source.

use std::fmt;

use crate::date::Date;
use crate::parser::tokenizer::is_bareword_char;
use crate::title::Title;
use crate::{Error, Result};

// ── Values ────────────────────────────────────────────────

/// RGB triple from a `color = { r g b }` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Unkeyed sequence of values, `{ a b c }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct List {
    pub items: Vec<Obj>,
}

impl List {
    pub fn new(items: Vec<Obj>) -> Self {
        List { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obj> {
        self.items.iter()
    }

    /// Reinterpret as a color: exactly three integers, each `0..=255`.
    pub fn as_color(&self) -> Option<Color> {
        match self.items.as_slice() {
            [r, g, b] => Some(Color {
                r: channel(r)?,
                g: channel(g)?,
                b: channel(b)?,
            }),
            _ => None,
        }
    }
}

fn channel(obj: &Obj) -> Option<u8> {
    obj.as_integer().and_then(|i| u8::try_from(i).ok())
}

/// A tagged PDX value
#[derive(Debug, Clone, PartialEq)]
pub enum Obj {
    /// Bareword or quoted string; `quoted` records the source spelling
    String { value: String, quoted: bool },
    Integer(i64),
    /// Exact source text of a decimal literal
    Decimal(String),
    Date(Date),
    Title(Title),
    Block(Block),
    List(List),
    Color(Color),
}

impl Obj {
    /// Unquoted string value
    pub fn bareword(value: impl Into<String>) -> Self {
        Obj::String {
            value: value.into(),
            quoted: false,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Obj::String {
            value: value.into(),
            quoted: true,
        }
    }

    /// Variant name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Obj::String { .. } => "string",
            Obj::Integer(_) => "integer",
            Obj::Decimal(_) => "decimal",
            Obj::Date(_) => "date",
            Obj::Title(_) => "title",
            Obj::Block(_) => "block",
            Obj::List(_) => "list",
            Obj::Color(_) => "color",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Obj::String { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Obj::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&str> {
        match self {
            Obj::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Date value, classifying string spellings the parser left alone
    /// (`1066.01.01`, `"1066.1.1"`, `1066.1.`).
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Obj::Date(d) => Some(*d),
            Obj::String { value, .. } if value.contains('.') => value.parse().ok(),
            _ => None,
        }
    }

    pub fn as_title(&self) -> Option<&Title> {
        match self {
            Obj::Title(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Obj::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Obj::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Obj::Color(c) => Some(*c),
            Obj::List(l) => l.as_color(),
            _ => None,
        }
    }

    /// True for the kinds allowed in key position
    pub fn is_key_kind(&self) -> bool {
        matches!(
            self,
            Obj::String { .. } | Obj::Integer(_) | Obj::Date(_) | Obj::Title(_)
        )
    }

    fn write_indented(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        match self {
            Obj::String { value, quoted } => {
                if *quoted || needs_quotes(value) {
                    write!(f, "\"{}\"", value)
                } else {
                    f.write_str(value)
                }
            }
            Obj::Integer(i) => write!(f, "{}", i),
            Obj::Decimal(d) => f.write_str(d),
            Obj::Date(d) => write!(f, "{}", d),
            Obj::Title(t) => write!(f, "{}", t),
            Obj::Block(b) => {
                if b.is_empty() {
                    return f.write_str("{ }");
                }
                writeln!(f, "{{")?;
                b.write_indented(f, indent + INDENT)?;
                write!(f, "{:indent$}}}", "", indent = indent)
            }
            Obj::List(l) => {
                f.write_str("{ ")?;
                for item in l.iter() {
                    item.write_indented(f, indent)?;
                    f.write_str(" ")?;
                }
                f.write_str("}")
            }
            Obj::Color(c) => write!(f, "{{ {} {} {} }}", c.r, c.g, c.b),
        }
    }
}

const INDENT: usize = 4;

/// Strings that would not lex back as a single bareword get quoted.
fn needs_quotes(s: &str) -> bool {
    s.is_empty() || !s.chars().all(is_bareword_char)
}

impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

// ── Statements ────────────────────────────────────────────

/// Keys the history and map readers dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownKey {
    Culture,
    Religion,
    Title,
    Color,
}

impl KnownKey {
    pub fn from_key(key: &str) -> Option<KnownKey> {
        const KEYS: [(&str, KnownKey); 4] = [
            ("culture", KnownKey::Culture),
            ("religion", KnownKey::Religion),
            ("title", KnownKey::Title),
            ("color", KnownKey::Color),
        ];
        KEYS.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|&(_, k)| k)
    }
}

/// Statement key classification, computed once per statement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyClass<'a> {
    Date(Date),
    Title(&'a Title),
    Known(KnownKey),
    Other,
}

/// A `key = value` statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub key: Obj,
    pub value: Obj,
}

impl Stmt {
    /// # Errors
    /// `Data` if `key` is a block, list, color or decimal.
    pub fn new(key: Obj, value: Obj) -> Result<Self> {
        if !key.is_key_kind() {
            return Err(Error::data(format!(
                "a {} cannot be used as a statement key",
                key.kind()
            )));
        }
        Ok(Stmt { key, value })
    }

    pub fn key_date(&self) -> Option<Date> {
        self.key.as_date()
    }

    pub fn key_title(&self) -> Option<&Title> {
        self.key.as_title()
    }

    /// ASCII case-insensitive match against a string key
    pub fn key_eq(&self, literal: &str) -> bool {
        match &self.key {
            Obj::String { value, .. } => value.eq_ignore_ascii_case(literal),
            _ => false,
        }
    }

    pub fn classify(&self) -> KeyClass<'_> {
        match &self.key {
            Obj::Date(d) => KeyClass::Date(*d),
            Obj::Title(t) => KeyClass::Title(t),
            Obj::String { value, .. } => match KnownKey::from_key(value) {
                Some(k) => KeyClass::Known(k),
                None => self.key.as_date().map_or(KeyClass::Other, KeyClass::Date),
            },
            _ => KeyClass::Other,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = indent)?;
        self.key.write_indented(f, indent)?;
        f.write_str(" = ")?;
        self.value.write_indented(f, indent)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

// ── Blocks ────────────────────────────────────────────────

/// Ordered statements; duplicates are kept in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new() -> Self {
        Block::default()
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stmt> {
        self.stmts.iter()
    }

    /// Value of the first statement whose key matches
    pub fn get(&self, key: &str) -> Option<&Obj> {
        self.stmts.iter().find(|s| s.key_eq(key)).map(|s| &s.value)
    }

    /// Values of every statement whose key matches, in source order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Obj> + 'a {
        self.stmts
            .iter()
            .filter(move |s| s.key_eq(key))
            .map(|s| &s.value)
    }

    fn write_indented(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        for stmt in &self.stmts {
            stmt.write_indented(f, indent)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl<'a> IntoIterator for &'a Block {
    type Item = &'a Stmt;
    type IntoIter = std::slice::Iter<'a, Stmt>;

    fn into_iter(self) -> Self::IntoIter {
        self.stmts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(key: Obj, value: Obj) -> Stmt {
        Stmt::new(key, value).unwrap()
    }

    #[test]
    fn test_stmt_rejects_block_key() {
        let err = Stmt::new(Obj::Block(Block::new()), Obj::Integer(1)).unwrap_err();
        assert!(err.to_string().contains("block cannot be used as a statement key"));
        assert!(Stmt::new(Obj::Decimal("1.5".into()), Obj::Integer(1)).is_err());
    }

    #[test]
    fn test_key_eq_is_case_insensitive() {
        let s = stmt(Obj::bareword("Culture"), Obj::bareword("roman"));
        assert!(s.key_eq("culture"));
        assert!(s.key_eq("CULTURE"));
        assert!(!s.key_eq("religion"));
    }

    #[test]
    fn test_key_eq_ignores_non_string_keys() {
        let s = stmt(Obj::Integer(1), Obj::Integer(0));
        assert!(!s.key_eq("1"));
    }

    #[test]
    fn test_classify_keys() {
        let date = Date::new(1066, 1, 1).unwrap();
        let title = Title::new("b_roma").unwrap();

        let s = stmt(Obj::Date(date), Obj::Block(Block::new()));
        assert_eq!(s.classify(), KeyClass::Date(date));

        let s = stmt(Obj::Title(title.clone()), Obj::bareword("temple"));
        assert_eq!(s.classify(), KeyClass::Title(&title));

        let s = stmt(Obj::bareword("RELIGION"), Obj::bareword("catholic"));
        assert_eq!(s.classify(), KeyClass::Known(KnownKey::Religion));

        let s = stmt(Obj::bareword("max_settlements"), Obj::Integer(4));
        assert_eq!(s.classify(), KeyClass::Other);
    }

    #[test]
    fn test_classify_non_canonical_date_key() {
        let s = stmt(Obj::bareword("1066.01.01"), Obj::Block(Block::new()));
        assert_eq!(
            s.classify(),
            KeyClass::Date(Date::new(1066, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_list_as_color() {
        let l = List::new(vec![Obj::Integer(255), Obj::Integer(0), Obj::Integer(12)]);
        assert_eq!(l.as_color(), Some(Color { r: 255, g: 0, b: 12 }));

        let too_big = List::new(vec![Obj::Integer(256), Obj::Integer(0), Obj::Integer(0)]);
        assert_eq!(too_big.as_color(), None);

        let two = List::new(vec![Obj::Integer(1), Obj::Integer(2)]);
        assert_eq!(two.as_color(), None);
    }

    #[test]
    fn test_block_get_and_get_all() {
        let mut b = Block::new();
        b.push(stmt(Obj::bareword("religion"), Obj::bareword("pagan")));
        b.push(stmt(Obj::bareword("culture"), Obj::bareword("roman")));
        b.push(stmt(Obj::bareword("Religion"), Obj::bareword("catholic")));

        assert_eq!(b.get("religion").and_then(Obj::as_str), Some("pagan"));
        let all: Vec<_> = b.get_all("religion").filter_map(Obj::as_str).collect();
        assert_eq!(all, vec!["pagan", "catholic"]);
        assert!(b.get("title").is_none());
    }

    #[test]
    fn test_get_with_short_lived_key() {
        let mut b = Block::new();
        b.push(stmt(Obj::bareword("culture"), Obj::bareword("roman")));

        let found = {
            let key = String::from("CULTURE");
            b.get(&key)
        };
        assert_eq!(found.and_then(Obj::as_str), Some("roman"));
    }

    #[test]
    fn test_display_quotes_only_when_needed() {
        assert_eq!(Obj::bareword("roman").to_string(), "roman");
        assert_eq!(Obj::quoted("roman").to_string(), "\"roman\"");
        assert_eq!(Obj::bareword("Holy Rome").to_string(), "\"Holy Rome\"");
        assert_eq!(Obj::bareword("").to_string(), "\"\"");
    }

    #[test]
    fn test_display_nested_block() {
        let mut inner = Block::new();
        inner.push(stmt(Obj::bareword("culture"), Obj::bareword("greek")));
        let mut outer = Block::new();
        outer.push(stmt(
            Obj::Date(Date::new(900, 1, 1).unwrap()),
            Obj::Block(inner),
        ));
        outer.push(stmt(
            Obj::bareword("color"),
            Obj::Color(Color { r: 1, g: 2, b: 3 }),
        ));
        outer.push(stmt(
            Obj::bareword("ids"),
            Obj::List(List::new(vec![Obj::Integer(4), Obj::Integer(5)])),
        ));

        assert_eq!(
            outer.to_string(),
            "900.1.1 = {\n    culture = greek\n}\ncolor = { 1 2 3 }\nids = { 4 5 }\n"
        );
    }
}
