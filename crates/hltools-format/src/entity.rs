//! Parser for the entity text stored in a map's entity lump.
//!
//! The text is a sequence of `{ "key" "value" ... }` records. Parsing is a
//! single forward pass; anything other than `{` where a record could start
//! (end of input, the compiler's trailing NUL) ends the sequence.

use hltools_core::error::EntityError;
use std::collections::BTreeMap;

/// One entity: key/value pairs in source order, keys unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRecord {
    pairs: Vec<(String, String)>,
}

impl EntityRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn classname(&self) -> Option<&str> {
        self.get("classname")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Add a pair. Repeating a key with the same value is a no-op; repeating
    /// it with a different value is rejected and the record keeps the first.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), EntityError> {
        let key = key.into();
        let value = value.into();
        match self.get(&key) {
            Some(existing) if existing == value => Ok(()),
            Some(existing) => Err(EntityError::ConflictingKey {
                existing: existing.to_string(),
                key,
                value,
            }),
            None => {
                self.pairs.push((key, value));
                Ok(())
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EntityParser<'a> {
    text: &'a str,
}

impl<'a> EntityParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Records in source order. Each call starts again from the beginning.
    pub fn records(&self) -> Records<'a> {
        Records {
            text: self.text,
            pos: 0,
            done: false,
        }
    }
}

/// Lazy record iterator returned by [`EntityParser::records`].
///
/// A [`EntityError::ConflictingKey`] fails only the record it occurs in;
/// any other error ends the iteration.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    text: &'a str,
    pos: usize,
    done: bool,
}

impl Records<'_> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn found_at(&self) -> char {
        self.text
            .get(self.pos..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or('\0')
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), EntityError> {
        match self.peek() {
            None => Err(EntityError::UnexpectedEndOfInput {
                expected: ch,
                at: self.pos,
            }),
            Some(b) if char::from(b) == ch => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(EntityError::UnexpectedChar {
                expected: ch,
                found: self.found_at(),
                at: self.pos,
            }),
        }
    }

    /// Text up to (not including) the next `ch`; the cursor stops on `ch`.
    fn read_until(&mut self, ch: char) -> Result<String, EntityError> {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        let Some(len) = bytes[start..].iter().position(|&b| char::from(b) == ch) else {
            self.pos = bytes.len();
            return Err(EntityError::UnexpectedEndOfInput {
                expected: ch,
                at: bytes.len(),
            });
        };
        self.pos = start + len;
        Ok(String::from_utf8_lossy(&bytes[start..self.pos]).into_owned())
    }

    fn read_quoted(&mut self) -> Result<String, EntityError> {
        self.expect('"')?;
        let s = self.read_until('"')?;
        self.expect('"')?;
        Ok(s)
    }

    fn read_record(&mut self) -> Result<EntityRecord, EntityError> {
        self.expect('{')?;
        let mut record = EntityRecord::new();
        let mut conflict = None;
        loop {
            self.skip_whitespace();
            if self.peek() == Some(b'}') && !record.is_empty() {
                self.pos += 1;
                break;
            }
            let key = self.read_quoted()?;
            self.skip_whitespace();
            let value = self.read_quoted()?;
            if let Err(err) = record.insert(key, value) {
                conflict.get_or_insert(err);
            }
        }
        match conflict {
            Some(err) => Err(err),
            None => Ok(record),
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<EntityRecord, EntityError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.skip_whitespace();
        if self.peek() != Some(b'{') {
            self.done = true;
            return None;
        }
        let result = self.read_record();
        if matches!(result, Err(ref err) if !matches!(err, EntityError::ConflictingKey { .. })) {
            self.done = true;
        }
        Some(result)
    }
}

/// Records grouped by `classname`, each group in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTable {
    groups: BTreeMap<String, Vec<EntityRecord>>,
    unclassified: usize,
}

impl EntityTable {
    /// Parse `text`, failing on the first error.
    pub fn parse(text: &str) -> Result<Self, EntityError> {
        let mut table = Self::default();
        for record in EntityParser::new(text).records() {
            table.push(record?);
        }
        Ok(table)
    }

    /// Parse `text`, keeping every record that parsed and returning the
    /// errors alongside.
    pub fn parse_lenient(text: &str) -> (Self, Vec<EntityError>) {
        let mut table = Self::default();
        let mut errors = Vec::new();
        for record in EntityParser::new(text).records() {
            match record {
                Ok(record) => table.push(record),
                Err(err) => errors.push(err),
            }
        }
        (table, errors)
    }

    /// Records without a classname are counted but not stored.
    pub fn push(&mut self, record: EntityRecord) {
        match record.classname() {
            Some(class) => {
                let class = class.to_string();
                self.groups.entry(class).or_default().push(record);
            }
            None => self.unclassified += 1,
        }
    }

    pub fn get(&self, classname: &str) -> &[EntityRecord] {
        self.groups.get(classname).map_or(&[], Vec::as_slice)
    }

    pub fn first(&self, classname: &str) -> Option<&EntityRecord> {
        self.get(classname).first()
    }

    pub fn contains(&self, classname: &str) -> bool {
        self.groups.contains_key(classname)
    }

    pub fn classnames(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Every classified record, grouped by classname.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.groups.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn unclassified(&self) -> usize {
        self.unclassified
    }
}
