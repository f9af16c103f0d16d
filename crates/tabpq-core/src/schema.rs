//! Output schema: every column is UTF-8 text tagged with an encoding choice.
//!
//! Pure data; no Arrow/Parquet dependency here. `tabpq-io` maps this onto an
//! Arrow schema plus Parquet writer properties.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field metadata key that carries the encoding tag in the output file.
pub const ENCODING_METADATA_KEY: &str = "tabpq.encoding";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingChoice {
    Plain,
    DictionaryEligible,
}

impl EncodingChoice {
    pub fn from_verdict(should_dictionary: bool) -> Self {
        if should_dictionary {
            EncodingChoice::DictionaryEligible
        } else {
            EncodingChoice::Plain
        }
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self, EncodingChoice::DictionaryEligible)
    }

    /// Tag written into the output's schema metadata.
    pub fn tag(&self) -> &'static str {
        match self {
            EncodingChoice::Plain => "PLAIN",
            EncodingChoice::DictionaryEligible => "PLAIN_DICTIONARY",
        }
    }
}

impl fmt::Display for EncodingChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub encoding: EncodingChoice,
}

impl Field {
    pub fn new(name: impl Into<String>, encoding: EncodingChoice) -> Self {
        Self {
            name: name.into(),
            encoding,
        }
    }
}

/// Ordered column list. Built once before the first row is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First column with this exact (case-sensitive) name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn encoding_of(&self, name: &str) -> Option<EncodingChoice> {
        self.index_of(name).map(|i| self.fields[i].encoding)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// First name that appears more than once, if any.
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        self.names().find(|name| !seen.insert(*name))
    }
}
