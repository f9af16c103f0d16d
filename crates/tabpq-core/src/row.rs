//! A single data record: one string field per column.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_fields(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for Row {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl<'a> FromIterator<&'a str> for Row {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_owned).collect())
    }
}
