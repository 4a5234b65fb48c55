use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CalendarError;

/// One selectable class group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub name: String,
    pub id: String,
    pub parent_category: String,
}

impl GroupRecord {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        parent_category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            parent_category: parent_category.into(),
        }
    }
}

impl fmt::Display for GroupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.parent_category)
    }
}

/// Group id as typed by a user. Catalog ids are kept as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupId {
    type Err = CalendarError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        // ids land in a URL path unencoded
        let is_valid = !normalized.is_empty()
            && !normalized
                .chars()
                .any(|ch| ch.is_whitespace() || matches!(ch, '/' | '?' | '#'));
        if !is_valid {
            return Err(CalendarError::InvalidGroupId(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

/// A `(name, id)` pair as it appears in the source document.
pub type GroupPair = (String, String);

/// The nested source mapping, category -> groups, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMapping {
    categories: Vec<(String, Vec<GroupPair>)>,
}

impl GroupMapping {
    pub fn categories(&self) -> &[(String, Vec<GroupPair>)] {
        &self.categories
    }

    pub fn into_categories(self) -> Vec<(String, Vec<GroupPair>)> {
        self.categories
    }
}

impl<'de> Deserialize<'de> for GroupMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = GroupMapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of category -> [[name, id], ...]")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut categories = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((category, groups)) = map.next_entry::<String, Vec<GroupPair>>()? {
                    categories.push((category, groups));
                }
                Ok(GroupMapping { categories })
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}
