use serde::{Deserialize, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Subject tag used to partition posters. The display name is what gets
/// stored on a record; the slug is what index keys and URLs use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Category {
    Engineering,
    LiberalArts,
    Business,
    Science,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Engineering,
        Category::LiberalArts,
        Category::Business,
        Category::Science,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Engineering => "工科",
            Category::LiberalArts => "文科",
            Category::Business => "商科",
            Category::Science => "理科",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Category::Engineering => "gongke",
            Category::LiberalArts => "wenke",
            Category::Business => "shangke",
            Category::Science => "like",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Category::Engineering => "Engineering / Technology",
            Category::LiberalArts => "Liberal Arts / Humanities",
            Category::Business => "Business / Commerce / Economics",
            Category::Science => "Science / Natural Sciences",
        }
    }

    /// Accepts the display name, the slug or the English label.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL.into_iter().find(|category| {
            category.name() == input
                || category.slug().eq_ignore_ascii_case(input)
                || category.english_name().eq_ignore_ascii_case(input)
        })
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
