use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

/// Upstream identifier, which the API sends either as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One event record as returned by the remote calendar API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawEvent {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<RawId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub summary: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "deserialize_flag")
    )]
    pub all_day: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

#[cfg(feature = "serde")]
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

impl RawEvent {
    /// The identifier as text, empty when the record has none.
    pub fn id_text(&self) -> String {
        self.id.as_ref().map(RawId::to_string).unwrap_or_default()
    }

    pub fn start(&self) -> Option<&str> {
        non_empty(&self.start)
    }

    pub fn end(&self) -> Option<&str> {
        non_empty(&self.end)
    }

    pub fn summary(&self) -> Option<&str> {
        non_empty(&self.summary)
    }

    pub fn location(&self) -> Option<&str> {
        non_empty(&self.location)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }
}
