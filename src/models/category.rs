use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// The fixed set of board sections a post can be filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Category {
    #[serde(rename = "生活求助")]
    LifeHelp,
    #[serde(rename = "学业探讨")]
    Academics,
    #[serde(rename = "失物招领")]
    LostAndFound,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::LifeHelp,
        Category::Academics,
        Category::LostAndFound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::LifeHelp => "生活求助",
            Category::Academics => "学业探讨",
            Category::LostAndFound => "失物招领",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_label() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn rejects_unknown_label() {
        assert!("闲聊".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_as_chinese_label() {
        let json = serde_json::to_string(&Category::LostAndFound).unwrap();
        assert_eq!(json, "\"失物招领\"");
        let back: Category = serde_json::from_str("\"学业探讨\"").unwrap();
        assert_eq!(back, Category::Academics);
    }
}
