use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display language of the website.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Bs,
    Tr,
}

impl Language {
    pub const ALL: [Self; 3] = [Self::En, Self::Bs, Self::Tr];

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Bs => "bs",
            Self::Tr => "tr",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error)]
#[error("Unknown language: {0}")]
pub struct UnknownLanguageError(pub String);

impl FromStr for Language {
    type Err = UnknownLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == s)
            .ok_or_else(|| UnknownLanguageError(s.into()))
    }
}
