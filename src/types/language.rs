//! Supported answer languages.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Language the model is asked to answer in.
///
/// Serialized as its short code. Unknown codes deserialize to
/// [`Language::English`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
    Tamil,
    Bengali,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Hindi,
        Language::Marathi,
        Language::Tamil,
        Language::Bengali,
    ];

    /// Resolve a language code, falling back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "hi" => Self::Hindi,
            "mr" => Self::Marathi,
            "ta" => Self::Tamil,
            "bn" => Self::Bengali,
            _ => Self::English,
        }
    }

    /// Short language code, used in cache fingerprints.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Marathi => "mr",
            Self::Tamil => "ta",
            Self::Bengali => "bn",
        }
    }

    /// English display name embedded in prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Marathi => "Marathi",
            Self::Tamil => "Tamil",
            Self::Bengali => "Bengali",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code))
    }
}
