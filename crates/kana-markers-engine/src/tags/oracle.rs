use thiserror::Error;
use wana_kana::ConvertJapanese;

use super::Conversion;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot convert {input:?} to {conversion:?}: {reason}")]
pub struct ConvertError {
    pub conversion: Conversion,
    pub input: String,
    pub reason: String,
}

impl ConvertError {
    pub fn new(conversion: Conversion, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            conversion,
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Transliteration capability used by the scanner.
///
/// Implementations must be pure: the same `(conversion, input)` always
/// yields the same result.
pub trait Oracle {
    fn convert(&self, conversion: Conversion, input: &str) -> Result<String, ConvertError>;
}

/// Default oracle backed by `wana_kana`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WanaKana;

impl Oracle for WanaKana {
    fn convert(&self, conversion: Conversion, input: &str) -> Result<String, ConvertError> {
        Ok(match conversion {
            Conversion::Hiragana => input.to_hiragana(),
            Conversion::Katakana => input.to_katakana(),
            Conversion::Kana => input.to_kana(),
        })
    }
}

impl<F> Oracle for F
where
    F: Fn(Conversion, &str) -> Result<String, ConvertError>,
{
    fn convert(&self, conversion: Conversion, input: &str) -> Result<String, ConvertError> {
        self(conversion, input)
    }
}
