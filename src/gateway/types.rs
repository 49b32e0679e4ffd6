use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// StrictDecimal: Format-Validated Positive Decimal at Serde Layer
// ============================================================================

/// Strict format Decimal - validates format during deserialization
///
/// - Accepts a JSON number or a JSON string
/// - Rejects `.5` (must be `0.5`) and `5.` (must be `5.0` or `5`)
/// - Rejects empty strings, zero and negative numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictDecimal(Decimal);

impl StrictDecimal {
    /// Get the inner Decimal value
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl std::ops::Deref for StrictDecimal {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn check_positive<E: serde::de::Error>(d: Decimal) -> Result<StrictDecimal, E> {
    if d.is_sign_negative() || d.is_zero() {
        return Err(E::custom("Amount must be greater than zero"));
    }
    Ok(StrictDecimal(d))
}

impl<'de> Deserialize<'de> for StrictDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            String(String),
            Number(Decimal),
        }

        match DecimalOrString::deserialize(deserializer)? {
            DecimalOrString::String(s) => {
                if s.is_empty() {
                    return Err(D::Error::custom("Amount cannot be empty"));
                }
                if s.starts_with('.') {
                    return Err(D::Error::custom("Invalid format: use 0.5 not .5"));
                }
                if s.ends_with('.') {
                    return Err(D::Error::custom("Invalid format: use 5.0 not 5."));
                }
                let d = Decimal::from_str(&s)
                    .map_err(|e| D::Error::custom(format!("Invalid decimal: {}", e)))?;
                check_positive(d)
            }
            DecimalOrString::Number(d) => check_positive(d),
        }
    }
}

impl Serialize for StrictDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as string to preserve precision
        serializer.serialize_str(&self.0.to_string())
    }
}

// ============================================================================
// Response envelopes
// ============================================================================

/// `{"message": "..."}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{"message": "...", "data": {...}}` for writes that echo the stored row
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}
