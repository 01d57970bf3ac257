//! Product code newtype.
//!
//! Product codes are the unique key the Shop Service uses for a product. The
//! newtype keeps codes from being confused with product names or other
//! free-form strings that flow through the cart.

use serde::{Deserialize, Serialize};

/// Unique key of a product in the catalog.
///
/// # Example
///
/// ```rust
/// # use stockcart_core::ProductCode;
/// let code = ProductCode::new("A-001");
/// assert_eq!(code.as_str(), "A-001");
/// assert_eq!(code.to_string(), "A-001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(String);

impl ProductCode {
    /// Create a new code from any string-like value.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ProductCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for ProductCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<ProductCode> for String {
    fn from(code: ProductCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ProductCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ProductCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}
