use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::CommerceError;

/// The single message shown when the shipping form is incomplete. It
/// deliberately does not name the missing field.
pub const SHIPPING_DETAILS_MESSAGE: &str = "Please fill all shipping details";

/// Destination for one checkout attempt.
///
/// Held only in transient session state; a snapshot is embedded in the
/// resulting order. All six fields must be non-blank before any
/// settlement path may start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(custom = "not_blank")]
    pub phone: String,
    #[validate(custom = "not_blank")]
    pub line1: String,
    #[validate(custom = "not_blank")]
    pub city: String,
    #[validate(custom = "not_blank")]
    pub state: String,
    #[validate(custom = "not_blank")]
    pub pincode: String,
}

impl ShippingAddress {
    /// Gate for every settlement path: all six fields present, one
    /// generic user-facing message when any is missing.
    pub fn validate_complete(&self) -> Result<(), CommerceError> {
        self.validate()
            .map_err(|_| CommerceError::ValidationError(SHIPPING_DETAILS_MESSAGE.to_string()))
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
