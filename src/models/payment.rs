use serde::{Deserialize, Serialize};

/// Fields the language model is asked to pull out of a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFields {
    pub amount: f64,
    pub payment_date: String, // yyyy-mm-dd
    pub institution: String,
}

/// Record posted to the transaction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub amount: f64,
    pub payment_date: String,
    pub institution: String,
    pub user: String,
}

impl PaymentInfo {
    pub fn from_fields(fields: PaymentFields, user: impl Into<String>) -> Self {
        PaymentInfo {
            amount: fields.amount,
            payment_date: fields.payment_date,
            institution: fields.institution,
            user: user.into(),
        }
    }
}

/// Derives the uploading user from an object key named `<user>-<rest>`.
/// Keys without a hyphen yield the whole key.
pub fn derive_user(key: &str) -> &str {
    key.split('-').next().unwrap_or(key)
}
