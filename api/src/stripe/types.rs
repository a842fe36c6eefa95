//! Remote objects relayed to the browser.
//!
//! Only the fields this server reads are typed; everything else is kept in
//! `extra` so that a relayed object serializes back with every field the
//! payment platform sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub capture_method: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reader {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Current action on the device; `null` once idle or canceled.
    #[serde(default)]
    pub action: Option<ReaderAction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderAction {
    #[serde(rename = "type")]
    pub kind: String,
    /// `in_progress`, `succeeded` or `failed`.
    pub status: String,
    #[serde(default)]
    pub failure_code: Option<String>,
    #[serde(default)]
    pub failure_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reader {
    pub fn action_status(&self) -> Option<&str> {
        self.action.as_ref().map(|a| a.status.as_str())
    }
}

/// Filters accepted by the reader listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReadersParams {
    pub limit: Option<u32>,
    pub location: Option<String>,
    pub device_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
    pub amount: i64,
    pub currency: String,
    pub payment_method_types: Vec<String>,
    pub capture_method: String,
}

impl CreatePaymentIntent {
    /// An in-person card payment: `card_present`, captured manually.
    pub fn card_present(amount: i64) -> Self {
        Self {
            amount,
            currency: "usd".to_string(),
            payment_method_types: vec!["card_present".to_string()],
            capture_method: "manual".to_string(),
        }
    }

    pub(crate) fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), self.amount.to_string()),
            ("currency".to_string(), self.currency.clone()),
            ("capture_method".to_string(), self.capture_method.clone()),
        ];
        for (i, kind) in self.payment_method_types.iter().enumerate() {
            form.push((format!("payment_method_types[{i}]"), kind.clone()));
        }
        form
    }
}

/// Outcome knobs for a simulated card presentation.
#[derive(Debug, Clone, Default)]
pub struct PresentPaymentMethod {
    /// Test card number, e.g. `4000000000000002` to force a decline.
    pub card_number: Option<String>,
    pub amount_tip: Option<i64>,
    /// `card_present` or `interac_present`.
    pub payment_method_type: Option<String>,
}

impl PresentPaymentMethod {
    pub(crate) fn to_form(&self) -> Vec<(String, String)> {
        let mut form = Vec::new();
        if let Some(number) = &self.card_number {
            let kind = self.payment_method_type.as_deref().unwrap_or("card_present");
            form.push((format!("{kind}[number]"), number.clone()));
        }
        if let Some(tip) = self.amount_tip {
            form.push(("amount_tip".to_string(), tip.to_string()));
        }
        if let Some(kind) = &self.payment_method_type {
            form.push(("type".to_string(), kind.clone()));
        }
        form
    }
}
