//! # Gateway Callbacks
//!
//! Parses the transaction the gateway reports, in either delivery form.
//!
//! ## Delivery Forms
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /payments/webhook  (processed callback)                          │
//! │    { "type": "TRANSACTION", "obj": { "id": 1, "success": true,         │
//! │      "order": { "id": 9001, "merchant_order_id": "<booking id>" },     │
//! │      "source_data": { "pan": "2346", ... }, ... } }                    │
//! │                                                                         │
//! │  GET /payments/webhook?id=1&success=true&order=9001                    │
//! │      &merchant_order_id=<booking id>&source_data.pan=2346&hmac=...     │
//! │    (response callback, fields flattened into the query)                │
//! │                                                                         │
//! │  Both become the same nested object before anything reads it.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{BookingError, BookingResult};

/// Fields covered by the callback signature, in signing order.
pub const SIGNED_FIELDS: [&str; 19] = [
    "amount_cents",
    "created_at",
    "currency",
    "error_occured",
    "id",
    "integration_id",
    "is_3d_secure",
    "is_auth",
    "is_capture",
    "is_refunded",
    "is_voided",
    "is_standalone_payment",
    "order.id",
    "owner",
    "pending",
    "source_data.pan",
    "source_data.sub_type",
    "source_data.type",
    "success",
];

/// A transaction reported by the gateway.
#[derive(Debug, Clone)]
pub struct TransactionCallback {
    obj: Value,
}

impl TransactionCallback {
    /// Parses a webhook body: the `{type, obj}` envelope or a bare transaction.
    pub fn from_json(body: &[u8]) -> BookingResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| BookingError::InvalidInput(format!("callback body: {}", e)))?;

        let obj = match value {
            Value::Object(mut envelope) if envelope.contains_key("obj") => {
                if let Some(kind) = envelope.get("type").and_then(Value::as_str) {
                    if kind != "TRANSACTION" {
                        return Err(BookingError::InvalidInput(format!(
                            "unsupported callback type {}",
                            kind
                        )));
                    }
                }
                envelope.remove("obj").unwrap_or(Value::Null)
            }
            other => other,
        };

        if !obj.is_object() {
            return Err(BookingError::InvalidInput(
                "callback transaction must be an object".to_string(),
            ));
        }
        Ok(TransactionCallback { obj })
    }

    /// Rebuilds the transaction from flattened query parameters.
    ///
    /// `order` carries the order id and dotted keys nest one level. The
    /// `hmac` parameter is the signature, not transaction data.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let mut obj = Map::new();

        for (key, value) in params {
            if key == "hmac" {
                continue;
            }
            let value = Value::String(value.clone());
            match key.split_once('.') {
                Some((parent, child)) => {
                    let entry = obj
                        .entry(parent.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(nested) = entry {
                        nested.insert(child.to_string(), value);
                    }
                }
                None if key == "order" => {
                    let entry = obj
                        .entry("order".to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(nested) = entry {
                        nested.insert("id".to_string(), value);
                    }
                }
                None => {
                    obj.insert(key.clone(), value);
                }
            }
        }

        TransactionCallback {
            obj: Value::Object(obj),
        }
    }

    /// Looks up a dotted path such as `source_data.pan`.
    fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.obj, |value, key| value.get(key))
    }

    /// The string form a field takes inside the signature.
    ///
    /// Booleans are `true`/`false`, numbers are decimal, null or absent is empty.
    pub fn signed_value(&self, path: &str) -> String {
        match self.lookup(path) {
            None | Some(Value::Null) => String::new(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// All signed fields concatenated in signing order.
    pub fn signing_payload(&self) -> String {
        SIGNED_FIELDS.iter().map(|f| self.signed_value(f)).collect()
    }

    fn flag(&self, path: &str) -> bool {
        match self.lookup(path) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Whether the charge went through.
    pub fn success(&self) -> bool {
        self.flag("success")
    }

    /// Still processing at the gateway (no final outcome yet).
    pub fn pending(&self) -> bool {
        self.flag("pending")
    }

    /// Gateway transaction id.
    pub fn transaction_id(&self) -> String {
        self.signed_value("id")
    }

    /// Gateway order id; `order` in the query form.
    pub fn order_id(&self) -> Option<String> {
        Some(self.signed_value("order.id")).filter(|id| !id.is_empty())
    }

    /// The booking id given to the gateway at order creation.
    pub fn merchant_order_id(&self) -> Option<String> {
        ["order.merchant_order_id", "merchant_order_id"]
            .iter()
            .map(|path| self.signed_value(path))
            .find(|id| !id.is_empty())
    }

    /// The transaction as JSON text, for the audit column.
    pub fn raw(&self) -> String {
        self.obj.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
