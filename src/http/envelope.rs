//! Response envelope and request body parsing shared by every service
//!
//! Mutating endpoints answer with
//!
//! ```json
//! { "status": "Successfully charged!", "record": { ... } }
//! { "status": "User not found", "error": { "kind": "not_found", ... }, "record": {} }
//! ```
//!
//! `record` is always present and is `{}` when there is nothing to return, which
//! is what legacy clients expect from a failed call or an empty lookup.

use super::HttpOptions;
use crate::types::{Quantity, ShopError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Body of every mutating endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub struct Envelope<T> {
    /// Human readable outcome, the `Display` of the error on failure
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ShopError>,

    #[serde(default = "none", with = "record_or_empty")]
    pub record: Option<T>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    pub fn success(status: &str, record: T) -> Self {
        Self {
            status: status.to_string(),
            error: None,
            record: Some(record),
        }
    }

    pub fn failure(error: ShopError) -> Self {
        Self {
            status: error.to_string(),
            error: Some(error),
            record: None,
        }
    }

    /// Turn a decoded envelope back into the result it was built from
    pub fn into_result(self) -> Result<Option<T>, ShopError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.record),
        }
    }
}

/// A record, or `{}` when there is none
///
/// Lookup endpoints answer with the bare record instead of an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct MaybeRecord<T>(pub Option<T>);

impl<T: Serialize> Serialize for MaybeRecord<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        record_or_empty::serialize(&self.0, serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for MaybeRecord<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        record_or_empty::deserialize(deserializer).map(MaybeRecord)
    }
}

/// Serde helper mapping `None` to `{}`
mod record_or_empty {
    use serde::de::{DeserializeOwned, Error};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub fn serialize<T, S>(record: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match record {
            Some(record) => record.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: DeserializeOwned,
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            _ => T::deserialize(value).map(Some).map_err(D::Error::custom),
        }
    }
}

/// HTTP status for a failed call under the given options
pub fn error_status(options: &HttpOptions, error: &ShopError) -> StatusCode {
    if options.legacy_status {
        return StatusCode::OK;
    }
    StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Answer a mutating call with an envelope
pub fn respond<T: Serialize>(
    options: &HttpOptions,
    success: &str,
    result: Result<T, ShopError>,
) -> Response {
    match result {
        Ok(record) => (StatusCode::OK, Json(Envelope::success(success, record))).into_response(),
        Err(error) => failure(options, error),
    }
}

/// Answer a read with the bare value, or an envelope on failure
pub fn reply<T: Serialize>(options: &HttpOptions, result: Result<T, ShopError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(error) => failure(options, error),
    }
}

pub fn failure(options: &HttpOptions, error: ShopError) -> Response {
    let status = error_status(options, &error);
    (status, Json(Envelope::<Value>::failure(error))).into_response()
}

/// Decode a JSON request body into `T`
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ShopError> {
    serde_json::from_slice(body).map_err(|e| ShopError::bad_request(format!("invalid body: {e}")))
}

/// Parse a wallet amount sent as a bare JSON number
///
/// Anything that is not a JSON number, strings included, is `InvalidAmount`.
/// The sign is checked by the account service.
pub fn parse_amount(body: &[u8]) -> Result<Decimal, ShopError> {
    let raw = String::from_utf8_lossy(body).trim().to_string();
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Number(number)) => number_to_decimal(&number.to_string())
            .ok_or_else(|| ShopError::invalid_amount(&raw)),
        _ => Err(ShopError::invalid_amount(&raw)),
    }
}

/// Parse a purchase or reservation quantity
///
/// An empty body means one unit. Whole numbers written as floats (`2.0`) are
/// accepted; fractions, negatives and non-numbers are `InvalidQuantity`.
pub fn parse_quantity(body: &[u8]) -> Result<Quantity, ShopError> {
    let raw = String::from_utf8_lossy(body).trim().to_string();
    if raw.is_empty() {
        return Ok(1);
    }

    let invalid = || ShopError::invalid_quantity(&raw);
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Number(number)) => {
            let value = number_to_decimal(&number.to_string()).ok_or_else(invalid)?;
            if !value.fract().is_zero() || value < Decimal::ZERO {
                return Err(invalid());
            }
            value.to_u32().ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn number_to_decimal(text: &str) -> Option<Decimal> {
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceEntry;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_failure_envelope_has_empty_record() {
        let envelope: Envelope<PriceEntry> = Envelope::failure(ShopError::user_not_found("ghost"));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({
                "status": "User not found",
                "error": { "kind": "not_found", "entity": "user", "key": "ghost" },
                "record": {}
            })
        );
    }

    #[test]
    fn test_success_envelope_omits_error() {
        let entry = PriceEntry {
            name: "tuna".to_string(),
            price: Decimal::new(30, 1),
        };
        let value = serde_json::to_value(Envelope::success("Purchase successful", entry)).unwrap();

        assert_eq!(
            value,
            json!({ "status": "Purchase successful", "record": { "name": "tuna", "price": 3.0 } })
        );
    }

    #[test]
    fn test_envelope_decodes_back_into_result() {
        let text = r#"{"status":"kinder is out of stock","error":{"kind":"out_of_stock","name":"kinder"},"record":{}}"#;
        let envelope: Envelope<PriceEntry> = serde_json::from_str(text).unwrap();
        assert_eq!(envelope.into_result(), Err(ShopError::out_of_stock("kinder")));

        let text = r#"{"status":"ok","record":{"name":"tuna","price":3}}"#;
        let envelope: Envelope<PriceEntry> = serde_json::from_str(text).unwrap();
        assert_eq!(envelope.into_result().unwrap().unwrap().price, Decimal::new(3, 0));
    }

    #[test]
    fn test_maybe_record_empty_object() {
        assert_eq!(serde_json::to_string(&MaybeRecord::<PriceEntry>(None)).unwrap(), "{}");
        let decoded: MaybeRecord<PriceEntry> = serde_json::from_str("{}").unwrap();
        assert_eq!(decoded, MaybeRecord(None));
    }

    #[rstest]
    #[case::strict(false, 404)]
    #[case::legacy(true, 200)]
    fn test_error_status(#[case] legacy_status: bool, #[case] expected: u16) {
        let options = HttpOptions { legacy_status };
        let status = error_status(&options, &ShopError::good_not_found("persil"));
        assert_eq!(status.as_u16(), expected);
    }

    #[rstest]
    #[case::integer("10", Decimal::new(10, 0))]
    #[case::float("2.5", Decimal::new(25, 1))]
    #[case::padded(" 7 \n", Decimal::new(7, 0))]
    #[case::negative("-3", Decimal::new(-3, 0))]
    #[case::scientific("1e2", Decimal::new(100, 0))]
    fn test_parse_amount(#[case] body: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(body.as_bytes()).unwrap(), expected);
    }

    #[rstest]
    #[case::string("\"10\"")]
    #[case::word("ten")]
    #[case::empty("")]
    #[case::object("{\"amount\": 10}")]
    fn test_parse_amount_rejects_non_numbers(#[case] body: &str) {
        assert!(matches!(
            parse_amount(body.as_bytes()),
            Err(ShopError::InvalidAmount { .. })
        ));
    }

    #[rstest]
    #[case::empty("", 1)]
    #[case::integer("3", 3)]
    #[case::whole_float("2.0", 2)]
    #[case::zero("0", 0)]
    fn test_parse_quantity(#[case] body: &str, #[case] expected: Quantity) {
        assert_eq!(parse_quantity(body.as_bytes()).unwrap(), expected);
    }

    #[rstest]
    #[case::fraction("1.5")]
    #[case::negative("-1")]
    #[case::string("\"two\"")]
    #[case::too_big("99999999999")]
    fn test_parse_quantity_rejects(#[case] body: &str) {
        assert!(matches!(
            parse_quantity(body.as_bytes()),
            Err(ShopError::InvalidQuantity { .. })
        ));
    }
}
