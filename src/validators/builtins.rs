//! NXDL built-in types
//!
//! Predicates deciding whether a field satisfies one of the logical types of
//! [`NxType`]. Everything except `NX_DATE_TIME` is decided by the runtime
//! storage type; date-times are decided by parsing the stored text.

use crate::tree::{FieldNode, Value};
use crate::validators::models::NxType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive date-time layouts accepted besides RFC 3339
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts that RFC 3339 rejects
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Whether `text` is an ISO 8601 date or date-time
pub fn is_valid_iso8601(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    DateTime::parse_from_rfc3339(text).is_ok()
        || OFFSET_FORMATS
            .iter()
            .any(|f| DateTime::parse_from_str(text, f).is_ok())
        || DATE_TIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(text, f).is_ok())
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

/// Whether `field` satisfies `nx_type`
pub fn matches_type(nx_type: NxType, field: &FieldNode) -> bool {
    let dtype = field.dtype;
    match nx_type {
        NxType::DateTime => {
            let scalars = field.value.scalars();
            !scalars.is_empty()
                && scalars.iter().all(|v| match v {
                    Value::Text(s) => is_valid_iso8601(s),
                    _ => false,
                })
        }
        NxType::Int => dtype.is_integer(),
        NxType::Float => dtype.is_float(),
        NxType::Boolean => dtype.is_bool(),
        NxType::Char => dtype.is_char(),
        NxType::CharOrNumber => dtype.is_char() || dtype.is_number(),
        NxType::Complex => dtype.is_complex(),
        NxType::Number => dtype.is_number(),
        // Every integer type can hold a positive value
        NxType::PosInt => dtype.is_integer(),
        NxType::UInt => dtype.is_unsigned(),
    }
}

/// Text used in type check messages
pub fn type_label(nx_type: NxType) -> String {
    match nx_type {
        NxType::Complex => format!("{} value", nx_type),
        other => other.to_string(),
    }
}
