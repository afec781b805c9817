use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

// ============================================================================
// Lenient numeric input / JS-compatible numeric output
// ============================================================================
//
// Patches arrive from forms and query strings, so numbers may come as JSON
// numbers or as numeric strings. Anything that does not parse is treated as
// absent rather than rejected.
//
// On the way out, integral floats are written without a fractional part so
// locally produced bodies match the remote backend's JSON byte for byte
// (`150` rather than `150.0`).
//
// ============================================================================

/// Coerce a JSON value into a finite f64, if it holds one
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Coerce a JSON value into an integer. Fractional input is truncated.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
        }
        _ => None,
    }
}

/// `deserialize_with` helper for optional floats
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_f64))
}

/// `deserialize_with` helper for optional integers
pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_i64))
}

/// `serialize_with` helper writing integral floats as integers
pub fn js_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
