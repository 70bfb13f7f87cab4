//! JSON interchange for decycled graphs.
//!
//! A decycled tree is acyclic, so it has a plain JSON form: reference tokens
//! are ordinary `{"$ref": "..."}` objects. Values without a JSON
//! representation follow the host's `JSON.stringify` rules where one exists
//! (`undefined` properties are dropped, `undefined` elements become `null`,
//! non-finite numbers become `null`) and are reported otherwise.

use serde_json::{Map as JsonMap, Number as JsonNumber, Value as Json};
use tsr_common::DepthCounter;

use crate::decycle::CodecOptions;
use crate::error::CycleError;
use crate::value::{Primitive, Value};

/// Convert an acyclic value to JSON.
///
/// A graph that still contains cycles fails with
/// [`CycleError::DepthExceeded`]; run [`crate::decycle`] first.
pub fn to_json<X>(value: &Value<X>) -> Result<Json, CycleError> {
    to_json_with(value, CodecOptions::default())
}

/// [`to_json`] with explicit limits.
pub fn to_json_with<X>(value: &Value<X>, options: CodecOptions) -> Result<Json, CycleError> {
    let mut depth = DepthCounter::new(options.max_depth);
    let json = to_json_inner(value, &mut depth)?;
    Ok(json.unwrap_or(Json::Null))
}

/// `Ok(None)` means "undefined": omitted from objects, `null` in arrays.
fn to_json_inner<X>(value: &Value<X>, depth: &mut DepthCounter) -> Result<Option<Json>, CycleError> {
    let json = match value {
        Value::Undefined => return Ok(None),
        Value::Null => Json::Null,
        Value::Bool(b) | Value::Boxed(Primitive::Bool(b)) => Json::Bool(*b),
        Value::Number(n) | Value::Boxed(Primitive::Number(n)) | Value::Date(n) => number(*n),
        Value::String(s) | Value::Boxed(Primitive::String(s)) => Json::String(s.clone()),
        Value::BigInt(_) => return Err(CycleError::NotSerializable { what: "a big integer" }),
        Value::RegExp { .. } => Json::Object(JsonMap::new()),
        Value::Exempt(inner) => return to_json_inner(inner, depth),
        Value::Extern(_) => {
            return Err(CycleError::NotSerializable {
                what: "an opaque expression",
            });
        }
        Value::Array(_) | Value::Object(_) | Value::Map(_) | Value::Set(_) => {
            if !depth.enter() {
                return Err(CycleError::DepthExceeded {
                    limit: depth.max_depth(),
                });
            }
            let result = container_to_json(value, depth);
            depth.leave();
            result?
        }
    };
    Ok(Some(json))
}

fn container_to_json<X>(value: &Value<X>, depth: &mut DepthCounter) -> Result<Json, CycleError> {
    match value {
        Value::Array(items) | Value::Set(items) => {
            let items = items.borrow();
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(to_json_inner(item, depth)?.unwrap_or(Json::Null));
            }
            Ok(Json::Array(out))
        }
        Value::Object(props) => {
            let mut out = JsonMap::new();
            for (key, item) in props.borrow().iter() {
                if let Some(json) = to_json_inner(item, depth)? {
                    out.insert(key.clone(), json);
                }
            }
            Ok(Json::Object(out))
        }
        Value::Map(entries) => {
            let mut out = JsonMap::new();
            for (key, item) in entries.borrow().iter() {
                if let Some(json) = to_json_inner(item, depth)? {
                    out.insert(key.property_key(), json);
                }
            }
            Ok(Json::Object(out))
        }
        _ => Ok(Json::Null),
    }
}

fn number(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        // Integral values serialize without a trailing `.0`.
        return Json::Number(JsonNumber::from(n as i64));
    }
    JsonNumber::from_f64(n).map_or(Json::Null, Json::Number)
}

/// Convert JSON into a fresh value tree. Reference tokens stay tokens until
/// [`crate::retrocycle`] resolves them.
pub fn from_json<X>(json: &Json) -> Value<X> {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::array(items.iter().map(from_json::<X>).collect()),
        Json::Object(props) => Value::object(props.iter().map(|(k, v)| (k.clone(), from_json::<X>(v)))),
    }
}
