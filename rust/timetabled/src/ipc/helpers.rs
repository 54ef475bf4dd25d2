use crate::ipc::error::HandlerErr;
use crate::ipc::types::Request;
use crate::model::Day;
use crate::periods;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

pub fn required_str(req: &Request, key: &str) -> Result<String, HandlerErr> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn opt_str(req: &Request, key: &str) -> Result<Option<String>, HandlerErr> {
    match req.params.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => {
            let s = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params(format!("{} must be string or null", key)))?
                .trim()
                .to_string();
            Ok(Some(s).filter(|s| !s.is_empty()))
        }
    }
}

pub fn required_u32(req: &Request, key: &str) -> Result<u32, HandlerErr> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing or invalid {}", key)))
}

pub fn parse_day(req: &Request) -> Result<Day, HandlerErr> {
    let raw = required_str(req, "day")?;
    raw.parse::<Day>().map_err(HandlerErr::bad_params)
}

/// Slot key as `HH:MM`. Unknown rows are accepted here; the grid decides
/// what to do with them.
pub fn parse_time(req: &Request) -> Result<String, HandlerErr> {
    let raw = required_str(req, "time")?;
    periods::normalize_time(&raw).ok_or_else(|| {
        HandlerErr::bad_params("time must be HH:MM").with_details(serde_json::json!({ "time": raw }))
    })
}

/// Deserializes the whole params object (or one key of it) into `T`.
/// A missing or null value yields `T::default()`.
pub fn parse_params<T: DeserializeOwned + Default>(
    req: &Request,
    key: Option<&str>,
) -> Result<T, HandlerErr> {
    let raw = match key {
        Some(k) => req.params.get(k).cloned().unwrap_or(JsonValue::Null),
        None => req.params.clone(),
    };
    if raw.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(raw).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

/// Delete is two-step: the caller must echo `confirm: true`.
pub fn confirmed(req: &Request) -> bool {
    req.params
        .get("confirm")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

pub fn patch_object(req: &Request) -> Result<&serde_json::Map<String, JsonValue>, HandlerErr> {
    req.params
        .get("patch")
        .and_then(|v| v.as_object())
        .ok_or_else(|| HandlerErr::bad_params("missing patch"))
}

/// Reads one string field of a patch. `Ok(None)`: key absent, leave the
/// field alone. `Ok(Some(None))`: explicit null, clear it.
pub fn patch_str(
    patch: &serde_json::Map<String, JsonValue>,
    key: &str,
) -> Result<Option<Option<String>>, HandlerErr> {
    match patch.get(key) {
        None => Ok(None),
        Some(JsonValue::Null) => Ok(Some(None)),
        Some(v) => v
            .as_str()
            .map(|s| Some(Some(s.to_string())))
            .ok_or_else(|| HandlerErr::bad_params(format!("patch.{} must be string or null", key))),
    }
}
