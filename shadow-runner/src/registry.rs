//! Compiled-in registry of shadow module entry points.
//!
//! Modules are resolved by id against this fixed table rather than
//! loaded dynamically by file path. Every entry point has the same
//! contract: a structured input mapping in, a structured output value
//! out. The verified file in the artifact index remains the unit of
//! trust; the id recorded on its entry selects the implementation.

use serde_json::{json, Map, Value};

/// Signature every shadow module entry point implements.
pub type ModuleFn = fn(&Map<String, Value>) -> Result<Value, ModuleError>;

/// Errors a module entry point may raise. Escalated, never retried.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ModuleError {
    /// An input field was missing or had the wrong shape.
    #[error("invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
}

/// Resolve a module id to its entry point.
#[must_use]
pub fn lookup(module_id: &str) -> Option<ModuleFn> {
    match module_id {
        "compute_aabb" => Some(compute_aabb),
        "sleep_ms" => Some(sleep_ms),
        _ => None,
    }
}

/// Ids of all registered modules.
#[must_use]
pub fn module_ids() -> &'static [&'static str] {
    &["compute_aabb", "sleep_ms"]
}

/// Axis-aligned bounding box of a point cloud.
///
/// `inputs.points` is a list of `[x, y, z]` triples. An empty or absent
/// list yields `{"bbox": null}`.
fn compute_aabb(inputs: &Map<String, Value>) -> Result<Value, ModuleError> {
    let points = match inputs.get("points") {
        None | Some(Value::Null) => return Ok(json!({ "bbox": null })),
        Some(Value::Array(points)) if points.is_empty() => return Ok(json!({ "bbox": null })),
        Some(Value::Array(points)) => points,
        Some(_) => {
            return Err(ModuleError::InvalidInput {
                field: "points".to_owned(),
                reason: "expected an array of [x, y, z] points".to_owned(),
            })
        }
    };

    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for (i, point) in points.iter().enumerate() {
        let coords = point.as_array().ok_or_else(|| ModuleError::InvalidInput {
            field: format!("points[{i}]"),
            reason: "expected an [x, y, z] array".to_owned(),
        })?;
        if coords.len() < 3 {
            return Err(ModuleError::InvalidInput {
                field: format!("points[{i}]"),
                reason: format!("expected 3 coordinates, got {}", coords.len()),
            });
        }
        for axis in 0..3 {
            let value = coords[axis].as_f64().ok_or_else(|| ModuleError::InvalidInput {
                field: format!("points[{i}][{axis}]"),
                reason: "expected a number".to_owned(),
            })?;
            min[axis] = min[axis].min(value);
            max[axis] = max[axis].max(value);
        }
    }

    Ok(json!({ "bbox": { "min": min.to_vec(), "max": max.to_vec() } }))
}

/// Block for `inputs.duration_ms` milliseconds, then report how long was
/// slept. Exists to exercise the supervisor's timeout path end to end.
fn sleep_ms(inputs: &Map<String, Value>) -> Result<Value, ModuleError> {
    let millis = match inputs.get("duration_ms") {
        Some(value) => value.as_u64().ok_or_else(|| ModuleError::InvalidInput {
            field: "duration_ms".to_owned(),
            reason: "expected a non-negative integer".to_owned(),
        })?,
        None => {
            return Err(ModuleError::InvalidInput {
                field: "duration_ms".to_owned(),
                reason: "missing".to_owned(),
            })
        }
    };
    std::thread::sleep(std::time::Duration::from_millis(millis));
    Ok(json!({ "slept_ms": millis }))
}
