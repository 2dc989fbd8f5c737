//! # OpenAPI to JSON Schema
//!
//! OpenAPI 3.0 schemas are close to Draft 7 but not equal to it. The
//! differences that change validation results are rewritten here:
//!
//! - `nullable: true` becomes a `"null"` member of `type` (and of `enum`);
//!   without a `type` (next to `allOf`, `oneOf`, ...) the schema is wrapped
//!   as `anyOf: [<schema>, {type: null}]`
//! - boolean `exclusiveMinimum`/`exclusiveMaximum` become numeric bounds
//!
//! OpenAPI-only annotations (`discriminator`, `xml`, `example`, ...) are
//! unknown keywords to JSON Schema and are ignored by the validator.
//!
//! 3.1 schemas are already JSON Schema 2020-12 and are left untouched.

use serde_json::{json, Map, Value};

/// Keywords whose values are data, not subschemas.
const DATA_KEYWORDS: [&str; 5] = ["enum", "const", "default", "example", "examples"];

/// Rewrite an OpenAPI 3.0 schema into Draft 7 form.
pub fn openapi30_to_draft7(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            rewrite_nullable(map);
            rewrite_exclusive_bound(map, "exclusiveMinimum", "minimum");
            rewrite_exclusive_bound(map, "exclusiveMaximum", "maximum");
            for (key, value) in map.iter_mut() {
                if !DATA_KEYWORDS.contains(&key.as_str()) {
                    openapi30_to_draft7(value);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(openapi30_to_draft7),
        _ => {}
    }
}

fn rewrite_nullable(map: &mut Map<String, Value>) {
    match map.get("nullable") {
        Some(Value::Bool(true)) => {
            map.remove("nullable");
        }
        Some(Value::Bool(false)) => {
            map.remove("nullable");
            return;
        }
        _ => return,
    }

    if !map.contains_key("type") {
        let schema = std::mem::take(map);
        map.insert(
            "anyOf".into(),
            Value::Array(vec![Value::Object(schema), json!({"type": "null"})]),
        );
        return;
    }

    let null = Value::String("null".into());
    if let Some(kind) = map.get_mut("type") {
        match kind {
            Value::String(single) => {
                let single = std::mem::take(single);
                *kind = Value::Array(vec![Value::String(single), null]);
            }
            Value::Array(types) if !types.contains(&null) => types.push(null),
            _ => {}
        }
    }
    if let Some(Value::Array(values)) = map.get_mut("enum") {
        if !values.contains(&Value::Null) {
            values.push(Value::Null);
        }
    }
}

fn rewrite_exclusive_bound(map: &mut Map<String, Value>, exclusive: &str, inclusive: &str) {
    match map.get(exclusive) {
        Some(Value::Bool(true)) => {
            map.remove(exclusive);
            if let Some(bound) = map.remove(inclusive) {
                map.insert(exclusive.to_string(), bound);
            }
        }
        Some(Value::Bool(false)) => {
            map.remove(exclusive);
        }
        _ => {}
    }
}

/// Convert an OpenAPI path template to routing notation: `{id}` -> `:id`.
///
/// Already normalised templates pass through unchanged.
#[must_use]
pub fn normalize_template(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push(':');
        out.push_str(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}
