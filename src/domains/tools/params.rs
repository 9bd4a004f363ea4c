//! Parameter bundle normalization.
//!
//! Tool calls arrive with their arguments in several encodings depending on
//! the client and transport:
//!
//! - a flat JSON mapping: `{"name": "dc1", "confirm": true}`
//! - a JSON-encoded string: `"{\"name\": \"dc1\"}"`
//! - a query string: `"name=dc1&confirm=true"`
//! - any of the above wrapped in a single `arguments` / `params` /
//!   `parameters` / `kwargs` / `input` key
//!
//! [`normalize`] turns every one of them into the same canonical keyword
//! mapping, driven by the tool's declared [`ParamSpec`] list: values are
//! coerced to their declared kind, defaults applied, unknown keys dropped and
//! all missing required parameters reported at once.

use rmcp::model::JsonObject;
use serde_json::Value;
use tracing::debug;

use super::descriptor::{ParamKind, ParamSpec};
use super::error::{ToolError, ToolResult};

const WRAPPER_KEYS: &[&str] = &["arguments", "params", "parameters", "kwargs", "input"];
const MAX_DEPTH: usize = 4;

/// How a bundle was encoded, for logging.
pub fn encoding_of(bundle: &Value) -> &'static str {
    match bundle {
        Value::Null => "empty",
        Value::Object(map) if map.len() == 1 && map.keys().any(|k| WRAPPER_KEYS.contains(&k.as_str())) => {
            "wrapped"
        }
        Value::Object(_) => "mapping",
        Value::String(s) if s.trim_start().starts_with(['{', '"']) => "json-string",
        Value::String(s) if s.trim().is_empty() => "empty",
        Value::String(_) => "query-string",
        _ => "invalid",
    }
}

/// Decode `bundle` and bind it to `params`.
pub fn normalize(tool: &str, params: &[ParamSpec], bundle: Value) -> ToolResult<JsonObject> {
    let raw = decode(bundle, params, 0)?;
    bind(tool, params, raw)
}

/// Turn any supported encoding into a raw (uncoerced) mapping.
fn decode(bundle: Value, params: &[ParamSpec], depth: usize) -> ToolResult<JsonObject> {
    if depth > MAX_DEPTH {
        return Err(ToolError::validation("parameter bundle is nested too deeply"));
    }

    match bundle {
        Value::Null => Ok(JsonObject::new()),
        Value::Object(map) => {
            if let Some(inner) = unwrap_single_wrapper(&map, params) {
                match decode(inner.clone(), params, depth + 1) {
                    Ok(decoded) => return Ok(decoded),
                    // A plain string under an undeclared key is just an unknown parameter.
                    Err(e) if inner.is_string() => {
                        debug!(error = %e, "Wrapper value is not a parameter bundle, keeping it as a key");
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(map)
        }
        Value::String(s) => decode_str(&s, params, depth),
        other => Err(ToolError::validation(format!(
            "expected an object or an encoded string, got {}",
            type_name(&other)
        ))),
    }
}

fn unwrap_single_wrapper<'a>(map: &'a JsonObject, params: &[ParamSpec]) -> Option<&'a Value> {
    if map.len() != 1 {
        return None;
    }
    let (key, inner) = map.iter().next()?;
    let is_wrapper = WRAPPER_KEYS.contains(&key.as_str()) && !params.iter().any(|p| p.name == key);
    let decodable = matches!(inner, Value::Object(_) | Value::String(_) | Value::Null);
    (is_wrapper && decodable).then_some(inner)
}

fn decode_str(s: &str, params: &[ParamSpec], depth: usize) -> ToolResult<JsonObject> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(JsonObject::new());
    }

    // JSON object, or a JSON string holding another encoding.
    if trimmed.starts_with('{') || trimmed.starts_with('"') {
        let parsed: Value = serde_json::from_str(trimmed)
            .map_err(|e| ToolError::validation(format!("invalid JSON parameter bundle: {e}")))?;
        return decode(parsed, params, depth + 1);
    }

    let query = trimmed.strip_prefix('?').unwrap_or(trimmed);
    if !query.contains('=') {
        return Err(ToolError::validation(
            "parameter string is neither a JSON object nor key=value pairs",
        ));
    }

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|e| ToolError::validation(format!("invalid query-string parameter bundle: {e}")))?;

    let mut map = JsonObject::new();
    for (key, value) in pairs {
        match map.remove(&key) {
            None => {
                map.insert(key, Value::String(value));
            }
            Some(Value::Array(mut values)) => {
                values.push(Value::String(value));
                map.insert(key, Value::Array(values));
            }
            Some(previous) => {
                map.insert(key, Value::Array(vec![previous, Value::String(value)]));
            }
        }
    }

    decode(Value::Object(map), params, depth + 1)
}

/// Coerce, default and check a raw mapping against the signature.
fn bind(tool: &str, params: &[ParamSpec], mut raw: JsonObject) -> ToolResult<JsonObject> {
    let mut bound = JsonObject::new();
    let mut missing = Vec::new();

    for spec in params {
        let value = raw.remove(spec.name).filter(|v| !is_blank(v));
        match value {
            Some(value) => {
                bound.insert(spec.name.to_string(), coerce(spec, value)?);
            }
            None => match spec.default {
                Some(default) => {
                    bound.insert(spec.name.to_string(), default.to_value());
                }
                None if spec.required => missing.push(spec.name.to_string()),
                None => {}
            },
        }
    }

    if !raw.is_empty() {
        let ignored: Vec<&String> = raw.keys().collect();
        debug!(tool, ?ignored, "Dropping unknown parameters");
    }

    if !missing.is_empty() {
        return Err(ToolError::MissingParameters {
            tool: tool.to_string(),
            missing,
        });
    }

    Ok(bound)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn coerce(spec: &ParamSpec, value: Value) -> ToolResult<Value> {
    let invalid = |expected: &str, got: &Value| {
        ToolError::validation(format!(
            "parameter '{}' expects {}, got {}",
            spec.name,
            expected,
            describe(got)
        ))
    };

    match spec.kind {
        ParamKind::String => match value {
            Value::String(s) => Ok(Value::String(s.trim().to_string())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(invalid("a string", &other)),
        },

        ParamKind::Integer => match &value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| is_whole_i64(*f)).map(|f| f as i64))
                .map(Value::from)
                .ok_or_else(|| invalid("an integer", &value)),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid("an integer", &value)),
            _ => Err(invalid("an integer", &value)),
        },

        ParamKind::Boolean => match &value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(invalid("a boolean", &value)),
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Ok(Value::Bool(true)),
                Some(0) => Ok(Value::Bool(false)),
                _ => Err(invalid("a boolean", &value)),
            },
            _ => Err(invalid("a boolean", &value)),
        },

        ParamKind::StringList => match value {
            Value::Array(items) => items
                .into_iter()
                .filter(|v| !is_blank(v))
                .map(|item| match item {
                    Value::String(s) => Ok(Value::String(s.trim().to_string())),
                    Value::Number(n) => Ok(Value::String(n.to_string())),
                    other => Err(invalid("a list of strings", &other)),
                })
                .collect::<ToolResult<Vec<_>>>()
                .map(Value::Array),
            Value::String(s) if s.trim_start().starts_with('[') => {
                let parsed: Value = serde_json::from_str(s.trim())
                    .map_err(|_| invalid("a list of strings", &Value::String(s.clone())))?;
                coerce(spec, parsed)
            }
            Value::String(s) => Ok(Value::Array(
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            )),
            other => Err(invalid("a list of strings", &other)),
        },

        ParamKind::Reference => match &value {
            Value::Number(n) => n
                .as_i64()
                .map(Value::from)
                .ok_or_else(|| invalid("an object ID or name", &value)),
            Value::String(s) => {
                let s = s.trim();
                Ok(match s.parse::<i64>() {
                    Ok(id) if s.chars().all(|c| c.is_ascii_digit()) => Value::from(id),
                    _ => Value::String(s.to_string()),
                })
            }
            Value::Object(map) => map
                .get("id")
                .cloned()
                .map(|id| coerce(spec, id))
                .unwrap_or_else(|| Err(invalid("an object ID or name", &value))),
            _ => Err(invalid("an object ID or name", &value)),
        },

        ParamKind::Json => match value {
            Value::String(s) if s.trim_start().starts_with(['{', '[']) => serde_json::from_str(s.trim())
                .map_err(|e| ToolError::validation(format!("parameter '{}' is not valid JSON: {e}", spec.name))),
            other => Ok(other),
        },
    }
}

/// Whether `f` is a whole number that fits in an `i64` without saturating.
fn is_whole_i64(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        Value::Array(_) | Value::Object(_) => type_name(value).to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::descriptor::ParamDefault;
    use serde_json::json;

    const NONE: &[ParamSpec] = &[];

    const ONE: &[ParamSpec] = &[ParamSpec::required("site", ParamKind::Reference)];

    const MANY: &[ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::required("vid", ParamKind::Integer),
        ParamSpec::optional("site", ParamKind::Reference),
        ParamSpec::with_default("status", ParamKind::String, ParamDefault::Str("active")),
        ParamSpec::optional("tags", ParamKind::StringList),
        ParamSpec::CONFIRM,
    ];

    /// The same logical call in every supported encoding.
    fn encodings(flat: Value, query: &str) -> Vec<(&'static str, Value)> {
        let json_string = Value::String(flat.to_string());
        vec![
            ("flat mapping", flat.clone()),
            ("json string", json_string.clone()),
            ("double-encoded json", Value::String(json_string.to_string())),
            ("query string", Value::String(query.to_string())),
            ("query string with ?", Value::String(format!("?{query}"))),
            ("wrapped mapping", json!({"arguments": flat.clone()})),
            ("wrapped json string", json!({"kwargs": json_string})),
            ("wrapped query string", json!({"params": query})),
            ("doubly wrapped", json!({"input": {"parameters": flat}})),
        ]
    }

    fn assert_all_equal(tool: &str, params: &[ParamSpec], cases: Vec<(&str, Value)>, expected: &Value) {
        for (label, bundle) in cases {
            let kwargs = normalize(tool, params, bundle)
                .unwrap_or_else(|e| panic!("{label}: {e}"));
            assert_eq!(&Value::Object(kwargs), expected, "{label}");
        }
    }

    #[test]
    fn test_zero_parameters_all_encodings() {
        let mut cases = encodings(json!({}), "unused=1");
        cases.push(("null", Value::Null));
        cases.push(("empty string", json!("")));
        cases.push(("extra keys", json!({"foo": 1, "bar": "x"})));
        assert_all_equal("health", NONE, cases, &json!({}));
    }

    #[test]
    fn test_one_parameter_all_encodings() {
        assert_all_equal(
            "get_site",
            ONE,
            encodings(json!({"site": "dc1"}), "site=dc1"),
            &json!({"site": "dc1"}),
        );
        assert_all_equal(
            "get_site",
            ONE,
            encodings(json!({"site": 3}), "site=3"),
            &json!({"site": 3}),
        );
    }

    #[test]
    fn test_many_parameters_all_encodings() {
        let flat = json!({
            "name": "mgmt",
            "vid": 10,
            "site": "dc1",
            "tags": ["core", "oob"],
            "confirm": true
        });
        let query = "name=mgmt&vid=10&site=dc1&tags=core&tags=oob&confirm=true";
        let expected = json!({
            "name": "mgmt",
            "vid": 10,
            "site": "dc1",
            "status": "active",
            "tags": ["core", "oob"],
            "confirm": true
        });
        assert_all_equal("create_vlan", MANY, encodings(flat, query), &expected);
    }

    #[test]
    fn test_many_parameters_with_defaults_only() {
        let expected = json!({"name": "mgmt", "vid": 10, "status": "active", "confirm": false});
        assert_all_equal(
            "create_vlan",
            MANY,
            encodings(json!({"name": "mgmt", "vid": 10}), "name=mgmt&vid=10"),
            &expected,
        );
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let kwargs = normalize(
            "get_site",
            ONE,
            json!({"site": "dc1", "verbose": true, "trace_id": "abc"}),
        )
        .unwrap();
        assert_eq!(Value::Object(kwargs), json!({"site": "dc1"}));
    }

    #[test]
    fn test_undecodable_wrapper_value_is_an_unknown_key() {
        let kwargs = normalize("health", NONE, json!({"input": "hello"})).unwrap();
        assert_eq!(Value::Object(kwargs), json!({}));

        const LIMIT: &[ParamSpec] =
            &[ParamSpec::with_default("limit", ParamKind::Integer, ParamDefault::Int(50))];
        let kwargs = normalize("list_tenants", LIMIT, json!({"params": "verbose"})).unwrap();
        assert_eq!(Value::Object(kwargs), json!({"limit": 50}));

        let kwargs = normalize("get_site", ONE, json!({"arguments": "{not json"}));
        assert!(matches!(kwargs, Err(ToolError::MissingParameters { .. })));
    }

    #[test]
    fn test_missing_required_is_typed_and_complete() {
        for bundle in [json!({}), json!("confirm=true"), json!({"arguments": "{}"}), Value::Null] {
            let err = normalize("create_vlan", MANY, bundle).unwrap_err();
            match err {
                ToolError::MissingParameters { tool, missing } => {
                    assert_eq!(tool, "create_vlan");
                    assert_eq!(missing, vec!["name", "vid"]);
                }
                other => panic!("expected MissingParameters, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let err = normalize("get_site", ONE, json!({"site": "  "})).unwrap_err();
        assert!(matches!(err, ToolError::MissingParameters { .. }));

        let err = normalize("get_site", ONE, json!("site=")).unwrap_err();
        assert!(matches!(err, ToolError::MissingParameters { .. }));
    }

    #[test]
    fn test_wrapper_key_that_is_a_parameter_is_not_unwrapped() {
        const WITH_INPUT: &[ParamSpec] = &[ParamSpec::required("input", ParamKind::String)];
        let kwargs = normalize("echo", WITH_INPUT, json!({"input": "a=b"})).unwrap();
        assert_eq!(Value::Object(kwargs), json!({"input": "a=b"}));
    }

    #[test]
    fn test_type_errors_are_validation() {
        let err = normalize("create_vlan", MANY, json!({"name": "x", "vid": "ten"})).unwrap_err();
        assert_eq!(err.tag(), "validation");
        assert!(err.to_string().contains("'vid'"));

        let err = normalize("create_vlan", MANY, json!({"name": "x", "vid": 1, "confirm": "maybe"}))
            .unwrap_err();
        assert!(err.to_string().contains("'confirm'"));

        let err = normalize("create_vlan", MANY, json!({"name": ["a", "b"], "vid": 1})).unwrap_err();
        assert_eq!(err.tag(), "validation");
    }

    #[test]
    fn test_malformed_bundles() {
        assert!(normalize("t", ONE, json!("{not json")).is_err());
        assert!(normalize("t", ONE, json!("just words")).is_err());
        assert!(normalize("t", ONE, json!(42)).is_err());
        assert!(normalize("t", ONE, json!([1, 2])).is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let mut bundle = json!({"site": "dc1"});
        for _ in 0..10 {
            bundle = json!({"arguments": bundle});
        }
        let err = normalize("t", ONE, bundle).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"));
    }

    #[test]
    fn test_coercions() {
        const SPECS: &[ParamSpec] = &[
            ParamSpec::optional("flag", ParamKind::Boolean),
            ParamSpec::optional("count", ParamKind::Integer),
            ParamSpec::optional("label", ParamKind::String),
            ParamSpec::optional("tags", ParamKind::StringList),
            ParamSpec::optional("site", ParamKind::Reference),
            ParamSpec::optional("custom_fields", ParamKind::Json),
        ];
        let kwargs = normalize(
            "t",
            SPECS,
            json!({
                "flag": "YES",
                "count": 5.0,
                "label": 1234,
                "tags": "[\"a\", \" b \"]",
                "site": {"id": 4, "name": "DC 4"},
                "custom_fields": "{\"rack_units\": 2}"
            }),
        )
        .unwrap();
        assert_eq!(
            Value::Object(kwargs),
            json!({
                "flag": true,
                "count": 5,
                "label": "1234",
                "tags": ["a", "b"],
                "site": 4,
                "custom_fields": {"rack_units": 2}
            })
        );

        let kwargs = normalize("t", SPECS, json!("tags=a,%20b,,c&flag=0")).unwrap();
        assert_eq!(Value::Object(kwargs), json!({"flag": false, "tags": ["a", "b", "c"]}));
    }

    #[test]
    fn test_out_of_range_integers_are_rejected() {
        const COUNT: &[ParamSpec] = &[ParamSpec::optional("count", ParamKind::Integer)];
        for bundle in [json!({"count": 1e30}), json!({"count": -1e30}), json!({"count": 18446744073709551615u64})] {
            let err = normalize("t", COUNT, bundle).unwrap_err();
            assert_eq!(err.tag(), "validation");
            assert!(err.to_string().contains("'count'"));
        }
        let kwargs = normalize("t", COUNT, json!({"count": -3.0})).unwrap();
        assert_eq!(Value::Object(kwargs), json!({"count": -3}));
    }

    #[test]
    fn test_encoding_labels() {
        assert_eq!(encoding_of(&Value::Null), "empty");
        assert_eq!(encoding_of(&json!({"a": 1})), "mapping");
        assert_eq!(encoding_of(&json!({"arguments": {}})), "wrapped");
        assert_eq!(encoding_of(&json!("{\"a\":1}")), "json-string");
        assert_eq!(encoding_of(&json!("a=1")), "query-string");
        assert_eq!(encoding_of(&json!(3)), "invalid");
    }
}
