//! OpenAPI 3.1 export of the HTTP surface, generated from the tool registry.

use serde_json::{Map, Value, json};

use crate::domains::tools::{ToolDescriptor, ToolRegistry};

const SCHEMA_REF_PREFIX: &str = "#/$defs/";
const COMPONENT_REF_PREFIX: &str = "#/components/schemas/";

/// Build the OpenAPI document for the REST bridge and probe endpoints.
pub fn document(registry: &ToolRegistry, title: &str, version: &str) -> Value {
    let mut paths = Map::new();
    let mut schemas = Map::new();

    schemas.insert("ToolOutput".into(), tool_output_schema());
    schemas.insert("ErrorBody".into(), error_body_schema());

    paths.insert(
        "/api/v1/tools".into(),
        json!({
            "get": {
                "operationId": "listTools",
                "summary": "List registered tools",
                "parameters": [{
                    "name": "category",
                    "in": "query",
                    "required": false,
                    "schema": {"type": "string", "enum": ["system", "dcim", "ipam", "tenancy"]}
                }],
                "responses": {
                    "200": {"description": "Tool descriptors"},
                    "400": {"description": "Unknown category"}
                }
            }
        }),
    );

    for tool in registry.descriptors() {
        let body_schema = lift_definitions(tool.input_schema.as_ref().clone(), &mut schemas);
        paths.insert(format!("/api/v1/tools/{}", tool.name), tool_path(tool, body_schema));
    }

    paths.insert("/health".into(), probe("health", "Liveness probe", &["200"]));
    paths.insert(
        "/ready".into(),
        probe("ready", "Readiness probe; checks that NetBox answers", &["200", "503"]),
    );
    paths.insert(
        "/metrics".into(),
        json!({
            "get": {
                "operationId": "metrics",
                "summary": "Prometheus metrics",
                "responses": {
                    "200": {
                        "description": "Prometheus text exposition",
                        "content": {"text/plain": {"schema": {"type": "string"}}}
                    }
                }
            }
        }),
    );

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": title,
            "version": version,
            "description": "NetBox operations exposed as tools. Write tools only change NetBox when called with confirm=true."
        },
        "paths": paths,
        "components": {"schemas": schemas}
    })
}

fn tool_path(tool: &ToolDescriptor, body_schema: Value) -> Value {
    let mut responses = Map::new();
    responses.insert("200".into(), output_response("Tool result"));
    responses.insert("400".into(), output_response("Invalid or missing parameters"));
    responses.insert("404".into(), output_response("Unknown tool or object not found"));
    if tool.mutating {
        responses.insert("409".into(), output_response("Object already exists"));
    }
    responses.insert("502".into(), output_response("NetBox failed or is unreachable"));

    json!({
        "get": {
            "operationId": format!("describe_{}", tool.name),
            "tags": [tool.category],
            "summary": format!("Describe {}", tool.name),
            "responses": {"200": {"description": "Tool descriptor"}}
        },
        "post": {
            "operationId": tool.name,
            "tags": [tool.category],
            "summary": tool.description,
            "x-mutating": tool.mutating,
            "requestBody": {
                "required": false,
                "content": {
                    "application/json": {"schema": body_schema},
                    "application/x-www-form-urlencoded": {"schema": {"type": "object"}}
                }
            },
            "responses": responses
        }
    })
}

fn output_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {"schema": {"$ref": format!("{COMPONENT_REF_PREFIX}ToolOutput")}}
        }
    })
}

fn probe(name: &str, summary: &str, statuses: &[&str]) -> Value {
    let responses: Map<String, Value> = statuses
        .iter()
        .map(|s| (s.to_string(), json!({"description": summary})))
        .collect();
    json!({"get": {"operationId": name, "summary": summary, "responses": responses}})
}

/// Move a JSON Schema's `$defs` into `components/schemas` and rewrite its
/// references to match.
fn lift_definitions(mut schema: Map<String, Value>, components: &mut Map<String, Value>) -> Value {
    schema.remove("$schema");
    if let Some(Value::Object(defs)) = schema.remove("$defs") {
        for (name, mut def) in defs {
            rewrite_refs(&mut def);
            components.entry(name).or_insert(def);
        }
    }
    let mut schema = Value::Object(schema);
    rewrite_refs(&mut schema);
    schema
}

fn rewrite_refs(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                match v {
                    Value::String(s) if key == "$ref" && s.starts_with(SCHEMA_REF_PREFIX) => {
                        *s = s.replacen(SCHEMA_REF_PREFIX, COMPONENT_REF_PREFIX, 1);
                    }
                    _ => rewrite_refs(v),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(rewrite_refs),
        _ => {}
    }
}

fn tool_output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["success", "data"],
        "properties": {
            "success": {"type": "boolean"},
            "dry_run": {"type": "boolean"},
            "data": {},
            "message": {"type": "string"},
            "error": {"$ref": format!("{COMPONENT_REF_PREFIX}ErrorBody")}
        }
    })
}

fn error_body_schema() -> Value {
    json!({
        "type": "object",
        "required": ["type", "message"],
        "properties": {
            "type": {
                "type": "string",
                "enum": ["unknown_tool", "validation", "not_found", "conflict", "upstream", "internal"]
            },
            "message": {"type": "string"},
            "missing": {"type": "array", "items": {"type": "string"}}
        }
    })
}
