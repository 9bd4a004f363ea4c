//! Tool descriptors: the static contract every registered tool exposes.
//!
//! A tool is a type implementing [`ToolDefinition`]. At registration it is
//! erased into a [`ToolDescriptor`] holding its metadata, its ordered
//! parameter signature and a boxed handler that takes already-normalized
//! keyword arguments plus the injected [`ToolContext`].

use futures::FutureExt;
use futures::future::BoxFuture;
use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::context::ToolContext;
use super::error::{ToolError, ToolResult};
use super::output::ToolOutput;

/// Functional area a tool belongs to (mirrors NetBox's apps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    System,
    Dcim,
    Ipam,
    Tenancy,
}

impl ToolCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Dcim => "dcim",
            Self::Ipam => "ipam",
            Self::Tenancy => "tenancy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Self::System),
            "dcim" => Some(Self::Dcim),
            "ipam" => Some(Self::Ipam),
            "tenancy" => Some(Self::Tenancy),
            _ => None,
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a parameter; drives coercion during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    /// Comma-separated string or array of strings.
    StringList,
    /// NetBox object reference: integer ID or slug/name.
    Reference,
    /// Arbitrary JSON (object/array); accepted JSON-encoded in strings.
    Json,
}

/// Default value for an optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamDefault {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl ParamDefault {
    pub fn to_value(self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::from(i),
            Self::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// One entry of a tool's ordered parameter signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamDefault>,
}

impl ParamSpec {
    /// The confirmation flag every mutating tool declares.
    pub const CONFIRM: ParamSpec =
        ParamSpec::with_default("confirm", ParamKind::Boolean, ParamDefault::Bool(false));

    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
        }
    }

    pub const fn with_default(name: &'static str, kind: ParamKind, default: ParamDefault) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: Some(default),
        }
    }
}

/// Implemented by every tool.
///
/// `PARAMS` is the wire contract used for normalization and must list the
/// same fields as `Params` (checked by the registry tests).
pub trait ToolDefinition: 'static {
    const NAME: &'static str;
    const CATEGORY: ToolCategory;
    const DESCRIPTION: &'static str;
    /// Whether the tool can change NetBox state. Mutating tools must
    /// declare [`ParamSpec::CONFIRM`].
    const MUTATING: bool = false;
    const PARAMS: &'static [ParamSpec];

    type Params: DeserializeOwned + JsonSchema + Send + 'static;

    fn run(params: Self::Params, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>>;
}

type HandlerFn =
    Arc<dyn Fn(JsonObject, ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> + Send + Sync>;

/// Type-erased, registered tool.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub category: ToolCategory,
    pub description: &'static str,
    pub mutating: bool,
    pub params: &'static [ParamSpec],
    pub input_schema: Arc<JsonObject>,
    handler: HandlerFn,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("mutating", &self.mutating)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl ToolDescriptor {
    /// Erase a tool definition into a descriptor.
    pub fn of<T: ToolDefinition>() -> Self {
        let handler: HandlerFn = Arc::new(|arguments: JsonObject, ctx: ToolContext| {
            match serde_json::from_value::<T::Params>(Value::Object(arguments)) {
                Ok(params) => T::run(params, ctx),
                Err(e) => {
                    let err = ToolError::validation(format!("{}: {}", T::NAME, e));
                    futures::future::ready(Err(err)).boxed()
                }
            }
        });

        Self {
            name: T::NAME,
            category: T::CATEGORY,
            description: T::DESCRIPTION,
            mutating: T::MUTATING,
            params: T::PARAMS,
            input_schema: schema_for_type::<T::Params>().into(),
            handler,
        }
    }

    /// Invoke the handler with normalized keyword arguments.
    pub fn invoke(&self, arguments: JsonObject, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        (self.handler)(arguments, ctx)
    }

    /// Whether the signature declares `confirm` as a boolean defaulting to false.
    pub fn declares_confirm(&self) -> bool {
        self.params.iter().any(|p| *p == ParamSpec::CONFIRM)
    }

    /// rmcp metadata for `tools/list`.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.into(),
            description: Some(self.description.into()),
            input_schema: self.input_schema.clone(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Discovery document used by the REST bridge.
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "category": self.category,
            "description": self.description,
            "mutating": self.mutating,
            "parameters": self.params,
            "inputSchema": self.input_schema.as_ref(),
        })
    }
}
