//! Expression graph for the imagery service.
//!
//! Images are never computed locally: every operation appends a node to a
//! serializable expression which the service evaluates remotely.

use serde_json::{json, Map, Value};

/// A node of the remote expression graph.
///
/// Serialized in the Earth Engine `ValueNode` shape: `constantValue`,
/// `arrayValue` or `functionInvocationValue`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression(Value);

impl Expression {
    /// A literal value.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self(json!({ "constantValue": value.into() }))
    }

    /// A list of sub-expressions.
    pub fn array(items: impl IntoIterator<Item = Expression>) -> Self {
        let values: Vec<Value> = items.into_iter().map(|e| e.0).collect();
        Self(json!({ "arrayValue": { "values": values } }))
    }

    /// An invocation of a named server-side function.
    pub fn invoke<'a>(
        function: &str,
        arguments: impl IntoIterator<Item = (&'a str, Expression)>,
    ) -> Self {
        let arguments: Map<String, Value> = arguments
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.0))
            .collect();

        Self(json!({
            "functionInvocationValue": {
                "functionName": function,
                "arguments": arguments,
            }
        }))
    }

    /// Name of the invoked function, if this node is an invocation.
    pub fn function_name(&self) -> Option<&str> {
        self.0
            .get("functionInvocationValue")?
            .get("functionName")?
            .as_str()
    }

    /// Argument `name` of an invocation node.
    pub fn argument(&self, name: &str) -> Option<Expression> {
        self.0
            .get("functionInvocationValue")?
            .get("arguments")?
            .get(name)
            .cloned()
            .map(Expression)
    }

    /// Value of a constant node.
    pub fn constant_value(&self) -> Option<&Value> {
        self.0.get("constantValue")
    }

    /// Borrow the raw node.
    pub fn node(&self) -> &Value {
        &self.0
    }

    /// Wraps this node as a complete graph with a single root value.
    pub fn to_graph(&self) -> Value {
        json!({
            "result": "0",
            "values": { "0": self.0 },
        })
    }

    /// Returns true if any node in this expression invokes `function`.
    pub fn contains_function(&self, function: &str) -> bool {
        fn walk(node: &Value, function: &str) -> bool {
            if node.get("functionName").and_then(Value::as_str) == Some(function) {
                return true;
            }
            match node {
                Value::Object(map) => map.values().any(|v| walk(v, function)),
                Value::Array(items) => items.iter().any(|v| walk(v, function)),
                _ => false,
            }
        }
        walk(&self.0, function)
    }
}
