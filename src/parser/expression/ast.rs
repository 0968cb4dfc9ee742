use serde_json::{Map, Value};

// ── AST node union ───────────────────────────────────────────────────────────

/// Nodes produced by the embedded-expression grammar.
///
/// Each node carries only the fields needed to reconstruct a value or a call
/// description.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Top-level node: one or more expression statements.
    Program { body: Vec<ExpressionNode> },
    /// A single expression used as a statement.
    ExpressionStatement { expression: Box<ExpressionNode> },
    /// A call: callee plus ordered argument list.
    CallExpression {
        callee: Box<ExpressionNode>,
        arguments: Vec<ExpressionNode>,
    },
    StringLiteral(String),
    NumericLiteral(f64),
    BooleanLiteral(bool),
    Identifier(String),
    /// Ordered property:value pairs; unique keys are not enforced.
    ObjectExpression { properties: Vec<PropertyAssignment> },
    /// Ordered elements.
    ArrayExpression { elements: Vec<ExpressionNode> },
    /// One step of member access; chains nest in `object`.
    MemberExpression {
        object: Box<ExpressionNode>,
        property: Box<ExpressionNode>,
    },
}

/// A `key: value` pair inside an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAssignment {
    pub key: String,
    pub value: ExpressionNode,
}

impl ExpressionNode {
    /// Reconstruct a JSON value from this node.
    ///
    /// Identifiers become their name, member chains a dotted path, and call
    /// expressions a `{name, arguments}` description, so the conversion is
    /// total over the grammar.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Program { body } => match body.as_slice() {
                [only] => only.to_value(),
                many => Value::Array(many.iter().map(Self::to_value).collect()),
            },
            Self::ExpressionStatement { expression } => expression.to_value(),
            Self::CallExpression { callee, arguments } => {
                let mut call = Map::new();
                call.insert("name".to_string(), Value::String(callee.path()));
                call.insert(
                    "arguments".to_string(),
                    Value::Array(arguments.iter().map(Self::to_value).collect()),
                );
                Value::Object(call)
            }
            Self::StringLiteral(s) => Value::String(s.clone()),
            Self::NumericLiteral(n) => serde_json::Number::from_f64(*n)
                .map_or(Value::Null, Value::Number),
            Self::BooleanLiteral(b) => Value::Bool(*b),
            Self::Identifier(name) => Value::String(name.clone()),
            Self::ObjectExpression { properties } => {
                let mut object = Map::new();
                for property in properties {
                    object.insert(property.key.clone(), property.value.to_value());
                }
                Value::Object(object)
            }
            Self::ArrayExpression { elements } => {
                Value::Array(elements.iter().map(Self::to_value).collect())
            }
            Self::MemberExpression { .. } => Value::String(self.path()),
        }
    }

    /// Dotted-path rendering for identifiers and member chains; other nodes
    /// fall back to a best-effort textual form.
    fn path(&self) -> String {
        match self {
            Self::Identifier(name) => name.clone(),
            Self::MemberExpression { object, property } => {
                format!("{}.{}", object.path(), property.path())
            }
            Self::StringLiteral(s) => s.clone(),
            other => format!("{other:?}"),
        }
    }

    /// The single expression of a one-statement program, if that is what
    /// this node is.
    pub fn single_expression(&self) -> Option<&ExpressionNode> {
        match self {
            Self::Program { body } => match body.as_slice() {
                [ExpressionNode::ExpressionStatement { expression }] => Some(expression),
                [only] => Some(only),
                _ => None,
            },
            Self::ExpressionStatement { expression } => Some(expression),
            _ => None,
        }
    }
}
