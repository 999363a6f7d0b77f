use flat_ir::FieldType;

/// Failure to turn specs into a loaded type.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("method `{method}` refers to field `{field}`, which has no storage")]
    UnresolvedField { method: String, field: String },

    #[error("method `{0}` is not declared by the contract")]
    UnknownMethod(String),

    #[error("method `{0}` is synthesized more than once")]
    DuplicateMethod(String),

    #[error("method `{method}` declares {declared} parameter(s) but was synthesized with {synthesized}")]
    ArityMismatch {
        method: String,
        declared: usize,
        synthesized: usize,
    },

    #[error("method `{method}` has a statement out of place")]
    MisplacedStatement { method: String },

    #[error("no `{0}` method was synthesized")]
    MissingIntrinsic(&'static str),

    #[error("emitter backend failed: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Constructor arguments did not fit the layout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstructError {
    #[error("constructor takes {expected} argument(s), got {actual}")]
    Arity { expected: usize, actual: usize },
}

/// A call on an instance that could not be carried out.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    #[error("no method `{0}`")]
    NoSuchMethod(String),

    #[error("method `{0}` has no implementation")]
    AbstractMethod(String),

    #[error("method `{method}` takes {expected} argument(s), got {actual}")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("argument `{param}` of `{method}` expects `{expected}`, got `{actual}`")]
    ArgumentType {
        method: String,
        param: String,
        expected: FieldType,
        actual: String,
    },
}
