use attrcache_scan::LocateError;

/// Decoration failed because the setup cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The declared source does not parse.
    #[error("failed to parse the source of `{function}`: {message}")]
    Parse { function: String, message: String },
    /// The function is defined zero or several times in its source.
    #[error(transparent)]
    Locate(#[from] LocateError),
    /// A parameter binds a pattern instead of a plain name.
    #[error("parameter {index} of `{function}` is not a plain identifier")]
    Pattern { function: String, index: usize },
    /// A default or optional marker names a parameter that does not exist.
    #[error("`{function}` has no parameter named `{param}`")]
    UnknownParameter { function: String, param: String },
    /// A property getter does not take exactly one argument.
    #[error("a cached property getter takes exactly one argument, but `{function}` takes {count}")]
    Getter { function: String, count: usize },
    /// A setter was attached to a cached property.
    #[error("cached properties do not support setters")]
    Setter,
    /// A deleter was attached to a cached property.
    #[error("cached properties do not support deleters")]
    Deleter,
}

/// The arguments of a call do not fit the function's signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("{function}() takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        function: String,
        expected: usize,
        given: usize,
    },
    #[error("{function}() got an unexpected keyword argument `{name}`")]
    UnexpectedKeyword { function: String, name: String },
    #[error("{function}() got multiple values for argument `{name}`")]
    MultipleValues { function: String, name: String },
    #[error("{function}() missing required argument `{name}`")]
    Missing { function: String, name: String },
}
