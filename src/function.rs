use std::fmt::{self, Debug, Formatter};

use crate::bind::{Bound, Signature};
use crate::cache::{Cache, memoized};
use crate::deps::{Dependencies, parse};
use crate::error::{BindError, ConfigError};
use crate::value::Value;

/// The body of a runtime-decorated function.
type Body = Box<dyn Fn(&Bound) -> Value + Send + Sync>;

/// A function memoized on the identities of the values it reads.
///
/// Created through [`Function::builder`] from the function's declared source.
/// The source is scanned once when the function is built. Every call binds its
/// arguments, fingerprints the dependencies and only runs the body if no
/// result is cached for that fingerprint.
pub struct Function {
    signature: Signature,
    dependencies: Dependencies,
    cache: Cache<Value>,
    body: Body,
}

impl Function {
    /// Start decorating the function `name` declared in `source`.
    ///
    /// ```
    /// use attrcache::{Function, Value};
    ///
    /// let source = "fn scale(x: i64, factor: i64) -> i64 { x * factor }";
    /// let scale = Function::builder(source, "scale")
    ///     .with_optional("factor")
    ///     .build(|args| {
    ///         let x = args.get("x").and_then(|x| x.downcast_ref::<i64>()).copied();
    ///         let factor = args.get("factor").and_then(|f| f.downcast_ref::<i64>()).copied();
    ///         Value::new(x.unwrap_or(0) * factor.unwrap_or(1))
    ///     })
    ///     .unwrap();
    ///
    /// let x = Value::new(3i64);
    /// let out = scale.call(&[x.clone()], &[]).unwrap();
    /// assert_eq!(out.downcast_ref::<i64>(), Some(&3));
    /// let out = scale.call(&[x], &[("factor", Value::new(2i64))]).unwrap();
    /// assert_eq!(out.downcast_ref::<i64>(), Some(&6));
    /// ```
    pub fn builder<'a>(source: &'a str, name: &'a str) -> FunctionBuilder<'a> {
        FunctionBuilder { source, name, defaults: Vec::new(), optional: Vec::new() }
    }

    /// The function's name.
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// The function's parameters.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The values the function reads.
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Call the function with positional and keyword arguments.
    ///
    /// Fails if the arguments do not fit the signature. The body does not
    /// run if a result for the same dependency identities is cached.
    pub fn call(&self, args: &[Value], kwargs: &[(&str, Value)]) -> Result<Value, BindError> {
        let bound = self.signature.bind(args, kwargs)?;
        Ok(self.invoke(bound))
    }

    /// Call the function with already bound arguments.
    pub(crate) fn invoke(&self, bound: Bound) -> Value {
        let fingerprint = self.dependencies.fingerprint(&bound);
        memoized(self.name(), &self.cache, fingerprint, || (self.body)(&bound))
    }

    /// The number of cached results.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no result is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Forget all cached results.
    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Configures a [`Function`] before its source is scanned.
pub struct FunctionBuilder<'a> {
    source: &'a str,
    name: &'a str,
    defaults: Vec<(&'a str, Value)>,
    optional: Vec<&'a str>,
}

impl<'a> FunctionBuilder<'a> {
    /// Give a parameter a default value.
    pub fn with_default(mut self, param: &'a str, value: Value) -> Self {
        self.defaults.push((param, value));
        self
    }

    /// Allow a parameter to stay unbound when the caller omits it.
    pub fn with_optional(mut self, param: &'a str) -> Self {
        self.optional.push(param);
        self
    }

    /// Scan the source and wrap `body`.
    ///
    /// Fails if the source does not parse, does not define the function
    /// exactly once, or the configured parameters do not exist.
    pub fn build<F>(self, body: F) -> Result<Function, ConfigError>
    where
        F: Fn(&Bound) -> Value + Send + Sync + 'static,
    {
        let file = parse(self.source, self.name)?;
        let definition = attrcache_scan::locate_in_file(&file, self.name)?;
        let mut signature = Signature::from_syn(definition.sig)?;
        for (param, value) in self.defaults {
            signature.set_default(param, value)?;
        }
        for param in self.optional {
            signature.set_optional(param)?;
        }

        let dependencies = Dependencies::from(attrcache_scan::reads(definition));
        tracing::debug!(
            function = self.name,
            dependencies = %DisplayList(&dependencies),
            "decorated function"
        );

        Ok(Function {
            signature,
            dependencies,
            cache: Cache::new(),
            body: Box::new(body),
        })
    }
}

/// Formats dependencies as a comma-separated list for log events.
struct DisplayList<'a>(&'a Dependencies);

impl fmt::Display for DisplayList<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (i, dep) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{dep}")?;
        }
        Ok(())
    }
}
