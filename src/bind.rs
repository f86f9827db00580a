use std::fmt::{self, Debug, Formatter};
use std::ops::Index;
use std::sync::Arc;

use crate::error::{BindError, ConfigError};
use crate::value::Value;

/// The declared parameters of a runtime-decorated function.
#[derive(Clone)]
pub struct Signature {
    name: String,
    params: Vec<Parameter>,
}

#[derive(Clone)]
struct Parameter {
    name: Arc<str>,
    kind: Kind,
}

/// How a parameter is filled when the caller omits it.
#[derive(Clone)]
enum Kind {
    Required,
    Default(Value),
    Optional,
}

impl Signature {
    /// Create a signature with only required parameters.
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            params: params
                .into_iter()
                .map(|param| Parameter { name: param.as_ref().into(), kind: Kind::Required })
                .collect(),
        }
    }

    /// Read the parameter names from a function signature.
    ///
    /// A receiver binds as `self`. Every other parameter must be a plain
    /// identifier.
    pub fn from_syn(sig: &syn::Signature) -> Result<Self, ConfigError> {
        let function = sig.ident.to_string();
        let mut names = Vec::with_capacity(sig.inputs.len());
        for (index, input) in sig.inputs.iter().enumerate() {
            let name = match input {
                syn::FnArg::Receiver(_) => "self".to_string(),
                syn::FnArg::Typed(typed) => match typed.pat.as_ref() {
                    syn::Pat::Ident(syn::PatIdent { ident, subpat: None, .. }) => {
                        ident.to_string()
                    }
                    _ => return Err(ConfigError::Pattern { function, index }),
                },
            };
            names.push(name);
        }
        Ok(Self::new(function, names))
    }

    /// The function's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter names in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|param| param.name.as_ref())
    }

    /// The number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the function takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Give a parameter a default value.
    pub fn set_default(&mut self, param: &str, value: Value) -> Result<(), ConfigError> {
        self.param_mut(param)?.kind = Kind::Default(value);
        Ok(())
    }

    /// Allow a parameter to stay unbound when the caller omits it.
    pub fn set_optional(&mut self, param: &str) -> Result<(), ConfigError> {
        self.param_mut(param)?.kind = Kind::Optional;
        Ok(())
    }

    fn param_mut(&mut self, param: &str) -> Result<&mut Parameter, ConfigError> {
        match self.params.iter_mut().find(|p| &*p.name == param) {
            Some(found) => Ok(found),
            None => Err(ConfigError::UnknownParameter {
                function: self.name.clone(),
                param: param.to_string(),
            }),
        }
    }

    /// Bind positional and keyword arguments to parameter names.
    ///
    /// Positional arguments fill parameters in order, then keywords fill
    /// parameters by name, then defaults fill what remains. Optional
    /// parameters without an argument are left out of the result.
    pub fn bind(&self, args: &[Value], kwargs: &[(&str, Value)]) -> Result<Bound, BindError> {
        if args.len() > self.params.len() {
            return Err(BindError::TooManyPositional {
                function: self.name.clone(),
                expected: self.params.len(),
                given: args.len(),
            });
        }

        let mut slots: Vec<Option<Value>> = args.iter().cloned().map(Some).collect();
        slots.resize(self.params.len(), None);

        for (name, value) in kwargs {
            let Some(i) = self.params.iter().position(|p| &*p.name == *name) else {
                return Err(BindError::UnexpectedKeyword {
                    function: self.name.clone(),
                    name: name.to_string(),
                });
            };
            if slots[i].is_some() {
                return Err(BindError::MultipleValues {
                    function: self.name.clone(),
                    name: name.to_string(),
                });
            }
            slots[i] = Some(value.clone());
        }

        let mut bound = Bound(Vec::with_capacity(self.params.len()));
        for (param, slot) in self.params.iter().zip(slots) {
            let value = match (slot, &param.kind) {
                (Some(value), _) => value,
                (None, Kind::Default(value)) => value.clone(),
                (None, Kind::Optional) => continue,
                (None, Kind::Required) => {
                    return Err(BindError::Missing {
                        function: self.name.clone(),
                        name: param.name.to_string(),
                    });
                }
            };
            bound.0.push((param.name.clone(), value));
        }

        Ok(bound)
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&param.name)?;
            match param.kind {
                Kind::Required => {}
                Kind::Default(_) => f.write_str("=..")?,
                Kind::Optional => f.write_str("?")?,
            }
        }
        f.write_str(")")
    }
}

/// Arguments bound to parameter names for one call.
///
/// ```
/// use attrcache::{Signature, Value};
///
/// let mut sig = Signature::new("scale", ["x", "factor"]);
/// sig.set_optional("factor").unwrap();
///
/// let bound = sig.bind(&[Value::new(3)], &[]).unwrap();
/// assert!(bound.get("x").is_some());
/// assert!(bound.get("factor").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Bound(Vec<(Arc<str>, Value)>);

impl Bound {
    /// Bind a single argument.
    pub(crate) fn single(name: Arc<str>, value: Value) -> Self {
        Self(vec![(name, value)])
    }

    /// The argument bound to a parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| &**n == name).map(|(_, v)| v)
    }

    /// Whether a parameter is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The number of bound parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the bound parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_ref(), value))
    }
}

/// Look up a required argument.
///
/// # Panics
/// Panics if nothing is bound to `name`. Optional parameters may be unbound,
/// read them with [`Bound::get`] instead.
impl Index<&str> for Bound {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no argument bound to `{name}`"),
        }
    }
}

impl Debug for Bound {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
