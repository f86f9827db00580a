use std::sync::Arc;

use crate::bind::Bound;
use crate::error::ConfigError;
use crate::function::Function;
use crate::value::Value;

/// A read-only computed attribute with a memoized getter.
///
/// Reading the property calls the getter with the owning instance as its only
/// argument. The getter is memoized like any [`Function`], so the instance's
/// identity and the identities of the attributes the getter reads decide
/// whether it runs again.
///
/// Properties only have a read operation. Attaching a setter or deleter fails
/// when the property is configured, before any instance is involved.
#[derive(Debug)]
pub struct Property {
    getter: Function,
    param: Arc<str>,
}

impl Property {
    /// Create a property from its getter.
    ///
    /// The getter must take exactly one parameter, the instance.
    pub fn new(getter: Function) -> Result<Self, ConfigError> {
        Self::with_accessors(getter, None, None)
    }

    /// Create a property from a getter and optional setter and deleter.
    ///
    /// Fails if a setter or deleter is given.
    pub fn with_accessors(
        getter: Function,
        setter: Option<Function>,
        deleter: Option<Function>,
    ) -> Result<Self, ConfigError> {
        if setter.is_some() {
            return Err(ConfigError::Setter);
        }

        if deleter.is_some() {
            return Err(ConfigError::Deleter);
        }

        let param: Arc<str> = {
            let mut params = getter.signature().params();
            let (Some(param), None) = (params.next(), params.next()) else {
                return Err(ConfigError::Getter {
                    function: getter.name().to_string(),
                    count: getter.signature().len(),
                });
            };
            Arc::from(param)
        };

        Ok(Self { getter, param })
    }

    /// Read the property of an instance.
    pub fn get(&self, instance: &Value) -> Value {
        self.getter.invoke(Bound::single(self.param.clone(), instance.clone()))
    }

    /// The memoized getter.
    pub fn getter(&self) -> &Function {
        &self.getter
    }

    /// Attach a setter. Always fails.
    pub fn setter(self, _: Function) -> Result<Self, ConfigError> {
        Err(ConfigError::Setter)
    }

    /// Attach a deleter. Always fails.
    pub fn deleter(self, _: Function) -> Result<Self, ConfigError> {
        Err(ConfigError::Deleter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "
        impl Test {
            fn prop(&self) -> i64 {
                1 + self.attr
            }
        }
    ";

    fn getter() -> Function {
        Function::builder(SOURCE, "prop")
            .build(|args| {
                let attr = args["self"].attr("attr").unwrap();
                Value::new(1 + attr.downcast_ref::<i64>().unwrap())
            })
            .unwrap()
    }

    #[test]
    fn test_dependencies() {
        let deps: Vec<_> = getter().dependencies().iter().map(ToString::to_string).collect();
        assert_eq!(deps, ["self", "self.attr"]);
    }

    #[test]
    fn test_rejects_setter_and_deleter() {
        let err = Property::new(getter()).unwrap().setter(getter()).unwrap_err();
        assert_eq!(err, ConfigError::Setter);
        let err = Property::new(getter()).unwrap().deleter(getter()).unwrap_err();
        assert_eq!(err, ConfigError::Deleter);
        let err = Property::with_accessors(getter(), None, Some(getter())).unwrap_err();
        assert_eq!(err.to_string(), "cached properties do not support deleters");
    }

    #[test]
    fn test_getter_arity() {
        let source = "fn both(a: A, b: B) -> u8 { 0 }";
        let both = Function::builder(source, "both").build(|_| Value::new(0u8)).unwrap();
        let err = Property::new(both).unwrap_err();
        assert_eq!(err, ConfigError::Getter { function: "both".into(), count: 2 });
    }

    #[test]
    fn test_instances_are_separate() {
        let prop = Property::new(getter()).unwrap();
        let a = Value::object();
        let b = Value::object();
        let attr = Value::new(3i64);
        a.as_object().unwrap().set("attr", attr.clone());
        b.as_object().unwrap().set("attr", attr);

        prop.get(&a);
        prop.get(&b);
        prop.get(&a);
        assert_eq!(prop.getter().len(), 2);
    }
}
