use std::fmt::{self, Display, Formatter};

use attrcache_scan::Reads;

use crate::bind::Bound;
use crate::error::ConfigError;
use crate::fingerprint::Fingerprint;
use crate::identity::{Id, Identity};

/// A value a function reads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dependency {
    /// A bare name, e.g. `a`.
    Name(String),
    /// An attribute of a name, e.g. `a.b`.
    Attr(String, String),
}

impl Dependency {
    /// The name the dependency is read through.
    pub fn base(&self) -> &str {
        match self {
            Self::Name(name) | Self::Attr(name, _) => name,
        }
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Attr(base, attr) => write!(f, "{base}.{attr}"),
        }
    }
}

/// The fixed, sorted set of values a function reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies(Vec<Dependency>);

impl Dependencies {
    /// Create a dependency set, sorting and deduplicating the input.
    pub fn new(deps: impl IntoIterator<Item = Dependency>) -> Self {
        let mut deps: Vec<_> = deps.into_iter().collect();
        deps.sort();
        deps.dedup();
        Self(deps)
    }

    /// Scan the source of the function `name` for its dependencies.
    pub fn scan(source: &str, name: &str) -> Result<Self, ConfigError> {
        let file = parse(source, name)?;
        let definition = attrcache_scan::locate_in_file(&file, name)?;
        Ok(Self::from(attrcache_scan::reads(definition)))
    }

    /// The number of dependencies.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no dependencies.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the dependencies in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.0.iter()
    }

    /// Fingerprint the dependencies of one call.
    ///
    /// Dependencies whose base is not bound are left out. An attribute that
    /// does not exist on its bound value resolves to [`Id::MISSING`].
    pub fn fingerprint(&self, bound: &Bound) -> Fingerprint {
        let mut fingerprint = Fingerprint::with_capacity(self.0.len());
        for (slot, dep) in self.0.iter().enumerate() {
            let Some(value) = bound.get(dep.base()) else { continue };
            let id = match dep {
                Dependency::Name(_) => value.identity(),
                Dependency::Attr(_, attr) => {
                    value.attr(attr).map_or(Id::MISSING, |attr| attr.identity())
                }
            };
            fingerprint.push(slot, id);
        }
        fingerprint
    }
}

impl From<Reads> for Dependencies {
    fn from(reads: Reads) -> Self {
        let names = reads.names.into_iter().map(Dependency::Name);
        let attrs = reads.attrs.into_iter().map(|(base, attr)| Dependency::Attr(base, attr));
        Self::new(names.chain(attrs))
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse the source a function is declared in.
pub(crate) fn parse(source: &str, name: &str) -> Result<syn::File, ConfigError> {
    syn::parse_file(source).map_err(|err| ConfigError::Parse {
        function: name.to_string(),
        message: err.to_string(),
    })
}
