use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::hash::hash_typed;

/// A value whose identity can be observed.
///
/// Two values have the same identity only if they are the same instance.
/// Reference-counted values are identified by their allocation, so cloning an
/// `Arc` keeps the identity while allocating an equal value creates a new one.
///
/// Plain scalars and strings have no reference identity. They are identified
/// by value, as if every value of them was interned.
///
/// Structs can derive this trait through a [`Token`] field, see
/// [`#[derive(Identity)]`](macro@crate::Identity).
pub trait Identity {
    /// The identity of this instance.
    fn identity(&self) -> Id;
}

/// A stable, comparable token for one instance.
///
/// Tokens of reference-counted values keep a weak reference to their
/// allocation. As long as the token lives, the address cannot be reused by a
/// different value, so a stored token never matches an unrelated object.
#[derive(Clone)]
pub struct Id(Repr);

#[derive(Clone)]
enum Repr {
    Missing,
    None,
    Value(u128),
    Token(u64),
    Pointer {
        addr: usize,
        _pin: Weak<dyn Any + Send + Sync>,
    },
}

impl Id {
    /// The identity of an attribute that does not exist.
    pub const MISSING: Self = Self(Repr::Missing);

    /// The identity of `None`.
    pub const NONE: Self = Self(Repr::None);

    /// Identify a value-typed instance by its contents.
    pub fn of_value<T: Hash + ?Sized + 'static>(value: &T) -> Self {
        Self(Repr::Value(hash_typed(value)))
    }

    /// Identify a reference-counted instance by its allocation.
    pub fn of_arc<T: Any + Send + Sync>(arc: &Arc<T>) -> Self {
        let addr = Arc::as_ptr(arc).cast::<()>().addr();
        let pin: Weak<T> = Arc::downgrade(arc);
        Self(Repr::Pointer { addr, _pin: pin })
    }

    /// Identify a type-erased reference-counted instance.
    pub(crate) fn of_shared(arc: &Arc<dyn Any + Send + Sync>) -> Self {
        let addr = Arc::as_ptr(arc).cast::<()>().addr();
        Self(Repr::Pointer { addr, _pin: Arc::downgrade(arc) })
    }

    /// Whether this is the identity of a missing attribute.
    pub fn is_missing(&self) -> bool {
        matches!(self.0, Repr::Missing)
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Repr::Missing, Repr::Missing) => true,
            (Repr::None, Repr::None) => true,
            (Repr::Value(a), Repr::Value(b)) => a == b,
            (Repr::Token(a), Repr::Token(b)) => a == b,
            (Repr::Pointer { addr: a, .. }, Repr::Pointer { addr: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Repr::Missing | Repr::None => {}
            Repr::Value(hash) => hash.hash(state),
            Repr::Token(id) => id.hash(state),
            Repr::Pointer { addr, .. } => addr.hash(state),
        }
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.0 {
            Repr::Missing => f.pad("Id(missing)"),
            Repr::None => f.pad("Id(none)"),
            Repr::Value(hash) => write!(f, "Id(value {hash:032x})"),
            Repr::Token(id) => write!(f, "Id(token {id})"),
            Repr::Pointer { addr, .. } => write!(f, "Id(pointer {addr:#x})"),
        }
    }
}

/// An explicit identity for values that are not reference counted.
///
/// Every token is unique. Cloning a token creates a fresh one, so a cloned
/// struct counts as a different object than its source, even though the two
/// compare equal.
///
/// Tokens never affect value equality or hashing: all tokens compare equal and
/// hash to nothing. This lets a struct derive `PartialEq` and `Hash` while
/// carrying an identity.
pub struct Token(u64);

impl Token {
    /// Create a new, unique token.
    pub fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Token {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl PartialEq for Token {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, _: &mut H) {}
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

impl Identity for Token {
    #[inline]
    fn identity(&self) -> Id {
        Id(Repr::Token(self.0))
    }
}

macro_rules! value_identity {
    ($($ty:ty),* $(,)?) => {
        $(impl Identity for $ty {
            #[inline]
            fn identity(&self) -> Id {
                Id::of_value(self)
            }
        })*
    };
}

value_identity! {
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    bool, char, (), str,
}

impl Identity for String {
    #[inline]
    fn identity(&self) -> Id {
        self.as_str().identity()
    }
}

impl Identity for f32 {
    #[inline]
    fn identity(&self) -> Id {
        Id::of_value(&self.to_bits())
    }
}

impl Identity for f64 {
    #[inline]
    fn identity(&self) -> Id {
        Id::of_value(&self.to_bits())
    }
}

impl<T: Identity + ?Sized> Identity for &T {
    #[inline]
    fn identity(&self) -> Id {
        (**self).identity()
    }
}

impl<T: Identity + ?Sized> Identity for &mut T {
    #[inline]
    fn identity(&self) -> Id {
        (**self).identity()
    }
}

impl<T: Identity> Identity for Option<T> {
    #[inline]
    fn identity(&self) -> Id {
        match self {
            Some(value) => value.identity(),
            None => Id::NONE,
        }
    }
}

impl<T: Any + Send + Sync> Identity for Arc<T> {
    #[inline]
    fn identity(&self) -> Id {
        Id::of_arc(self)
    }
}
