//! Memoization keyed on the identity of the values a function reads.
//!
//! A memoized function is scanned once for the parameters and the
//! `parameter.field` accesses its body reads. Each call fingerprints the
//! identities of exactly those values and looks the fingerprint up in a
//! bounded, least-recently-used store of previous results. Replacing a read
//! value with a different instance invalidates the result, even if the new
//! instance is equal to the old one.
//!
//! ```
//! use std::sync::Arc;
//!
//! use attrcache::{cache, cached_property, Identity, Token};
//!
//! /// Sum up the lengths of two lists.
//! #[cache]
//! fn total(a: Arc<Vec<u8>>, b: Arc<Vec<u8>>) -> usize {
//!     a.len() + b.len()
//! }
//!
//! #[derive(Identity)]
//! struct Label {
//!     token: Token,
//!     text: Arc<String>,
//! }
//!
//! impl Label {
//!     /// The label in upper case.
//!     #[cached_property]
//!     fn shout(&self) -> String {
//!         self.text.to_uppercase()
//!     }
//! }
//!
//! let a = Arc::new(vec![1, 2]);
//! let b = Arc::new(vec![3]);
//! assert_eq!(total(a.clone(), b.clone()), 3);
//! assert_eq!(total(a, b), 3); // cached
//!
//! let mut label = Label { token: Token::new(), text: Arc::new("hi".into()) };
//! assert_eq!(label.shout(), "HI");
//! label.text = Arc::new("ho".into());
//! assert_eq!(label.shout(), "HO");
//! ```
//!
//! Functions that only exist as source text at runtime are decorated with
//! [`Function::builder`] and called with dynamically typed [`Value`]s.
//!
//! # Read-only properties
//! Cached properties cannot be written or deleted. Registering a setter is
//! rejected when the getter is decorated:
//!
//! ```compile_fail
//! use attrcache::{cached_property, Identity, Token};
//!
//! #[derive(Identity)]
//! struct Circle {
//!     token: Token,
//!     radius: f64,
//! }
//!
//! impl Circle {
//!     #[cached_property(setter = set_area)]
//!     fn area(&self) -> f64 {
//!         3.0 * self.radius * self.radius
//!     }
//! }
//! ```
//!
//! So is a deleter:
//!
//! ```compile_fail
//! use attrcache::{cached_property, Identity, Token};
//!
//! #[derive(Identity)]
//! struct Circle {
//!     token: Token,
//!     radius: f64,
//! }
//!
//! impl Circle {
//!     #[cached_property(deleter = forget_area)]
//!     fn area(&self) -> f64 {
//!         3.0 * self.radius * self.radius
//!     }
//! }
//! ```
//!
//! And so is a getter that could mutate the instance:
//!
//! ```compile_fail
//! use attrcache::{cached_property, Identity, Token};
//!
//! #[derive(Identity)]
//! struct Circle {
//!     token: Token,
//!     radius: f64,
//! }
//!
//! impl Circle {
//!     #[cached_property]
//!     fn area(&mut self) -> f64 {
//!         3.0 * self.radius * self.radius
//!     }
//! }
//! ```
//!
//! Without any of these, the same getter compiles:
//!
//! ```
//! use attrcache::{cached_property, Identity, Token};
//!
//! #[derive(Identity)]
//! struct Circle {
//!     token: Token,
//!     radius: f64,
//! }
//!
//! impl Circle {
//!     #[cached_property]
//!     fn area(&self) -> f64 {
//!         3.0 * self.radius * self.radius
//!     }
//! }
//!
//! let circle = Circle { token: Token::new(), radius: 2.0 };
//! assert_eq!(circle.area(), 12.0);
//! ```

mod bind;
mod cache;
mod deps;
mod error;
mod fingerprint;
mod function;
mod hash;
mod identity;
mod property;
#[cfg(feature = "testing")]
mod testing;
mod value;

pub use crate::bind::{Bound, Signature};
pub use crate::cache::CAPACITY;
pub use crate::deps::{Dependencies, Dependency};
pub use crate::error::{BindError, ConfigError};
pub use crate::fingerprint::Fingerprint;
pub use crate::function::{Function, FunctionBuilder};
pub use crate::identity::{Id, Identity, Token};
pub use crate::property::Property;
pub use crate::value::{Object, Value};

#[cfg(feature = "macros")]
pub use attrcache_macros::{Identity, cache, cached_property};

/// These are implementation details. Do not rely on them!
#[doc(hidden)]
pub mod internal {
    pub use crate::cache::{Cache, memoized};
    pub use crate::fingerprint::Fingerprint;

    #[cfg(feature = "testing")]
    pub use crate::testing::last_was_hit;
}
