extern crate proc_macro;

macro_rules! bail {
    ($item:expr, $fmt:literal $($tts:tt)*) => {
        return Err(Error::new_spanned(
            &$item,
            format!(concat!("attrcache: ", $fmt) $($tts)*)
        ))
    }
}

mod cache;
mod deps;
mod identity;
mod property;
mod utils;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Error, Result, parse_quote};

/// Memoize a function on the identities of the values it reads.
///
/// The body is scanned once, at expansion time, for the parameters and the
/// `parameter.field` accesses it reads. Every value it reads must implement
/// `attrcache::Identity`. The function keeps its own bounded cache.
///
/// ```ignore
/// #[cache]
/// fn area(rect: Arc<Rect>) -> u64 {
///     rect.width * rect.height
/// }
/// ```
#[proc_macro_attribute]
pub fn cache(args: TokenStream, stream: TokenStream) -> TokenStream {
    syn::parse_macro_input!(args as syn::parse::Nothing);
    let func = syn::parse_macro_input!(stream as syn::ItemFn);
    cache::expand(func)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Turn a getter method into a memoized, read-only computed attribute.
///
/// The method must take `&self` and nothing else. Setters and deleters are
/// rejected, see the `attrcache` crate docs for examples.
///
/// ```ignore
/// impl Circle {
///     #[cached_property]
///     fn area(&self) -> f64 {
///         PI * self.radius * self.radius
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn cached_property(args: TokenStream, stream: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(args as property::Args);
    let func = syn::parse_macro_input!(stream as syn::ItemFn);
    property::expand(args, func)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Derive `attrcache::Identity` from a field.
///
/// Uses the field marked with `#[identity]`, or else the single field of type
/// `Token`.
///
/// ```ignore
/// #[derive(Identity)]
/// struct Circle {
///     token: Token,
///     radius: f64,
/// }
/// ```
#[proc_macro_derive(Identity, attributes(identity))]
pub fn derive_identity(stream: TokenStream) -> TokenStream {
    let item = syn::parse_macro_input!(stream as syn::DeriveInput);
    identity::expand(&item)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
