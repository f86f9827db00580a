use syn::parse::{Parse, ParseStream};

use super::*;

mod kw {
    syn::custom_keyword!(setter);
    syn::custom_keyword!(deleter);
}

/// The arguments of `#[cached_property]`.
///
/// Setters and deleters are only parsed so that they can be rejected with a
/// precise error.
#[derive(Default)]
pub struct Args {
    setter: Option<syn::Path>,
    deleter: Option<syn::Path>,
}

impl Parse for Args {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = Args::default();
        while !input.is_empty() {
            if let Some(path) = utils::parse_key_value::<kw::setter, syn::Path>(input)? {
                args.setter = Some(path);
            } else if let Some(path) = utils::parse_key_value::<kw::deleter, syn::Path>(input)? {
                args.deleter = Some(path);
            } else {
                return Err(input.error("attrcache: expected `setter` or `deleter`"));
            }
        }
        Ok(args)
    }
}

/// Turn a getter into a cached property.
pub fn expand(args: Args, func: syn::ItemFn) -> Result<TokenStream2> {
    if let Some(setter) = &args.setter {
        bail!(setter, "cached properties do not support setters");
    }

    if let Some(deleter) = &args.deleter {
        bail!(deleter, "cached properties do not support deleters");
    }

    let mut inputs = func.sig.inputs.iter();
    let Some(syn::FnArg::Receiver(receiver)) = inputs.next() else {
        bail!(func.sig, "cached property getters must take `&self`");
    };

    if receiver.reference.is_none() || receiver.colon_token.is_some() {
        bail!(receiver, "cached property getters must take `&self`");
    }

    if receiver.mutability.is_some() {
        bail!(receiver, "cached properties do not support setters");
    }

    if let Some(input) = inputs.next() {
        bail!(input, "cached property getters cannot take arguments");
    }

    cache::expand(func)
}
