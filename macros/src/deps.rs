use std::collections::BTreeMap;

use super::*;

/// Produce one identity expression per dependency of `func`, in slot order.
///
/// Bare reads of parameters come first, then field reads on parameters, each
/// sorted by name. A local that shadows a parameter is not told apart from it,
/// so its field reads are resolved on the parameter.
pub fn collect(func: &syn::ItemFn) -> Result<Vec<TokenStream2>> {
    let definition = match attrcache_scan::locate_in_fn(func) {
        Ok(definition) => definition,
        Err(err) => bail!(func.sig.ident, "{}", err),
    };

    let reads = attrcache_scan::reads(definition);
    let params = params(&func.sig);
    let mut exprs = vec![];

    for name in &reads.names {
        if let Some(param) = params.get(name) {
            exprs.push(quote! { ::attrcache::Identity::identity(&#param) });
        }
    }

    for (base, attr) in &reads.attrs {
        let Some(param) = params.get(base) else { continue };
        let member: syn::Member = syn::parse_str(attr)?;
        exprs.push(quote! { ::attrcache::Identity::identity(&#param.#member) });
    }

    Ok(exprs)
}

/// Map parameter names to the tokens that refer to them.
fn params(sig: &syn::Signature) -> BTreeMap<String, TokenStream2> {
    let mut params = BTreeMap::new();
    for input in &sig.inputs {
        match input {
            syn::FnArg::Receiver(receiver) => {
                let token = &receiver.self_token;
                params.insert("self".to_string(), quote! { #token });
            }
            syn::FnArg::Typed(typed) => {
                if let syn::Pat::Ident(pat) = typed.pat.as_ref() {
                    let ident = &pat.ident;
                    params.insert(ident.to_string(), quote! { #ident });
                }
            }
        }
    }
    params
}
