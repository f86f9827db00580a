use super::*;

/// Memoize a function.
pub fn expand(mut func: syn::ItemFn) -> Result<TokenStream2> {
    check(&func.sig)?;

    let deps = deps::collect(&func)?;
    let output = match &func.sig.output {
        syn::ReturnType::Default => quote! { () },
        syn::ReturnType::Type(_, ty) => {
            utils::check_output(ty)?;
            quote! { #ty }
        }
    };

    // Record the identity of each dependency in slot order.
    let count = deps.len();
    let slots = 0..count;
    let fingerprint = quote! {
        #[allow(unused_mut)]
        let mut __fingerprint = ::attrcache::internal::Fingerprint::with_capacity(#count);
        #(__fingerprint.push(#slots, #deps);)*
    };

    // Adjust the function's body.
    let name = func.sig.ident.to_string();
    let body = &func.block;
    func.block = parse_quote! { {
        static __CACHE: ::attrcache::internal::Cache<#output> =
            ::attrcache::internal::Cache::new();
        #fingerprint
        ::attrcache::internal::memoized(#name, &__CACHE, __fingerprint, move || #body)
    } };

    Ok(quote! { #func })
}

/// Validate a signature for memoization.
fn check(sig: &syn::Signature) -> Result<()> {
    if let Some(asyncness) = sig.asyncness {
        bail!(asyncness, "async functions cannot be cached");
    }

    if let Some(constness) = sig.constness {
        bail!(constness, "const functions cannot be cached");
    }

    if let Some(variadic) = &sig.variadic {
        bail!(variadic, "variadic functions cannot be cached");
    }

    for param in sig.generics.params.iter() {
        match param {
            syn::GenericParam::Type(_) | syn::GenericParam::Const(_) => {
                bail!(param, "cached functions cannot be generic")
            }
            syn::GenericParam::Lifetime(_) => {}
        }
    }

    for input in &sig.inputs {
        let syn::FnArg::Typed(typed) = input else { continue };

        if let syn::Type::ImplTrait(ty) = typed.ty.as_ref() {
            bail!(ty, "cached functions cannot be generic");
        }

        match typed.pat.as_ref() {
            syn::Pat::Ident(syn::PatIdent { by_ref: None, subpat: None, .. }) => {}
            pat => bail!(pat, "only simple identifiers are supported"),
        }
    }

    Ok(())
}
