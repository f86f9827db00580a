use super::*;

/// Derive `Identity` for a struct.
pub fn expand(item: &syn::DeriveInput) -> Result<TokenStream2> {
    let syn::Data::Struct(data) = &item.data else {
        bail!(item, "`Identity` can only be derived for structs");
    };

    let fields: Vec<_> = data.fields.iter().enumerate().collect();
    let marked: Vec<_> = fields
        .iter()
        .copied()
        .filter(|(_, field)| field.attrs.iter().any(|attr| attr.path().is_ident("identity")))
        .collect();

    let candidates = if marked.is_empty() {
        fields.iter().copied().filter(|(_, field)| is_token(&field.ty)).collect()
    } else {
        marked
    };

    let (index, field) = match candidates.as_slice() {
        [candidate] => *candidate,
        [] => bail!(
            item.ident,
            "`Identity` needs a `Token` field or a field marked `#[identity]`"
        ),
        [_, (_, second), ..] => bail!(second, "only one field can provide the identity"),
    };

    let member = match &field.ident {
        Some(ident) => quote! { #ident },
        None => {
            let index = syn::Index::from(index);
            quote! { #index }
        }
    };

    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::attrcache::Identity for #name #ty_generics #where_clause {
            #[inline]
            fn identity(&self) -> ::attrcache::Id {
                ::attrcache::Identity::identity(&self.#member)
            }
        }
    })
}

/// Whether a type is a path ending in `Token`.
fn is_token(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(path) => {
            path.path.segments.last().is_some_and(|segment| segment.ident == "Token")
        }
        _ => false,
    }
}
