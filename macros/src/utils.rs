use syn::parse::{Parse, ParseStream};
use syn::token::Token;
use syn::visit::{self, Visit};

use super::*;

/// Parse a metadata key-value pair, separated by `=`.
pub fn parse_key_value<K: Token + Default + Parse, V: Parse>(
    input: ParseStream,
) -> Result<Option<V>> {
    if !input.peek(|_| K::default()) {
        return Ok(None);
    }

    let _: K = input.parse()?;
    let _: syn::Token![=] = input.parse()?;
    let value: V = input.parse::<V>()?;
    eat_comma(input)?;
    Ok(Some(value))
}

/// Parse a comma if there is one.
pub fn eat_comma(input: ParseStream) -> Result<()> {
    if input.peek(syn::Token![,]) {
        let _: syn::Token![,] = input.parse()?;
    }
    Ok(())
}

/// Ensure a return type can be named by a function-local static.
pub fn check_output(ty: &syn::Type) -> Result<()> {
    let mut checker = OutputChecker { error: None };
    checker.visit_type(ty);
    match checker.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Finds parts of a type that refer to the enclosing item.
struct OutputChecker {
    error: Option<Error>,
}

impl OutputChecker {
    fn fail(&mut self, tokens: &dyn quote::ToTokens, message: &str) {
        if self.error.is_none() {
            self.error = Some(Error::new_spanned(tokens, format!("attrcache: {message}")));
        }
    }
}

impl<'a> Visit<'a> for OutputChecker {
    fn visit_type_impl_trait(&mut self, node: &'a syn::TypeImplTrait) {
        self.fail(node, "cached functions cannot return `impl Trait`");
    }

    fn visit_lifetime(&mut self, node: &'a syn::Lifetime) {
        if node.ident != "static" {
            self.fail(node, "cached functions can only return `'static` data");
        }
    }

    fn visit_path_segment(&mut self, node: &'a syn::PathSegment) {
        if node.ident == "Self" {
            self.fail(node, "cached functions cannot return `Self`, name the type instead");
        }
        visit::visit_path_segment(self, node);
    }
}
