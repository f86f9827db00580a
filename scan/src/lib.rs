//! Static discovery of the values a function reads.
//!
//! The scan is purely syntactic. It never executes anything and only looks at
//! the function's own body: bare identifiers and single-level field accesses
//! whose base is a bare identifier.

use std::collections::BTreeSet;
use std::fmt::{self, Debug, Formatter};

use proc_macro2::{Delimiter, Spacing, TokenStream, TokenTree};
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};

/// A function definition located in a syntax tree.
#[derive(Clone, Copy)]
pub struct Definition<'a> {
    /// The function's signature.
    pub sig: &'a syn::Signature,
    /// The function's body.
    pub block: &'a syn::Block,
}

impl Debug for Definition<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.sig.ident)
            .finish_non_exhaustive()
    }
}

/// The definition of a function could not be uniquely located.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("found {found} definitions of `{name}`, expected 1")]
pub struct LocateError {
    /// The name that was searched for.
    pub name: String,
    /// How many definitions carry that name.
    pub found: usize,
}

/// Locate the single function named `name` anywhere in a source file.
///
/// Free functions, functions nested in blocks, inherent and trait impl
/// methods, and trait methods with a default body are all candidates.
pub fn locate_in_file<'a>(
    file: &'a syn::File,
    name: &str,
) -> Result<Definition<'a>, LocateError> {
    let mut locator = Locator { name, found: Vec::new() };
    locator.visit_file(file);
    locator.finish()
}

/// Check that `func` is the only function of its name within itself.
///
/// A nested function that shadows the outer one's name makes the definition
/// ambiguous.
pub fn locate_in_fn(func: &syn::ItemFn) -> Result<Definition<'_>, LocateError> {
    let name = func.sig.ident.to_string();
    let mut locator = Locator { name: &name, found: Vec::new() };
    locator.visit_item_fn(func);
    locator.finish()
}

/// Collects function definitions with a given name.
struct Locator<'a, 'n> {
    name: &'n str,
    found: Vec<Definition<'a>>,
}

impl<'a> Locator<'a, '_> {
    fn check(&mut self, sig: &'a syn::Signature, block: &'a syn::Block) {
        if sig.ident == self.name {
            self.found.push(Definition { sig, block });
        }
    }

    fn finish(self) -> Result<Definition<'a>, LocateError> {
        match self.found.as_slice() {
            [definition] => Ok(*definition),
            found => Err(LocateError {
                name: self.name.to_string(),
                found: found.len(),
            }),
        }
    }
}

impl<'a> Visit<'a> for Locator<'a, '_> {
    fn visit_item_fn(&mut self, node: &'a syn::ItemFn) {
        self.check(&node.sig, &node.block);
        visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'a syn::ImplItemFn) {
        self.check(&node.sig, &node.block);
        visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'a syn::TraitItemFn) {
        if let Some(block) = &node.default {
            self.check(&node.sig, block);
        }
        visit::visit_trait_item_fn(self, node);
    }
}

/// What a function body reads.
///
/// Local bindings that share a parameter's name are not told apart from the
/// parameter, so the result may contain more than the body really reads.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reads {
    /// Bare identifiers used as expressions, e.g. `a` or `self`.
    pub names: BTreeSet<String>,
    /// Field accesses on a bare identifier, e.g. `a.b` as `("a", "b")`.
    pub attrs: BTreeSet<(String, String)>,
}

/// Collect everything the definition's body reads.
pub fn reads(definition: Definition) -> Reads {
    let mut reads = Reads::default();
    reads.visit_block(definition.block);
    reads
}

impl Reads {
    /// Record the arguments captured by a format string, e.g. `{name}`,
    /// `{a.b:?}` or `{:>width$}`.
    fn format_string(&mut self, text: &str) {
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            rest = &rest[open + 1..];
            if let Some(escaped) = rest.strip_prefix('{') {
                rest = escaped;
                continue;
            }

            let Some(close) = rest.find('}') else { break };
            let inner = &rest[..close];
            rest = &rest[close + 1..];

            let (arg, spec) = inner.split_once(':').unwrap_or((inner, ""));
            match arg.trim().split_once('.') {
                Some((base, field)) if is_ident(base) && is_ident(field) => {
                    self.names.insert(base.to_string());
                    self.attrs.insert((base.to_string(), field.to_string()));
                }
                _ if is_ident(arg.trim()) => {
                    self.names.insert(arg.trim().to_string());
                }
                _ => {}
            }

            // Width and precision arguments end in `$`.
            let mut pieces: Vec<_> = spec.split('$').collect();
            pieces.pop();
            for piece in pieces {
                let start = piece
                    .rfind(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .map_or(0, |i| i + 1);
                if is_ident(&piece[start..]) {
                    self.names.insert(piece[start..].to_string());
                }
            }
        }
    }

    /// Scan raw macro tokens for identifiers and field accesses.
    ///
    /// Identifiers that follow `.` or `::` are members or path segments and
    /// are skipped. A member followed by parentheses is a method call.
    fn tokens(&mut self, stream: TokenStream) {
        let trees: Vec<TokenTree> = stream.into_iter().collect();
        for (i, tree) in trees.iter().enumerate() {
            match tree {
                TokenTree::Group(group) => self.tokens(group.stream()),
                TokenTree::Literal(lit) => {
                    if let syn::Lit::Str(lit) = syn::Lit::new(lit.clone()) {
                        self.format_string(&lit.value());
                    }
                }
                TokenTree::Ident(ident) => {
                    if i > 0 && is_member_or_segment(&trees[..i]) {
                        continue;
                    }

                    let name = ident.to_string();
                    if let (Some(TokenTree::Punct(dot)), Some(member)) =
                        (trees.get(i + 1), trees.get(i + 2))
                    {
                        let call = matches!(
                            trees.get(i + 3),
                            Some(TokenTree::Group(args)) if args.delimiter() == Delimiter::Parenthesis
                        );
                        if dot.as_char() == '.' && dot.spacing() == Spacing::Alone && !call {
                            if let Some(member) = token_member(member) {
                                self.attrs.insert((name.clone(), member));
                            }
                        }
                    }
                    self.names.insert(name);
                }
                TokenTree::Punct(_) => {}
            }
        }
    }
}

impl<'a> Visit<'a> for Reads {
    fn visit_expr_path(&mut self, node: &'a syn::ExprPath) {
        if let Some(ident) = bare(node) {
            self.names.insert(ident.to_string());
        }
        visit::visit_expr_path(self, node);
    }

    fn visit_expr_field(&mut self, node: &'a syn::ExprField) {
        if let syn::Expr::Path(base) = node.base.as_ref() {
            if let Some(ident) = bare(base) {
                self.attrs.insert((ident.to_string(), member(&node.member)));
            }
        }
        visit::visit_expr_field(self, node);
    }

    fn visit_macro(&mut self, node: &'a syn::Macro) {
        // Macro bodies are opaque token streams. Most of the common ones are
        // plain argument lists, so those are scanned like expressions.
        let parser = Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated;
        let Ok(args) = node.parse_body_with(parser) else {
            self.tokens(node.tokens.clone());
            return;
        };

        for arg in &args {
            if let syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(lit), .. }) = arg {
                self.format_string(&lit.value());
            }
            visit::visit_expr(self, arg);
        }
    }
}

/// Whether the tokens before an identifier make it a member (`.b`) or a
/// later path segment (`a::b`).
fn is_member_or_segment(before: &[TokenTree]) -> bool {
    match before {
        [.., TokenTree::Punct(colon), TokenTree::Punct(second)]
            if colon.as_char() == ':' && second.as_char() == ':' =>
        {
            true
        }
        [.., TokenTree::Punct(punct)] => punct.as_char() == '.',
        _ => false,
    }
}

/// The member named by the token after a `.`, e.g. `b` or `0`.
fn token_member(tree: &TokenTree) -> Option<String> {
    match tree {
        TokenTree::Ident(ident) => Some(ident.to_string()),
        TokenTree::Literal(lit) => {
            let text = lit.to_string();
            (!text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())).then_some(text)
        }
        _ => None,
    }
}

/// Whether a string is a plain identifier.
fn is_ident(text: &str) -> bool {
    syn::parse_str::<syn::Ident>(text).is_ok()
}

/// The identifier of a single-segment, unqualified path expression.
fn bare(node: &syn::ExprPath) -> Option<&syn::Ident> {
    if node.qself.is_some() {
        return None;
    }
    node.path.get_ident()
}

/// The textual name of a field access member.
fn member(member: &syn::Member) -> String {
    match member {
        syn::Member::Named(ident) => ident.to_string(),
        syn::Member::Unnamed(index) => index.index.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str, name: &str) -> Reads {
        let file = syn::parse_file(source).unwrap();
        reads(locate_in_file(&file, name).unwrap())
    }

    fn set<const N: usize>(items: [&str; N]) -> BTreeSet<String> {
        items.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_names_and_attrs() {
        let reads = scan("fn f(a: u32, b: u32) -> u32 { a + b.width + b.0 }", "f");
        assert_eq!(reads.names, set(["a", "b"]));
        assert_eq!(
            reads.attrs,
            [("b", "0"), ("b", "width")]
                .into_iter()
                .map(|(x, y)| (x.to_string(), y.to_string()))
                .collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_only_first_level_attrs() {
        let reads = scan("fn f(a: A) -> u32 { a.b.c + a.len() }", "f");
        assert_eq!(reads.names, set(["a"]));
        assert_eq!(reads.attrs.len(), 1);
        assert!(reads.attrs.contains(&("a".into(), "b".into())));
    }

    #[test]
    fn test_receiver() {
        let source = "impl T { fn prop(&self) -> i32 { 1 + self.attr } }";
        let reads = scan(source, "prop");
        assert_eq!(reads.names, set(["self"]));
        assert!(reads.attrs.contains(&("self".into(), "attr".into())));
    }

    #[test]
    fn test_locals_are_kept() {
        let reads = scan("fn f(a: u32) -> u32 { let b = a; let c = |d| d; b + c(1) }", "f");
        assert_eq!(reads.names, set(["a", "b", "c", "d"]));
    }

    #[test]
    fn test_format_captures() {
        let source = r#"
            fn f(a: A, b: B, w: usize, p: usize) -> String {
                format!("{a} {b:?} {{c}} {:>w$.p$} {0}", 1.5)
            }
        "#;
        let reads = scan(source, "f");
        assert_eq!(reads.names, set(["a", "b", "p", "w"]));

        let reads = scan(r#"fn f(a: A) -> String { format!("{a.b}") }"#, "f");
        assert!(reads.attrs.contains(&("a".into(), "b".into())));
    }

    #[test]
    fn test_unparsable_macro_bodies() {
        let reads = scan("fn f(a: u8, n: usize) -> Vec<u8> { vec![a; n] }", "f");
        assert_eq!(reads.names, set(["a", "n"]));

        let source = "fn f(k: K, s: S) -> bool { matches!(k, Kind::A | Kind::B if s.on) }";
        let reads = scan(source, "f");
        assert!(reads.names.contains("k"));
        assert!(reads.names.contains("s"));
        assert!(reads.names.contains("Kind"));
        assert!(!reads.names.contains("A"));
        assert!(reads.attrs.contains(&("s".into(), "on".into())));

        let reads = scan(r#"fn f(t: T) { my_dsl!(t.0 => "{t}"; x.len()) }"#, "f");
        assert!(reads.names.contains("t"));
        assert!(!reads.names.contains("len"));
        assert!(!reads.attrs.contains(&("x".into(), "len".into())));
        assert!(reads.attrs.contains(&("t".into(), "0".into())));
    }

    #[test]
    fn test_macro_arguments() {
        let reads = scan(r#"fn f(a: A) -> String { format!("{}", a.name) }"#, "f");
        assert!(reads.attrs.contains(&("a".into(), "name".into())));
    }

    #[test]
    fn test_qualified_paths_are_ignored() {
        let reads = scan("fn f() -> u32 { std::u32::MAX + <u32>::MIN }", "f");
        assert!(reads.names.is_empty());
    }

    #[test]
    fn test_locate_errors() {
        let file = syn::parse_file("fn g() {}").unwrap();
        let err = locate_in_file(&file, "f").unwrap_err();
        assert_eq!(err.found, 0);

        let file = syn::parse_file("fn f() {} mod m { fn f() {} }").unwrap();
        let err = locate_in_file(&file, "f").unwrap_err();
        assert_eq!(err.found, 2);
        assert_eq!(err.to_string(), "found 2 definitions of `f`, expected 1");
    }

    #[test]
    fn test_locate_nested() {
        let func: syn::ItemFn = syn::parse_str("fn f() { fn f() {} }").unwrap();
        assert_eq!(locate_in_fn(&func).unwrap_err().found, 2);

        let func: syn::ItemFn = syn::parse_str("fn f() { fn g() {} }").unwrap();
        assert!(locate_in_fn(&func).is_ok());
    }

    #[test]
    fn test_trait_default_methods() {
        let source = "trait T { fn f(&self) -> u8; } impl T for X { fn f(&self) -> u8 { 1 } }";
        let file = syn::parse_file(source).unwrap();
        assert!(locate_in_file(&file, "f").is_ok());
    }
}
