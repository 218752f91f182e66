//SPDX-License-Identifier: MIT OR Apache-2.0

//! Recognizes parameter types that carry an error.
//!
//! Exception parameters are left out of the template and passed through to the sink as
//! trailing context.  The macro only sees syntax, so the test is by name:
//! * `dyn Error` (any path ending in `Error`, with any extra bounds)
//! * any type path whose last segment ends in `Error`, such as `io::Error` or `ConfigError`
//! * either of the above behind `&`, `Box`, `Arc` or `Rc`
//!
//! `#[cause]` and `#[value]` on the parameter override the guess either way.

use syn::{GenericArgument, PathArguments, Type, TypeParamBound};

pub(crate) fn is_exception_like(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => is_exception_like(&reference.elem),
        Type::Paren(paren) => is_exception_like(&paren.elem),
        Type::Group(group) => is_exception_like(&group.elem),
        Type::TraitObject(object) => object.bounds.iter().any(|bound| match bound {
            TypeParamBound::Trait(bound) => bound
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident.to_string().ends_with("Error")),
            _ => false,
        }),
        Type::Path(path) if path.qself.is_none() => {
            let Some(last) = path.path.segments.last() else {
                return false;
            };
            let ident = last.ident.to_string();
            if matches!(ident.as_str(), "Box" | "Arc" | "Rc") {
                return first_type_argument(&last.arguments).is_some_and(is_exception_like);
            }
            ident.ends_with("Error")
        }
        _ => false,
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(arguments) = arguments else {
        return None;
    };
    arguments.args.iter().find_map(|argument| match argument {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn error_types() {
        let types: [Type; 8] = [
            parse_quote!(std::io::Error),
            parse_quote!(&std::io::Error),
            parse_quote!(&ConfigError),
            parse_quote!(&dyn std::error::Error),
            parse_quote!(&(dyn std::error::Error + Send + Sync)),
            parse_quote!(Box<dyn std::error::Error + Send + Sync + 'static>),
            parse_quote!(std::sync::Arc<ParseIntError>),
            parse_quote!(Rc<fmt::Error>),
        ];
        for ty in &types {
            assert!(is_exception_like(ty), "{}", quote::quote!(#ty));
        }
    }

    #[test]
    fn value_types() {
        let types: [Type; 8] = [
            parse_quote!(&str),
            parse_quote!(u64),
            parse_quote!(std::time::Duration),
            parse_quote!(Box<str>),
            parse_quote!(Arc<String>),
            parse_quote!(&dyn std::fmt::Debug),
            parse_quote!(ErrorCode),
            parse_quote!(<T as Trait>::Error),
        ];
        for ty in &types {
            assert!(!is_exception_like(ty), "{}", quote::quote!(#ty));
        }
    }
}
