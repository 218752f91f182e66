//SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing for the attribute arguments and the helper attributes inside the trait.

use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::parse::ParseStream;
use syn::spanned::Spanned;
use syn::{Attribute, Ident, LitStr, Meta, Token};

/// Arguments of `#[logging_interface(...)]` itself.
#[derive(Default)]
pub(crate) struct InterfaceOptions {
    pub(crate) name: Option<LitStr>,
    pub(crate) facade: Option<Ident>,
}

impl InterfaceOptions {
    pub(crate) fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            let value: LitStr = meta.value()?.parse()?;
            if value.value().is_empty() {
                return Err(syn::Error::new_spanned(value, "interface name cannot be empty"));
            }
            set_once(&mut self.name, value, meta.path.span(), "name")
        } else if meta.path.is_ident("facade") {
            let value: Ident = meta.value()?.parse()?;
            set_once(&mut self.facade, value, meta.path.span(), "facade")
        } else {
            Err(meta.error("unsupported logging_interface argument; expected `name` or `facade`"))
        }
    }
}

/// A level written either as a bare identifier (`Warn`) or a string (`"WARN"`).
pub(crate) struct LevelName {
    pub(crate) name: String,
    pub(crate) span: Span,
}

/// The contents of a method's `#[event(...)]`.
#[derive(Default)]
pub(crate) struct EventAttr {
    pub(crate) name: Option<LitStr>,
    pub(crate) level: Option<LevelName>,
    pub(crate) id: Option<LitStr>,
}

/// Removes `#[event]` from `attrs` and parses it.  At most one is allowed per method.
pub(crate) fn take_event_attr(attrs: &mut Vec<Attribute>) -> syn::Result<Option<EventAttr>> {
    let mut found: Option<EventAttr> = None;
    let mut error: Option<syn::Error> = None;
    attrs.retain(|attr| {
        if !attr.path().is_ident("event") {
            return true;
        }
        let parsed = if found.is_some() {
            Err(syn::Error::new_spanned(attr, "duplicate #[event] attribute"))
        } else {
            parse_event_attr(attr)
        };
        match parsed {
            Ok(event) => found = Some(event),
            Err(e) => combine(&mut error, e),
        }
        false
    });
    match error {
        Some(error) => Err(error),
        None => Ok(found),
    }
}

fn parse_event_attr(attr: &Attribute) -> syn::Result<EventAttr> {
    match &attr.meta {
        Meta::Path(_) => Ok(EventAttr::default()),
        Meta::NameValue(nv) => Err(syn::Error::new_spanned(
            nv,
            "expected #[event], #[event(\"name\")] or #[event(key = value, ...)]",
        )),
        Meta::List(_) => attr.parse_args_with(parse_event_args),
    }
}

fn parse_event_args(input: ParseStream) -> syn::Result<EventAttr> {
    let mut event = EventAttr::default();
    if input.peek(LitStr) {
        event.name = Some(input.parse()?);
        if input.is_empty() {
            return Ok(event);
        }
        input.parse::<Token![,]>()?;
    }
    while !input.is_empty() {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        match key.to_string().as_str() {
            "name" => {
                let value: LitStr = input.parse()?;
                set_once(&mut event.name, value, key.span(), "name")?;
            }
            "level" => {
                let level = if input.peek(LitStr) {
                    let lit: LitStr = input.parse()?;
                    LevelName {
                        name: lit.value(),
                        span: lit.span(),
                    }
                } else {
                    let ident: Ident = input.parse()?;
                    LevelName {
                        name: ident.to_string(),
                        span: ident.span(),
                    }
                };
                set_once(&mut event.level, level, key.span(), "level")?;
            }
            "id" => {
                let value: LitStr = input.parse()?;
                set_once(&mut event.id, value, key.span(), "id")?;
            }
            _ => {
                return Err(syn::Error::new(
                    key.span(),
                    "unsupported event argument; expected `name`, `level` or `id`",
                ));
            }
        }
        if input.is_empty() {
            break;
        }
        input.parse::<Token![,]>()?;
    }
    Ok(event)
}

/// Helper attributes found on one parameter.
#[derive(Default)]
pub(crate) struct ParamAttrs {
    pub(crate) cause: Option<Span>,
    pub(crate) value: Option<Span>,
    pub(crate) key: Option<LitStr>,
}

/// Removes `#[cause]`, `#[value]` and `#[key = "..."]` from `attrs` and parses them.
pub(crate) fn take_param_attrs(attrs: &mut Vec<Attribute>) -> syn::Result<ParamAttrs> {
    let mut found = ParamAttrs::default();
    let mut error: Option<syn::Error> = None;
    attrs.retain(|attr| {
        let path = attr.path();
        let parsed = if path.is_ident("cause") {
            attr.meta
                .require_path_only()
                .and_then(|p| set_once(&mut found.cause, p.span(), p.span(), "cause"))
        } else if path.is_ident("value") {
            attr.meta
                .require_path_only()
                .and_then(|p| set_once(&mut found.value, p.span(), p.span(), "value"))
        } else if path.is_ident("key") {
            parse_key_attr(attr)
                .and_then(|lit| set_once(&mut found.key, lit, path.span(), "key"))
        } else {
            return true;
        };
        if let Err(e) = parsed {
            combine(&mut error, e);
        }
        false
    });
    if let (Some(_), Some(value)) = (found.cause, found.value) {
        combine(
            &mut error,
            syn::Error::new(value, "a parameter cannot be both #[cause] and #[value]"),
        );
    }
    match error {
        Some(error) => Err(error),
        None => Ok(found),
    }
}

fn parse_key_attr(attr: &Attribute) -> syn::Result<LitStr> {
    let nv = attr.meta.require_name_value()?;
    let syn::Expr::Lit(syn::ExprLit {
        lit: syn::Lit::Str(lit),
        ..
    }) = &nv.value
    else {
        return Err(syn::Error::new_spanned(&nv.value, "expected #[key = \"...\"]"));
    };
    if lit.value().is_empty() {
        return Err(syn::Error::new_spanned(lit, "key cannot be empty"));
    }
    Ok(lit.clone())
}

fn set_once<T>(slot: &mut Option<T>, value: T, span: Span, what: &str) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(span, format!("duplicate `{what}`")));
    }
    *slot = Some(value);
    Ok(())
}

fn combine(slot: &mut Option<syn::Error>, error: syn::Error) {
    match slot {
        Some(existing) => existing.combine(error),
        None => *slot = Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn event_of(attrs: Vec<Attribute>) -> syn::Result<Option<EventAttr>> {
        let mut attrs = attrs;
        let event = take_event_attr(&mut attrs);
        assert!(attrs.iter().all(|a| !a.path().is_ident("event")));
        event
    }

    #[test]
    fn bare_event() {
        let event = event_of(vec![parse_quote!(#[event])]).unwrap().unwrap();
        assert!(event.name.is_none());
        assert!(event.level.is_none());
        assert!(event.id.is_none());
    }

    #[test]
    fn positional_name_with_level() {
        let event = event_of(vec![parse_quote!(#[event("saved invoice summary", level = Warn)])])
            .unwrap()
            .unwrap();
        assert_eq!(event.name.unwrap().value(), "saved invoice summary");
        assert_eq!(event.level.unwrap().name, "Warn");
    }

    #[test]
    fn named_arguments() {
        let event = event_of(vec![parse_quote!(
            #[event(name = "problem", level = "ERROR", id = "INVOICEAPP-1001")]
        )])
        .unwrap()
        .unwrap();
        assert_eq!(event.name.unwrap().value(), "problem");
        assert_eq!(event.level.unwrap().name, "ERROR");
        assert_eq!(event.id.unwrap().value(), "INVOICEAPP-1001");
    }

    #[test]
    fn other_attributes_survive() {
        let mut attrs: Vec<Attribute> = vec![parse_quote!(#[doc = "x"]), parse_quote!(#[event])];
        take_event_attr(&mut attrs).unwrap();
        assert_eq!(attrs.len(), 1);
        assert!(attrs[0].path().is_ident("doc"));
    }

    #[test]
    fn event_errors() {
        assert!(event_of(vec![parse_quote!(#[event]), parse_quote!(#[event])]).is_err());
        assert!(event_of(vec![parse_quote!(#[event(colour = "red")])]).is_err());
        assert!(event_of(vec![parse_quote!(#[event(level = Warn, level = Info)])]).is_err());
        assert!(event_of(vec![parse_quote!(#[event("a", name = "b")])]).is_err());
        assert!(event_of(vec![parse_quote!(#[event = "a"])]).is_err());
    }

    #[test]
    fn parameter_attributes() {
        let mut attrs: Vec<Attribute> = vec![parse_quote!(#[cause]), parse_quote!(#[key = "invoiceId"])];
        let parsed = take_param_attrs(&mut attrs).unwrap();
        assert!(attrs.is_empty());
        assert!(parsed.cause.is_some());
        assert!(parsed.value.is_none());
        assert_eq!(parsed.key.unwrap().value(), "invoiceId");

        let mut both: Vec<Attribute> = vec![parse_quote!(#[cause]), parse_quote!(#[value])];
        assert!(take_param_attrs(&mut both).is_err());

        let mut empty_key: Vec<Attribute> = vec![parse_quote!(#[key = ""])];
        assert!(take_param_attrs(&mut empty_key).is_err());
    }
}
