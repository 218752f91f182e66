//SPDX-License-Identifier: MIT OR Apache-2.0

//! Validates a logging trait and generates its descriptor, facade and glue.

use crate::attrs::{EventAttr, InterfaceOptions, take_event_attr, take_param_attrs};
use crate::exception::is_exception_like;
use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::ext::IdentExt;
use syn::{FnArg, Ident, ItemTrait, LitStr, Pat, ReturnType, TraitItem, TraitItemFn, Type};

struct Method {
    ident: Ident,
    event: Option<EventAttr>,
    params: Vec<Param>,
}

struct Param {
    ident: Ident,
    ty: Type,
    key: String,
    is_exception: bool,
}

pub(crate) fn expand(options: InterfaceOptions, mut item: ItemTrait) -> syn::Result<TokenStream> {
    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "logging interfaces cannot be generic",
        ));
    }
    if let Some(unsafety) = &item.unsafety {
        return Err(syn::Error::new_spanned(unsafety, "logging interfaces cannot be unsafe"));
    }

    let mut methods = Vec::with_capacity(item.items.len());
    let mut errors: Option<syn::Error> = None;
    for trait_item in &mut item.items {
        let result = match trait_item {
            TraitItem::Fn(method) => Method::from_trait_fn(method),
            other => Err(syn::Error::new_spanned(
                &*other,
                "logging interfaces may only declare methods",
            )),
        };
        match result {
            Ok(method) => methods.push(method),
            Err(e) => match &mut errors {
                Some(existing) => existing.combine(e),
                None => errors = Some(e),
            },
        }
    }
    if let Some(errors) = errors {
        return Err(errors);
    }

    let vis = &item.vis;
    let trait_ident = &item.ident;
    let facade_ident = options
        .facade
        .unwrap_or_else(|| format_ident!("{}Facade", trait_ident));
    let interface_name = match &options.name {
        Some(name) => quote!(#name),
        None => {
            let trait_name = trait_ident.unraw().to_string();
            quote!(::core::concat!(::core::module_path!(), "::", #trait_name))
        }
    };

    let method_descriptors = methods.iter().map(Method::descriptor);
    let method_impls = methods.iter().enumerate().map(|(index, m)| m.facade_impl(index));
    let facade_doc = format!(
        "Implements [`{}`] by dispatching each call through a compiled table.",
        trait_ident.unraw()
    );

    Ok(quote! {
        #item

        #[doc = #facade_doc]
        #[derive(::core::fmt::Debug, ::core::clone::Clone)]
        #vis struct #facade_ident {
            table: ::eventwise::hidden::Arc<::eventwise::DispatchTable>,
        }

        impl #facade_ident {
            /// The table this facade dispatches through.
            #[allow(dead_code)]
            pub fn dispatch_table(&self) -> &::eventwise::DispatchTable {
                &self.table
            }
        }

        impl #trait_ident for #facade_ident {
            #(#method_impls)*
        }

        const _: () = {
            static INTERFACE: ::eventwise::InterfaceDescriptor<'static> =
                ::eventwise::InterfaceDescriptor {
                    name: #interface_name,
                    methods: &[#(#method_descriptors),*],
                };

            impl ::eventwise::LoggingInterface for dyn #trait_ident {
                type Facade = #facade_ident;

                fn interface() -> &'static ::eventwise::InterfaceDescriptor<'static> {
                    &INTERFACE
                }

                fn facade(
                    table: ::eventwise::hidden::Arc<::eventwise::DispatchTable>,
                ) -> Self::Facade {
                    #facade_ident { table }
                }
            }
        };
    })
}

impl Method {
    /// Checks the signature and strips the helper attributes from `method`.
    fn from_trait_fn(method: &mut TraitItemFn) -> syn::Result<Method> {
        let sig = &mut method.sig;
        if let Some(default) = &method.default {
            return Err(syn::Error::new_spanned(
                default,
                "logging methods cannot have a default body",
            ));
        }
        if let Some(constness) = &sig.constness {
            return Err(syn::Error::new_spanned(constness, "logging methods cannot be const"));
        }
        if let Some(asyncness) = &sig.asyncness {
            return Err(syn::Error::new_spanned(asyncness, "logging methods cannot be async"));
        }
        if let Some(unsafety) = &sig.unsafety {
            return Err(syn::Error::new_spanned(unsafety, "logging methods cannot be unsafe"));
        }
        if let Some(abi) = &sig.abi {
            return Err(syn::Error::new_spanned(abi, "logging methods cannot declare an ABI"));
        }
        if let Some(variadic) = &sig.variadic {
            return Err(syn::Error::new_spanned(variadic, "logging methods cannot be variadic"));
        }
        if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "logging methods cannot be generic",
            ));
        }
        match &sig.output {
            ReturnType::Default => {}
            ReturnType::Type(_, ty) if matches!(&**ty, Type::Tuple(t) if t.elems.is_empty()) => {}
            ReturnType::Type(_, ty) => {
                return Err(syn::Error::new_spanned(ty, "logging methods must return ()"));
            }
        }

        let takes_ref_self = matches!(
            sig.inputs.first(),
            Some(FnArg::Receiver(receiver))
                if receiver.reference.is_some()
                    && receiver.mutability.is_none()
                    && receiver.colon_token.is_none()
        );
        if !takes_ref_self {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "logging methods must take `&self`",
            ));
        }

        let mut params = Vec::with_capacity(sig.inputs.len() - 1);
        for input in sig.inputs.iter_mut().skip(1) {
            let FnArg::Typed(pat_type) = input else {
                return Err(syn::Error::new_spanned(input, "unexpected receiver"));
            };
            let attrs = take_param_attrs(&mut pat_type.attrs)?;
            let ident = match &*pat_type.pat {
                Pat::Ident(pat)
                    if pat.by_ref.is_none() && pat.mutability.is_none() && pat.subpat.is_none() =>
                {
                    pat.ident.clone()
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "logging method parameters must be plain identifiers",
                    ));
                }
            };
            if let Type::ImplTrait(ty) = &*pat_type.ty {
                return Err(syn::Error::new_spanned(
                    ty,
                    "logging method parameters cannot be `impl Trait`",
                ));
            }
            let is_exception = attrs.cause.is_some()
                || (attrs.value.is_none() && is_exception_like(&pat_type.ty));
            let key = match &attrs.key {
                Some(key) => key.value(),
                None => ident.unraw().to_string(),
            };
            params.push(Param {
                ty: (*pat_type.ty).clone(),
                ident,
                key,
                is_exception,
            });
        }

        let event = take_event_attr(&mut method.attrs)?;
        // Method ids are positions in the descriptor, which has no cfg of its own.
        if let Some(cfg) = method.attrs.iter().find(|attr| attr.path().is_ident("cfg")) {
            return Err(syn::Error::new_spanned(
                cfg,
                "logging methods cannot be conditionally compiled",
            ));
        }

        Ok(Method {
            ident: method.sig.ident.clone(),
            event,
            params,
        })
    }

    fn descriptor(&self) -> TokenStream {
        let name = self.ident.unraw().to_string();
        let metadata = match &self.event {
            None => quote!(::core::option::Option::None),
            Some(event) => {
                let event_name = optional_str(event.name.as_ref());
                let event_id = optional_str(event.id.as_ref());
                let level = match &event.level {
                    None => quote!(::eventwise::Level::Info),
                    Some(level) => {
                        let level_name = &level.name;
                        quote_spanned!(level.span=> ::eventwise::Level::from_name(#level_name))
                    }
                };
                quote! {
                    ::core::option::Option::Some(::eventwise::EventMetadata {
                        event_name: #event_name,
                        level: #level,
                        event_id: #event_id,
                    })
                }
            }
        };
        let parameters = self.params.iter().map(|param| {
            let key = &param.key;
            let is_exception = param.is_exception;
            quote! {
                ::eventwise::ParameterDescriptor { name: #key, is_exception: #is_exception }
            }
        });
        quote! {
            ::eventwise::MethodDescriptor {
                name: #name,
                metadata: #metadata,
                parameters: &[#(#parameters),*],
            }
        }
    }

    fn facade_impl(&self, index: usize) -> TokenStream {
        let ident = &self.ident;
        let inputs = self.params.iter().map(|param| {
            let ident = &param.ident;
            let ty = &param.ty;
            quote!(#ident: #ty)
        });
        let args = self.params.iter().map(|param| {
            let ident = &param.ident;
            quote!(&#ident as &dyn ::core::fmt::Debug)
        });
        quote! {
            #[inline]
            fn #ident(&self, #(#inputs),*) {
                self.table.dispatch(::eventwise::MethodId::new(#index), &[#(#args),*]);
            }
        }
    }
}

fn optional_str(value: Option<&LitStr>) -> TokenStream {
    match value {
        Some(value) => quote!(::core::option::Option::Some(#value)),
        None => quote!(::core::option::Option::None),
    }
}
