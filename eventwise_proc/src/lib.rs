//SPDX-License-Identifier: MIT OR Apache-2.0

//! # eventwise procedural macros
//!
//! This crate provides `#[logging_interface]`, the attribute that turns a trait into an
//! eventwise logging interface.  Use it through the `eventwise` crate, which re-exports it.
//!
//! ## Architecture
//!
//! The attribute does no template work itself.  It reads the trait once and emits three things
//! next to it:
//! 1. **A descriptor**: a `static InterfaceDescriptor` listing each method, its `#[event]`
//!    metadata and its parameters in declaration order, with exception parameters flagged
//! 2. **A facade**: `{Trait}Facade`, a cheap `Clone` wrapper over a compiled `DispatchTable`,
//!    implementing the trait by forwarding each call to the table by position
//! 3. **The glue**: `impl eventwise::LoggingInterface for dyn Trait`, so the factory functions
//!    can find both of the above from the trait alone
//!
//! Templates are produced at runtime, when the descriptor is compiled against the process's
//! configuration.
//!
//! ## Usage Example
//!
//! ```ignore
//! # // ignore because: the attribute expands to paths in the eventwise crate
//! #[eventwise::logging_interface]
//! pub trait InvoiceEvents {
//!     #[event("saved invoice summary")]
//!     fn updated_invoice(&self, invoice_title: &str, invoice_id: u64);
//! }
//!
//! // Expands to approximately:
//! // pub trait InvoiceEvents { fn updated_invoice(&self, invoice_title: &str, invoice_id: u64); }
//! // pub struct InvoiceEventsFacade { table: Arc<DispatchTable> }
//! // impl InvoiceEvents for InvoiceEventsFacade {
//! //     fn updated_invoice(&self, invoice_title: &str, invoice_id: u64) {
//! //         self.table.dispatch(MethodId::new(0), &[&invoice_title, &invoice_id]);
//! //     }
//! // }
//! // impl LoggingInterface for dyn InvoiceEvents { ... }
//! ```
//!
//! ## Attributes
//!
//! On the trait, `#[logging_interface(name = "...", facade = Ident)]` overrides the
//! interface name (default `module_path!()::Trait`) and the facade's type name.
//!
//! On a method, `#[event]` takes an optional leading event name and then any of
//! `name = "..."`, `level = Warn` (or `level = "WARN"`), and `id = "..."`.
//!
//! On a parameter, `#[cause]` forces exception treatment, `#[value]` suppresses it, and
//! `#[key = "..."]` renames the key in the template.

use proc_macro::TokenStream;

mod attrs;
mod exception;
mod expand;

/**
Declares a trait as a logging interface.

Every method must take `&self`, return `()`, declare no generics and have no default body.
Parameters must be plain identifiers.

```ignore
# // ignore because: the attribute expands to paths in the eventwise crate
#[eventwise::logging_interface]
pub trait InvoiceEvents {
    fn lookup_invoices(&self, user: &str, business_date: &str, company: &str);

    #[event(level = Error, id = "INVOICEAPP-1001")]
    fn problem_saving_record(&self, invoice_id: u64, cause: &std::io::Error);
}
```
*/
#[proc_macro_attribute]
pub fn logging_interface(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut options = attrs::InterfaceOptions::default();
    let parser = syn::meta::parser(|meta| options.parse(meta));
    syn::parse_macro_input!(attr with parser);
    let item = syn::parse_macro_input!(item as syn::ItemTrait);
    match expand::expand(options, item) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}
