//! Derive macros for Reducible
//!
//! This crate provides procedural macros to reduce boilerplate when wiring
//! actions and states into a `reducible_runtime::Store`.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `reducible_core::action::Action` for action enums
//! - `#[derive(State)]` - Implements `reducible_core::state::Persistent` for state structs
//!
//! # Example
//!
//! ```ignore
//! use reducible_macros::{Action, State};
//!
//! #[derive(Action, Clone, Debug)]
//! enum NotesAction {
//!     Append { text: String },
//!
//!     #[transient]
//!     Select(usize),
//! }
//!
//! #[derive(State, Clone, Debug, Default)]
//! struct NotesState {
//!     #[persist]
//!     entries: Vec<String>,
//!     selected: Option<usize>,
//! }
//!
//! // Generated methods:
//! assert_eq!(NotesAction::Select(0).name(), "Select");
//! assert!(NotesAction::Select(0).is_transient());
//! assert!(!NotesAction::Append { text: "x".into() }.is_transient());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Index, parse_macro_input};

/// Derive macro for Action enums
///
/// Implements `reducible_core::action::Action`:
/// - `name()` - Returns the variant name (for logs and metric labels)
/// - `is_transient()` - Returns true for variants marked `#[transient]`
///
/// # Attributes
///
/// - `#[transient]` - Mark a variant as touching only non-persisted state;
///   the store skips the storage write-back after it
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if applied
/// to a non-enum type.
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum ListAction {
///     Add { text: String },
///     Remove(u32),
///     #[transient]
///     Highlight(u32),
/// }
///
/// assert_eq!(ListAction::Remove(1).name(), "Remove");
/// assert!(ListAction::Highlight(1).is_transient());
/// ```
#[proc_macro_derive(Action, attributes(transient))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut name_arms = Vec::new();
    let mut transient_arms = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let label = variant_name.to_string();
        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
            Fields::Unit => quote! { Self::#variant_name },
        };

        name_arms.push(quote! { #pattern => #label, });

        if has_attribute(&variant.attrs, "transient") {
            transient_arms.push(quote! { #pattern => true, });
        }
    }

    // An empty enum has no values, so `name` can never be called.
    let name_body = if name_arms.is_empty() {
        quote! { match *self {} }
    } else {
        quote! {
            match self {
                #(#name_arms)*
            }
        }
    };

    let expanded = quote! {
        impl #impl_generics ::reducible_core::action::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                #name_body
            }

            #[allow(unreachable_patterns)]
            fn is_transient(&self) -> bool {
                match self {
                    #(#transient_arms)*
                    _ => false,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for State structs
///
/// Implements `reducible_core::state::Persistent` using the field marked
/// `#[persist]` as the snapshot. Every other field is transient and keeps
/// its seed value when a snapshot is restored.
///
/// # Attributes
///
/// - `#[persist]` - Mark exactly one field as the persisted part of the state
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-struct type
/// - No field, or more than one field, is marked `#[persist]`
///
/// # Example
///
/// ```ignore
/// #[derive(State, Clone, Debug, Default)]
/// struct BoardState {
///     #[persist]
///     cards: Vec<Card>,
///     dragging: Option<usize>,
/// }
/// ```
#[proc_macro_derive(State, attributes(persist))]
pub fn derive_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(State)] can only be used on structs")
            .to_compile_error()
            .into();
    };

    let persisted: Vec<_> = data_struct
        .fields
        .iter()
        .enumerate()
        .filter(|(_, field)| has_attribute(&field.attrs, "persist"))
        .collect();

    let [(position, field)] = persisted.as_slice() else {
        return syn::Error::new_spanned(
            name,
            "#[derive(State)] requires exactly one field marked #[persist]",
        )
        .to_compile_error()
        .into();
    };

    let ty = &field.ty;
    let accessor = field.ident.as_ref().map_or_else(
        || {
            let index = Index::from(*position);
            quote! { #index }
        },
        |ident| quote! { #ident },
    );

    let expanded = quote! {
        impl #impl_generics ::reducible_core::state::Persistent for #name #ty_generics #where_clause {
            type Snapshot = #ty;

            fn snapshot(&self) -> &Self::Snapshot {
                &self.#accessor
            }

            fn restore(&mut self, snapshot: Self::Snapshot) {
                self.#accessor = snapshot;
            }
        }
    };

    TokenStream::from(expanded)
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

