//! Centralized path definitions for generated code.
//!
//! Generated code names everything through `::nestrow`, so deriving crates
//! only need the facade crate as a dependency. The facade declares
//! `extern crate self as nestrow` so the derive also works inside it.

use proc_macro2::TokenStream;
use quote::quote;

// =============================================================================
// STANDARD LIBRARY
// =============================================================================

pub mod std {
    use super::*;

    pub fn result() -> TokenStream {
        quote!(::std::result::Result)
    }

    pub fn vec() -> TokenStream {
        quote!(::std::vec)
    }

    pub fn type_name() -> TokenStream {
        quote!(::std::any::type_name)
    }
}

// =============================================================================
// MAPPING TYPES AND TRAITS
// =============================================================================

pub mod nestrow {
    use super::*;

    pub fn target() -> TokenStream {
        quote!(::nestrow::Target)
    }

    pub fn shape() -> TokenStream {
        quote!(::nestrow::Shape)
    }

    pub fn field_def() -> TokenStream {
        quote!(::nestrow::FieldDef)
    }

    pub fn slot() -> TokenStream {
        quote!(::nestrow::Slot)
    }

    pub fn result() -> TokenStream {
        quote!(::nestrow::Result)
    }
}
