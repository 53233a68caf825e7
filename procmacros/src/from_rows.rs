//! `#[derive(FromRows)]`: implements `Target` for a record struct.
//!
//! The generated `shape()` lists the struct's fields in declaration order,
//! each with the shape of its type. `from_slot()` reads the fields back by
//! the same positions.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Result, parse_quote};

use crate::common::{extract_named_fields, parse_column_attr};
use crate::paths::{nestrow as paths, std as std_paths};

pub(crate) fn generate_from_rows(input: &DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let fields = extract_named_fields(input)?;
    let target = paths::target();

    // type parameters are mapped through their own Target impls
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#target));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let shape = paths::shape();
    let field_def = paths::field_def();
    let slot = paths::slot();
    let result = paths::result();
    let ok = std_paths::result();
    let vec = std_paths::vec();
    let type_name = std_paths::type_name();

    let mut defs = Vec::with_capacity(fields.len());
    let mut reads = Vec::with_capacity(fields.len());
    for (pos, field) in fields.iter().enumerate() {
        let attr = parse_column_attr(field)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let name = match &attr.name {
            Some(lit) => lit.value(),
            None => ident.unraw().to_string(),
        };
        let delimiter = attr
            .delimiter
            .as_ref()
            .map(|lit| quote! { .with_delimiter(#lit) });

        defs.push(quote! {
            #field_def::new(#name, <#ty as #target>::shape()) #delimiter
        });
        reads.push(quote! {
            #ident: record.field::<#ty>(#pos)?,
        });
    }

    Ok(quote! {
        impl #impl_generics #target for #struct_name #ty_generics #where_clause {
            fn shape() -> #shape {
                #shape::record::<Self>(|| #vec![#(#defs),*])
            }

            fn from_slot(slot: #slot<'_>) -> #result<Self> {
                let record = slot.into_record(#type_name::<Self>())?;
                #ok::Ok(Self {
                    #(#reads)*
                })
            }
        }
    })
}
