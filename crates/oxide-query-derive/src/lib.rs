//! Derive macros mapping Rust structs onto `oxide-query` tables.
//!
//! This crate provides the `#[derive(Table)]` macro, which generates the
//! table metadata, record values and typed column markers used by
//! `oxide-query-core`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type};

/// Derives `Mapped` and `Record` for a struct and generates its column
/// markers.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - Adds the field to the primary key, in
///   declaration order
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(nullable)]` - Marks the column as nullable even when the Rust
///   type is not an `Option`
/// - `#[column(generated)]` - Marks a generated column, never written by
///   INSERT, REPLACE or UPDATE
///
/// # Generated Items
///
/// For a struct `User`, this macro generates:
///
/// - `impl Mapped for User` and `impl Record for User`
/// - `UserColumns` - A module containing column markers (`Id`, `Name`, etc.)
/// - Column accessor functions on `User` returning a `ColumnRef`
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_table_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_table_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Table derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Table derive only supports structs",
            ));
        }
    };

    let mut column_infos: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let field_name = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let column_attrs = parse_column_attrs(&field.attrs)?;

        column_infos.push(ColumnInfo {
            column_name: column_attrs
                .name
                .unwrap_or_else(|| field_name.to_string()),
            field_name,
            field_type: field.ty.clone(),
            is_primary_key: column_attrs.primary_key,
            is_nullable: column_attrs.nullable,
            is_generated: column_attrs.generated,
        });
    }

    let core = quote!(::oxide_query_core);

    // Column marker names (PascalCase)
    let column_type_names: Vec<Ident> = column_infos
        .iter()
        .map(|c| format_ident!("{}", to_pascal_case(&c.field_name.to_string())))
        .collect();

    let columns_mod_name = format_ident!("{}Columns", struct_name);

    let column_structs: Vec<TokenStream2> = column_infos
        .iter()
        .zip(column_type_names.iter())
        .map(|(info, type_name)| {
            let member = info.field_name.to_string();
            let field_type = &info.field_type;

            quote! {
                /// Column marker for compile-time checked queries.
                #[derive(Debug, Clone, Copy)]
                pub struct #type_name;

                impl #core::schema::Column for #type_name {
                    type Table = super::#struct_name;
                    type Type = #field_type;

                    const MEMBER: &'static str = #member;
                }
            }
        })
        .collect();

    let column_accessors: Vec<TokenStream2> = column_infos
        .iter()
        .zip(column_type_names.iter())
        .map(|(info, type_name)| {
            let method_name = &info.field_name;
            quote! {
                /// Returns a reference to this column.
                #[inline]
                #[must_use]
                pub fn #method_name() -> #core::ast::ColumnRef {
                    #core::builder::col::<#columns_mod_name::#type_name>()
                }
            }
        })
        .collect();

    let descriptor_entries: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let member = info.field_name.to_string();
            let col_name = &info.column_name;
            let field_type = &info.field_type;
            let adder = if info.is_primary_key {
                format_ident!("key_column")
            } else {
                format_ident!("column")
            };
            let nullable = info.is_nullable.then(|| quote!(.nullable()));
            let generated = info.is_generated.then(|| quote!(.generated()));

            quote! {
                .#adder(
                    #core::schema::ColumnDescriptor::of::<#field_type>(#member, #col_name)
                        #nullable
                        #generated
                )
            }
        })
        .collect();

    let record_values: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let member = info.field_name.to_string();
            let field_name = &info.field_name;
            quote! {
                (
                    #member,
                    #core::value::Bindable::new(::std::clone::Clone::clone(&self.#field_name)),
                )
            }
        })
        .collect();

    let expanded = quote! {
        /// Column markers generated by `#[derive(Table)]`.
        #[allow(non_snake_case)]
        pub mod #columns_mod_name {
            #[allow(unused_imports)]
            use super::*;

            #(#column_structs)*
        }

        impl #core::schema::Mapped for #struct_name {
            fn descriptor() -> #core::schema::TableDescriptor {
                #core::schema::TableDescriptor::new(#table_name)
                    #(#descriptor_entries)*
            }
        }

        impl #core::schema::Record for #struct_name {
            fn values(
                &self,
            ) -> ::std::vec::Vec<(#core::schema::ColumnId, #core::value::Bindable)> {
                ::std::vec![#(#record_values),*]
            }
        }

        impl #struct_name {
            #(#column_accessors)*
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    is_primary_key: bool,
    is_nullable: bool,
    is_generated: bool,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    nullable: bool,
    generated: bool,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("table") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    table_name = Some(string_value(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute"))
                }
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    // Default to snake_case of struct name
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("nullable") {
                    result.nullable = true;
                } else if meta.path.is_ident("generated") {
                    result.generated = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unsupported column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

fn to_pascal_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}
