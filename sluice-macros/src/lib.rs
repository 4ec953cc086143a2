mod decode_column;
mod decode_table;

use decode_table::decode_table;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Implement `sluice::Record` for a struct with named fields.
///
/// Only fields annotated with `#[sluice(...)]` are persisted:
/// - `#[sluice(column)]` or `#[sluice(column = "name")]` maps the field, by default
///   to a column named after it.
/// - `primary_key`, `auto_increment` and `default_on_zero` flag the field.
///
/// On the struct `#[sluice(name = "table")]` overrides the table name, which
/// otherwise is the lower-cased struct name.
#[proc_macro_derive(Record, attributes(sluice))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let table = decode_table(item);
    let item = &table.item;
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let table_name = &table.name;
    let fields = table.columns.iter().map(|c| {
        let ident = &c.ident;
        let field_name = ident.to_string();
        let column = &c.name;
        let kind = c.kind();
        let nullable = c.nullable;
        let primary_key = c.primary_key;
        let auto_generated = c.auto_increment;
        let default_on_zero = c.default_on_zero;
        quote! {
            ::sluice::FieldDef {
                name: #field_name,
                column: #column,
                kind: #kind,
                nullable: #nullable,
                primary_key: #primary_key,
                auto_generated: #auto_generated,
                default_on_zero: #default_on_zero,
                get: |record: &Self| {
                    ::sluice::AsValue::as_value(::std::clone::Clone::clone(&record.#ident))
                },
                set: |record: &mut Self, value: ::sluice::Value| -> ::sluice::Result<()> {
                    record.#ident = ::sluice::AsValue::try_from_value(value)?;
                    ::std::result::Result::Ok(())
                },
            }
        }
    });
    quote! {
        impl #impl_generics ::sluice::Record for #name #ty_generics #where_clause {
            fn table_name() -> &'static str {
                #table_name
            }
            fn fields() -> ::std::vec::Vec<::sluice::FieldDef<Self>> {
                ::std::vec![#(#fields),*]
            }
        }
    }
    .into()
}
