use crate::decode_column::{ColumnMetadata, decode_column};
use convert_case::{Case, Casing};
use quote::ToTokens;
use syn::{ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) columns: Vec<ColumnMetadata>,
    pub(crate) name: String,
    pub(crate) item: ItemStruct,
}

pub fn decode_table(item: ItemStruct) -> TableMetadata {
    let columns: Vec<_> = item.fields.iter().filter_map(decode_column).collect();
    let mut name = item.ident.to_string().to_case(Case::Flat);
    if name.starts_with('_') {
        name.remove(0);
    }
    for attr in &item.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("sluice") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `sluice`, use it like: `#[sluice(attribute = value, ..)]`",);
            };
            let parsed = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `name`, use it like: `#[sluice(name = \"my_table\")]`"
                        );
                    };
                    name = value.value();
                } else {
                    panic!(
                        "Unknown attribute `{}` inside sluice macro",
                        arg.path.to_token_stream().to_string()
                    );
                }
                Ok(())
            });
            if let Err(e) = parsed {
                panic!(
                    "Error while parsing `sluice`: {e}, use it like: `#[sluice(name = \"my_table\")]`"
                );
            }
        }
    }
    let keys: Vec<_> = columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name.as_str())
        .collect();
    if keys.len() > 1 {
        panic!(
            "Table `{name}` declares more than one primary key ({}), only one field can be `#[sluice(primary_key)]`",
            keys.join(", ")
        );
    }
    TableMetadata {
        columns,
        name,
        item,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn table_name() {
        let table = decode_table(parse_quote! {
            struct UserAccount {
                #[sluice(column)]
                id: i64,
                cache: String,
            }
        });
        assert_eq!(table.name, "useraccount");
        assert_eq!(table.columns.len(), 1);

        let table = decode_table(parse_quote! {
            #[sluice(name = "audit_log")]
            struct Audit {}
        });
        assert_eq!(table.name, "audit_log");
    }

    #[test]
    #[should_panic(expected = "Error while parsing `sluice`")]
    fn trailing_tokens_are_rejected() {
        decode_table(parse_quote! {
            #[sluice(name = "a" "b")]
            struct Audit {}
        });
    }
}
