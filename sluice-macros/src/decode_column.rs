use proc_macro2::TokenStream;
use quote::ToTokens;
use sluice_core::matches_path;
use syn::{Field, Ident, LitStr, Type, parse::ParseBuffer};

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) nullable: bool,
    pub(crate) primary_key: bool,
    pub(crate) auto_increment: bool,
    pub(crate) default_on_zero: bool,
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    matches_path(&path.path, &["std", "option", "Option"])
}

fn require_flag(arg: &syn::meta::ParseNestedMeta, name: &str) {
    // value() is Err for Meta::Path
    let Err(..) = arg.value() else {
        panic!("Error while parsing `{name}`, use it like: `#[sluice({name})]`");
    };
}

/// Metadata of a persisted field, `None` when the field carries no `#[sluice]` attribute.
pub fn decode_column(field: &Field) -> Option<ColumnMetadata> {
    let ident = field
        .ident
        .clone()
        .expect("Field is expected to have a name");
    let mut name = ident.to_string();
    if name.starts_with('_') {
        name.remove(0);
    }
    let mut metadata = ColumnMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        nullable: is_option(&field.ty),
        primary_key: false,
        auto_increment: false,
        default_on_zero: false,
    };
    let mut persisted = false;
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("sluice") {
            continue;
        }
        persisted = true;
        if meta.require_path_only().is_ok() {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `sluice`, use it like: `#[sluice(attribute = value, ...)]`");
        };
        let parsed = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("column") {
                if arg.input.peek(syn::Token![=]) {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `column`, use it like: `#[sluice(column = \"my_column\")]`"
                        );
                    };
                    metadata.name = v.value();
                }
            } else if arg.path.is_ident("primary_key") {
                require_flag(&arg, "primary_key");
                metadata.primary_key = true;
            } else if arg.path.is_ident("auto_increment") {
                require_flag(&arg, "auto_increment");
                metadata.auto_increment = true;
            } else if arg.path.is_ident("default_on_zero") {
                require_flag(&arg, "default_on_zero");
                metadata.default_on_zero = true;
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
                "Error while parsing `sluice`: {e}, separate attributes with commas: `#[sluice(column = \"name\", primary_key)]`"
            );
        }
    }
    persisted.then_some(metadata)
}

impl ColumnMetadata {
    pub(crate) fn kind(&self) -> TokenStream {
        let ty = &self.ty;
        quote::quote!(<#ty as ::sluice::AsValue>::kind())
    }
}
