use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta, Type};

/// Derive macro describing the CSV columns a record serializes to.
///
/// For each named field, extracts:
/// - Column name (respects `#[serde(rename = "...")]`)
/// - Whether the column is always populated (false for `Option<T>`)
/// - Description (from doc comments)
///
/// Generates `csv_columns() -> &'static [CsvColumn]` and `csv_header() -> String`.
/// `CsvColumn` is resolved from `crate::export`.
#[proc_macro_derive(CsvSchema, attributes(serde))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(name, "CsvSchema needs named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "CsvSchema only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let columns: Vec<_> = fields
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?;
            let column = serde_rename(&field.attrs).unwrap_or_else(|| ident.to_string());
            let always_present = !is_option(&field.ty);
            let description = doc_comment(&field.attrs);
            Some((column, always_present, description))
        })
        .collect();

    let names = columns.iter().map(|(column, _, _)| column.clone());
    let entries = columns.iter().map(|(column, always_present, description)| {
        quote! {
            crate::export::CsvColumn {
                name: #column,
                always_present: #always_present,
                description: #description,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn csv_columns() -> &'static [crate::export::CsvColumn] {
                static COLUMNS: &[crate::export::CsvColumn] = &[
                    #(#entries),*
                ];
                COLUMNS
            }

            pub fn csv_header() -> String {
                [#(#names),*].join(",")
            }
        }
    };

    TokenStream::from(expanded)
}

fn serde_rename(attrs: &[syn::Attribute]) -> Option<String> {
    let mut rename = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Lit::Str(s) = meta.value()?.parse::<Lit>()? {
                    rename = Some(s.value());
                }
            } else if meta.input.peek(syn::Token![=]) {
                // skip the value of other key = value attributes
                let _: Lit = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    rename
}

fn doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option"),
        _ => false,
    }
}
