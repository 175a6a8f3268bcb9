use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, LitStr, Meta, Token, Type};

/// Derive macro that generates CSV column schema information from struct fields.
///
/// For each field, extracts:
/// - Column name (field name, or `#[csv(name = "...")]`)
/// - Required (true if not Option<T>)
/// - Description (from doc comments)
/// - Header aliases (`#[csv(aliases("cuenta", "codigo"))]`), matched against
///   normalised header text when detecting columns in a file
///
/// Generates a `csv_schema() -> &'static [CsvField]` method.
#[proc_macro_derive(CsvSchema, attributes(csv))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("CsvSchema only supports structs with named fields"),
        },
        _ => panic!("CsvSchema only supports structs"),
    };

    let mut field_info = Vec::new();
    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .map(|ident| ident.to_string())
            .unwrap_or_default();
        let column = match parse_csv_attr(&field.attrs) {
            Ok(column) => column,
            Err(err) => return err.to_compile_error().into(),
        };
        let csv_name = column.name.unwrap_or(field_name);
        let is_optional = is_option_type(&field.ty);
        let doc = get_doc_comment(&field.attrs);
        field_info.push((csv_name, !is_optional, doc, column.aliases));
    }

    let field_entries = field_info.iter().map(|(name, required, desc, aliases)| {
        quote! {
            CsvField {
                name: #name,
                required: #required,
                description: #desc,
                aliases: &[#(#aliases),*],
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn csv_schema() -> &'static [CsvField] {
                static SCHEMA: &[CsvField] = &[
                    #(#field_entries),*
                ];
                SCHEMA
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct ColumnAttr {
    name: Option<String>,
    aliases: Vec<String>,
}

fn parse_csv_attr(attrs: &[syn::Attribute]) -> syn::Result<ColumnAttr> {
    let mut column = ColumnAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("csv") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                column.name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("aliases") {
                let content;
                syn::parenthesized!(content in meta.input);
                let lits = content.parse_terminated(|input| input.parse::<LitStr>(), Token![,])?;
                column.aliases.extend(lits.iter().map(LitStr::value));
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"` or `aliases(...)`"))
            }
        })?;
    }
    Ok(column)
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
