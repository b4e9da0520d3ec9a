//! Procedural macros for **findex**
#![forbid(unsafe_code)]

use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro_error::{abort, proc_macro_error};
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Fields, FieldsNamed, FieldsUnnamed, FnArg,
    GenericArgument, ItemFn, Lit, LitStr, Meta, MetaNameValue, Pat, PatIdent, PatType,
    PathArguments, ReturnType, Signature, Type, TypePath, parse_macro_input,
};

// ============================================================================
// FUNCTION SCHEMA DERIVE MACRO
// ============================================================================

#[proc_macro_error]
#[proc_macro_derive(FunctionSchema, attributes(serde))]
pub fn derive_function_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => generate_struct_schema(&input, fields),
            Fields::Unnamed(fields) => generate_tuple_struct_schema(&input, fields),
            Fields::Unit => generate_unit_struct_schema(&input),
        },
        Data::Enum(_) => {
            abort!(input.ident, "Enum schemas are not yet supported");
        }
        Data::Union(_) => {
            abort!(input.ident, "Union schemas are not supported");
        }
    }
}

/// Wraps a schema expression in a `Lazy` cache when the type is not generic.
/// A static inside a generic impl would be shared by every instantiation.
fn cached(input: &DeriveInput, body: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    let crate_path = get_crate_path();
    if input.generics.params.is_empty() {
        quote! {
            static SCHEMA: #crate_path::once_cell::sync::Lazy<::serde_json::Value> =
                #crate_path::once_cell::sync::Lazy::new(|| { #body });
            SCHEMA.clone()
        }
    } else {
        body
    }
}

fn generate_struct_schema(input: &DeriveInput, fields: &FieldsNamed) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let crate_path = get_crate_path();

    let mut field_names = Vec::new();
    let mut field_types = Vec::new();
    let mut field_docs = Vec::new();
    let mut required_fields = Vec::new();

    for field in &fields.named {
        let Some(field_name) = field.ident.as_ref() else {
            abort!(field, "named field without an identifier");
        };
        let field_name_str = serde_rename(&field.attrs).unwrap_or_else(|| field_name.to_string());

        if option_inner(&field.ty).is_none() {
            required_fields.push(field_name_str.clone());
        }

        field_names.push(field_name_str);
        field_types.push(&field.ty);
        field_docs.push(docs(&field.attrs));
    }

    let body = quote! {
        let mut properties = ::serde_json::Map::new();
        #({
            let mut schema = <#field_types as #crate_path::FunctionSchema>::schema();
            if !#field_docs.is_empty() {
                if let ::serde_json::Value::Object(map) = &mut schema {
                    map.insert("description".to_string(), ::serde_json::Value::from(#field_docs));
                }
            }
            properties.insert(#field_names.to_string(), schema);
        })*

        ::serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": [#(#required_fields),*]
        })
    };
    let body = cached(input, body);

    TokenStream::from(quote! {
        impl #impl_generics #crate_path::FunctionSchema for #name #ty_generics #where_clause {
            fn schema() -> ::serde_json::Value {
                #body
            }
        }
    })
}

fn generate_tuple_struct_schema(input: &DeriveInput, fields: &FieldsUnnamed) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let crate_path = get_crate_path();

    let field_types: Vec<_> = fields.unnamed.iter().map(|f| &f.ty).collect();

    // A newtype serialises as its inner value.
    let body = if let [inner] = field_types.as_slice() {
        quote! { <#inner as #crate_path::FunctionSchema>::schema() }
    } else {
        let field_count = field_types.len();
        quote! {
            ::serde_json::json!({
                "type": "array",
                "prefixItems": [#(<#field_types as #crate_path::FunctionSchema>::schema()),*],
                "minItems": #field_count,
                "maxItems": #field_count
            })
        }
    };
    let body = cached(input, body);

    TokenStream::from(quote! {
        impl #impl_generics #crate_path::FunctionSchema for #name #ty_generics #where_clause {
            fn schema() -> ::serde_json::Value {
                #body
            }
        }
    })
}

fn generate_unit_struct_schema(input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let crate_path = get_crate_path();

    TokenStream::from(quote! {
        impl #impl_generics #crate_path::FunctionSchema for #name #ty_generics #where_clause {
            fn schema() -> ::serde_json::Value {
                ::serde_json::json!({ "type": "null" })
            }
        }
    })
}

fn get_crate_path() -> proc_macro2::TokenStream {
    for candidate in ["findex_core", "findex-rs"] {
        match crate_name(candidate) {
            Ok(FoundCrate::Itself) => return quote!(crate),
            Ok(FoundCrate::Name(name)) => {
                let ident = Ident::new(&name, Span::call_site());
                return quote!(::#ident);
            }
            Err(_) => continue,
        }
    }
    quote!(::findex_core)
}

/// The `T` of an `Option<T>`. Such fields and parameters are not required.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let idents: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    let idents: Vec<&str> = idents.iter().map(String::as_str).collect();
    if !matches!(idents.as_slice(), ["Option"] | ["std" | "core", "option", "Option"]) {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &path.segments.last()?.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn docs(attrs: &[Attribute]) -> String {
    let mut lines = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("doc")) {
        if let Meta::NameValue(MetaNameValue {
            value: Expr::Lit(ExprLit {
                lit: Lit::Str(line),
                ..
            }),
            ..
        }) = &attr.meta
        {
            lines.push(line.value().trim().to_string());
        }
    }
    lines.join("\n").trim().to_string()
}

/// `#[serde(rename = "...")]` on a field, so the schema uses the serialised key.
fn serde_rename(attrs: &[Attribute]) -> Option<String> {
    let mut rename = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        // unknown serde options are skipped, serde reports its own errors
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                let name: LitStr = meta.value()?.parse()?;
                rename = Some(name.value());
            } else if meta.input.peek(syn::Token![=]) {
                meta.value()?.parse::<Expr>()?;
            } else if meta.input.peek(syn::token::Paren) {
                let content;
                syn::parenthesized!(content in meta.input);
                content.parse::<proc_macro2::TokenStream>()?;
            }
            Ok(())
        });
    }
    rename
}

// ============================================================================
// INDEXED ATTRIBUTE MACRO
// ============================================================================

/// Registers a free function in the link-time catalog so that
/// `FunctionIndexer::collect_functions` and `index_module` can find it.
///
/// The generated invoker accepts its arguments as a JSON object keyed by
/// parameter name, or as a positional array.
#[proc_macro_error]
#[proc_macro_attribute]
pub fn indexed(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let func: ItemFn = parse_macro_input!(item);
    let sig = &func.sig;
    let fn_name = &sig.ident;
    let fn_name_str = fn_name.to_string();
    let doc_lit = LitStr::new(&docs(&func.attrs), Span::call_site());

    let (idents, types): (Vec<_>, Vec<_>) = match parameters(sig) {
        Ok(params) => params.into_iter().unzip(),
        Err(err) => abort!(err.span(), "{}", err),
    };

    let names: Vec<String> = idents.iter().map(ToString::to_string).collect();
    let required: Vec<&String> = names
        .iter()
        .zip(&types)
        .filter(|(_, ty)| option_inner(ty).is_none())
        .map(|(n, _)| n)
        .collect();
    let output = match &sig.output {
        ReturnType::Default => quote!(()),
        ReturnType::Type(_, ty) => quote!(#ty),
    };

    let args_ident = Ident::new(&format!("__FINDEX_ARGS_{fn_name}"), Span::call_site());
    let params_fn = Ident::new(&format!("__FINDEX_PARAMS_{fn_name}"), Span::call_site());
    let crate_path = get_crate_path();

    TokenStream::from(quote! {
        #func

        #[allow(non_camel_case_types)]
        #[derive(::serde::Deserialize)]
        struct #args_ident { #( #idents : #types ),* }

        #[allow(non_snake_case)]
        fn #params_fn() -> ::serde_json::Value {
            let mut properties = ::serde_json::Map::new();
            #(properties.insert(
                #names.to_string(),
                <#types as #crate_path::FunctionSchema>::schema(),
            );)*
            ::serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": [#(#required),*]
            })
        }

        #crate_path::inventory::submit! {
            #crate_path::FunctionRegistration::new(
                ::core::module_path!(),
                #fn_name_str,
                #doc_lit,
                || ::std::any::type_name_of_val(&#fn_name),
                |v| {
                    let v = if v.is_null() {
                        ::serde_json::Value::Array(::std::vec::Vec::new())
                    } else {
                        v
                    };
                    let __args: #args_ident = ::serde_json::from_value(v)
                        .map_err(#crate_path::DeserializationError::from)?;
                    let out = #fn_name( #( __args.#idents ),* );
                    ::serde_json::to_value(out).map_err(#crate_path::IndexError::from)
                },
                #params_fn,
                || #crate_path::Signature {
                    receiver: ::core::option::Option::None,
                    inputs: ::std::vec![#(::std::any::type_name::<#types>()),*],
                    output: ::std::any::type_name::<#output>(),
                },
            )
        }
    })
}

/// Named parameters of an `#[indexed]` function. Async, generic and method
/// signatures cannot be registered.
fn parameters(sig: &Signature) -> syn::Result<Vec<(Ident, Type)>> {
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "`#[indexed]` functions must be synchronous",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "`#[indexed]` functions may not be generic",
        ));
    }

    sig.inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Typed(PatType { pat, ty, .. }) => match &**pat {
                Pat::Ident(PatIdent { ident, .. }) => Ok((ident.clone(), (**ty).clone())),
                _ => Err(syn::Error::new_spanned(
                    pat,
                    "`#[indexed]` supports only identifier patterns",
                )),
            },
            FnArg::Receiver(receiver) => Err(syn::Error::new_spanned(
                receiver,
                "`#[indexed]` may not be used on methods; \
                 index them with `FunctionIndexer::index_method`",
            )),
        })
        .collect()
}
