//! Procedural macros for `routeshape`.
//!
//! `#[route_params("/users/:name/age/:id")]` turns a field-less struct into
//! the params record of that template: one `pub String` field per `:name`
//! segment, a `Deserialize` impl, and a `ParamsShape` impl declaring the
//! names so registration can check them against the route. A malformed
//! template is a compile error at the attribute.

use std::collections::BTreeSet;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Fields, Ident, ItemStruct, LitStr};

/// Parameter names of a template, in declaration order.
///
/// Same rules as `PathTemplate::parse`: leading `/`, no empty segments,
/// identifier names, no repeats.
fn template_params(template: &str) -> Result<Vec<String>, String> {
    let Some(rest) = template.strip_prefix('/') else {
        return Err(format!("template '{template}' must start with '/'"));
    };
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let mut seen = BTreeSet::new();
    for segment in rest.split('/') {
        if segment.is_empty() {
            return Err(format!("template '{template}' has an empty path segment"));
        }
        let Some(name) = segment.strip_prefix(':') else {
            continue;
        };
        if name.is_empty() {
            return Err(format!("template '{template}': parameter segment ':' has no name"));
        }
        let mut chars = name.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "template '{template}': parameter name '{name}' is not an identifier"
            ));
        }
        if !seen.insert(name) {
            return Err(format!(
                "template '{template}': parameter ':{name}' declared more than once"
            ));
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// Field identifier for a parameter name; keywords become raw identifiers.
fn field_ident(name: &str, span: Span) -> Result<Ident, String> {
    if syn::parse_str::<Ident>(name).is_ok() {
        return Ok(Ident::new(name, span));
    }
    match name {
        "_" | "self" | "super" | "crate" | "Self" => {
            Err(format!("parameter name '{name}' cannot be used as a field name"))
        }
        _ => Ok(Ident::new_raw(name, span)),
    }
}

#[proc_macro_attribute]
pub fn route_params(attr: TokenStream, item: TokenStream) -> TokenStream {
    let template = parse_macro_input!(attr as LitStr);
    let input = parse_macro_input!(item as ItemStruct);

    let names = match template_params(&template.value()) {
        Ok(names) => names,
        Err(msg) => return syn::Error::new(template.span(), msg).to_compile_error().into(),
    };

    match &input.fields {
        Fields::Unit => {}
        Fields::Named(named) if named.named.is_empty() => {}
        _ => {
            return syn::Error::new_spanned(
                &input.fields,
                "#[route_params] generates the fields; declare the struct without fields",
            )
            .to_compile_error()
            .into();
        }
    }
    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "#[route_params] structs cannot be generic",
        )
        .to_compile_error()
        .into();
    }

    let mut idents = Vec::with_capacity(names.len());
    for name in &names {
        match field_ident(name, template.span()) {
            Ok(ident) => idents.push(ident),
            Err(msg) => return syn::Error::new(template.span(), msg).to_compile_error().into(),
        }
    }

    let attrs = &input.attrs;
    let vis = &input.vis;
    let ident = &input.ident;
    let template_value = template.value();

    let expanded = quote! {
        #(#attrs)*
        #[allow(non_snake_case)]
        #[derive(Debug, Clone, PartialEq, Eq, ::routeshape::__private::serde::Deserialize)]
        #[serde(crate = "::routeshape::__private::serde")]
        #vis struct #ident {
            #(pub #idents: ::std::string::String,)*
        }

        impl ::routeshape::path::ParamsShape for #ident {
            fn declared_names() -> ::std::option::Option<&'static [&'static str]> {
                ::std::option::Option::Some(&[#(#names),*])
            }

            fn declared_template() -> ::std::option::Option<&'static str> {
                ::std::option::Option::Some(#template_value)
            }
        }
    };
    TokenStream::from(expanded)
}
