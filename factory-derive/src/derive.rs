//! `#[derive(Factory)]` implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, ExprLit, Fields, Lit, Meta, Result, Visibility,
    parse_macro_input,
};

/// Main entry point for the Factory derive macro
pub fn derive_factory_impl(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_factory_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Doc comment text of an item, one line per `///` line
pub(crate) fn doc_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .map(|line| match line.strip_prefix(' ') {
            Some(stripped) => stripped.to_string(),
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_factory_impl(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let class_name = name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Factory derive does not support generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new_spanned(
                    input,
                    "Factory derive requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                input,
                "Factory derive is only supported for structs",
            ));
        }
    };

    let mut constructor_params = Vec::new();
    let mut properties = Vec::new();
    let mut registrations = Vec::new();
    let mut conversions = Vec::new();

    for field in fields {
        let Some(ident) = &field.ident else {
            return Err(Error::new_spanned(field, "expected a named field"));
        };
        let field_name = ident.unraw().to_string();
        let context = format!("{}.{}", class_name, field_name);
        let ty = &field.ty;

        if matches!(field.vis, Visibility::Public(_)) {
            let doc = doc_text(&field.attrs);
            let declaration = if doc.is_empty() {
                quote! { ::factory::PropertyDeclaration::new(#field_name) }
            } else {
                quote! { ::factory::PropertyDeclaration::new(#field_name).doc(#doc) }
            };
            properties.push(quote! { .property(#declaration) });
        } else {
            constructor_params.push(quote! {
                .constructor_param(::factory::ParamDeclaration::new(
                    #field_name,
                    <#ty as ::factory::Argument>::declared_type(),
                ))
            });
        }

        registrations.push(quote! {
            <#ty as ::factory::Argument>::register_classes(classes);
        });

        conversions.push(quote! {
            #ident: <#ty as ::factory::Argument>::from_value(
                object.take(#field_name).unwrap_or(::factory::Value::Null),
            )
            .map_err(|e| e.in_context(#context))?,
        });
    }

    let doc = doc_text(&input.attrs);
    let constructor_doc = if doc.is_empty() {
        quote! {}
    } else {
        quote! { .constructor_doc(#doc) }
    };

    Ok(quote! {
        impl ::factory::Argument for #name {
            fn declared_type() -> ::std::option::Option<::factory::DeclaredType> {
                ::std::option::Option::Some(::factory::DeclaredType::new(#class_name))
            }

            fn register_classes(classes: &mut ::factory::ClassRegistry) {
                if classes.contains(#class_name) {
                    return;
                }
                classes.register(
                    ::factory::ClassDescriptor::new(#class_name)
                        #constructor_doc
                        #(#constructor_params)*
                        #(#properties)*
                );
                #(#registrations)*
            }

            #[allow(unused_mut)]
            fn from_value(
                value: ::factory::Value,
            ) -> ::std::result::Result<Self, ::factory::FactoryError> {
                let mut object = ::factory::Object::from_value(value, #class_name)?;
                ::std::result::Result::Ok(Self {
                    #(#conversions)*
                })
            }
        }
    })
}
