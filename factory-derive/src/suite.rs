//! `#[factory_suite]` implementation

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Error, FnArg, ImplItem, ImplItemFn, ItemImpl, Pat, Result, parse_macro_input};

use crate::derive::doc_text;

const TEST_PREFIX: &str = "test";

/// Main entry point for the factory_suite attribute macro
pub fn factory_suite_impl(
    args: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    if !args.is_empty() {
        return Error::new(
            proc_macro2::Span::call_site(),
            "factory_suite does not take arguments",
        )
        .to_compile_error()
        .into();
    }

    let input = parse_macro_input!(input as ItemImpl);

    match generate_suite_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// A test method after validation
struct TestMethod<'a> {
    method: &'a ImplItemFn,
    name: String,
    params: Vec<(String, &'a syn::Type)>,
}

fn generate_suite_impl(input: &ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(Error::new_spanned(
            path,
            "factory_suite must be applied to an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "factory_suite does not support generic impl blocks",
        ));
    }

    let self_ty = &input.self_ty;
    let suite_name = quote!(#self_ty).to_string().replace(' ', "");

    let mut methods = Vec::new();
    for item in &input.items {
        if let ImplItem::Fn(method) = item
            && method.sig.ident.unraw().to_string().starts_with(TEST_PREFIX)
        {
            methods.push(parse_test_method(method)?);
        }
    }

    let declarations = methods.iter().map(method_declaration);
    let registrations = methods.iter().flat_map(|m| {
        m.params.iter().map(|(_, ty)| {
            quote! { <#ty as ::factory::Argument>::register_classes(classes); }
        })
    });
    let arms = methods.iter().map(invoke_arm);

    Ok(quote! {
        #input

        impl ::factory::TestSuite for #self_ty {
            fn name(&self) -> &str {
                #suite_name
            }

            fn methods(&self) -> ::std::vec::Vec<::factory::MethodDeclaration> {
                ::std::vec![#(#declarations),*]
            }

            #[allow(unused_variables)]
            fn register_classes(&self, classes: &mut ::factory::ClassRegistry) {
                #(#registrations)*
            }

            #[allow(unused_variables, unused_mut)]
            fn invoke(
                &self,
                method: &str,
                args: ::std::vec::Vec<::factory::Value>,
            ) -> ::std::result::Result<(), ::factory::TestError> {
                match method {
                    #(#arms)*
                    _ => ::std::result::Result::Err(
                        ::factory::FactoryError::unknown_method(method).into(),
                    ),
                }
            }
        }
    })
}

fn parse_test_method(method: &ImplItemFn) -> Result<TestMethod<'_>> {
    let sig = &method.sig;

    if !sig.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &sig.generics,
            "test methods cannot be generic",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(Error::new_spanned(asyncness, "test methods cannot be async"));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(Error::new_spanned(
                sig,
                "test methods must take `&self` as their first parameter",
            ));
        }
    }

    let mut params = Vec::new();
    for input in inputs {
        let FnArg::Typed(typed) = input else {
            return Err(Error::new_spanned(input, "unexpected receiver"));
        };
        let Pat::Ident(pat) = typed.pat.as_ref() else {
            return Err(Error::new_spanned(
                &typed.pat,
                "test method parameters must be plain identifiers",
            ));
        };
        params.push((pat.ident.unraw().to_string(), typed.ty.as_ref()));
    }

    Ok(TestMethod {
        method,
        name: sig.ident.unraw().to_string(),
        params,
    })
}

fn method_declaration(test: &TestMethod<'_>) -> TokenStream {
    let name = &test.name;
    let doc = doc_text(&test.method.attrs);
    let params = test.params.iter().map(|(param, ty)| {
        quote! {
            .param_declaration(::factory::ParamDeclaration::new(
                #param,
                <#ty as ::factory::Argument>::declared_type(),
            ))
        }
    });

    quote! {
        ::factory::MethodDeclaration::new(#name)
            .doc(#doc)
            #(#params)*
    }
}

fn invoke_arm(test: &TestMethod<'_>) -> TokenStream {
    let name = &test.name;
    let ident = &test.method.sig.ident;
    let locals: Vec<_> = (0..test.params.len())
        .map(|i| format_ident!("__factory_arg_{}", i))
        .collect();
    let bindings = test.params.iter().zip(&locals).map(|((param, ty), local)| {
        quote! { let #local: #ty = args.arg(#param)?; }
    });

    quote! {
        #name => {
            let mut args = ::factory::Arguments::new(method, args);
            #(#bindings)*
            args.finish()?;
            ::factory::TestReturn::into_test_result(self.#ident(#(#locals),*))
        }
    }
}
