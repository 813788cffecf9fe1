//! `#[derive(Reflect)]` for the fieldscope kernel.
//!
//! Generates `Typed`, `Reflect` and `ReflectValue` impls for structs with
//! named fields. Recognised attributes:
//!
//! - `#[reflect(skip)]` on a field: listed as excluded, never read. The
//!   field's type needs no trait impls.
//! - `#[reflect(base)]` on a field: the field holds the ancestor. At most one
//!   per struct; its type must itself derive `Reflect`.
//! - `#[reflect(rename = "name")]` on a field: the name used in output.
//! - `#[reflect(display)]` on the struct: when the struct is a field value,
//!   render it with its own `Display` instead of the formatter.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn reflect_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    base: bool,
    rename: Option<LitStr>,
}

fn field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("base") {
                attrs.base = true;
            } else if meta.path.is_ident("rename") {
                attrs.rename = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("expected `skip`, `base` or `rename`"));
            }
            Ok(())
        })?;
    }
    if attrs.base && (attrs.skip || attrs.rename.is_some()) {
        return Err(syn::Error::new(
            field.span(),
            "`base` cannot be combined with other reflect options",
        ));
    }
    Ok(attrs)
}

fn uses_display(input: &DeriveInput) -> syn::Result<bool> {
    let mut display = false;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("display") {
                display = true;
                Ok(())
            } else {
                Err(meta.error("expected `display`"))
            }
        })?;
    }
    Ok(display)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Reflect cannot be derived for generic types",
        ));
    }
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return expand_fields(input, Vec::new(), None),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    name.span(),
                    "Reflect requires named fields",
                ));
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new(
                name.span(),
                "Reflect can only be derived for structs",
            ));
        }
    };

    let mut members = Vec::new();
    let mut base = None;
    for field in fields {
        let attrs = field_attrs(field)?;
        if attrs.base {
            if base.is_some() {
                return Err(syn::Error::new(field.span(), "only one `base` field allowed"));
            }
            base = Some(field);
        } else {
            members.push((field, attrs));
        }
    }
    expand_fields(input, members, base)
}

fn expand_fields(
    input: &DeriveInput,
    members: Vec<(&syn::Field, FieldAttrs)>,
    base: Option<&syn::Field>,
) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();
    let krate = quote!(::fieldscope_kernel);

    let infos = members.iter().map(|(field, attrs)| {
        let field_name = attrs
            .rename
            .as_ref()
            .map(LitStr::value)
            .or_else(|| field.ident.as_ref().map(|ident| ident.unraw().to_string()))
            .unwrap_or_default();
        let info = quote!(#krate::native::FieldInfo::instance(#field_name));
        if attrs.skip {
            quote!(#info.excluded())
        } else {
            info
        }
    });

    let arms = members
        .iter()
        .enumerate()
        .filter(|(_, (_, attrs))| !attrs.skip)
        .map(|(index, (field, _))| {
            let ident = &field.ident;
            quote!(#index => ::core::option::Option::Some(&self.#ident))
        });

    let (parent, base_fn) = match base {
        Some(field) => {
            let ty = &field.ty;
            let ident = &field.ident;
            (
                quote!(::core::option::Option::Some(<#ty as #krate::native::Typed>::type_info)),
                quote! {
                    fn base(&self) -> ::core::option::Option<&dyn #krate::native::Reflect> {
                        ::core::option::Option::Some(&self.#ident)
                    }
                },
            )
        }
        None => (quote!(::core::option::Option::None), TokenStream2::new()),
    };

    let text = if uses_display(input)? {
        quote!(::std::string::ToString::to_string(self))
    } else {
        quote!(#krate::format(self))
    };

    Ok(quote! {
        impl #krate::native::Typed for #name {
            fn type_info() -> &'static #krate::native::TypeInfo {
                static INFO: #krate::native::TypeInfo = #krate::native::TypeInfo {
                    name: #type_name,
                    fields: &[#(#infos),*],
                    parent: #parent,
                };
                &INFO
            }
        }

        impl #krate::native::Reflect for #name {
            fn reflected_type(&self) -> &'static #krate::native::TypeInfo {
                <Self as #krate::native::Typed>::type_info()
            }

            fn field(
                &self,
                index: usize,
            ) -> ::core::option::Option<&dyn #krate::native::ReflectValue> {
                match index {
                    #(#arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            #base_fn
        }

        impl #krate::native::ReflectValue for #name {
            fn shape(&self) -> #krate::introspect::Shape<'_, dyn #krate::native::ReflectValue> {
                #krate::introspect::Shape::Text(#text)
            }
        }
    })
}
