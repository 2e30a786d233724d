use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Field, Fields, Ident, LitStr, parse_macro_input};

/// Derives `kv_model::Model` for a prost message struct.
///
/// One field must be marked `#[meta]` and hold an `Option<kv_model::Metadata>`.
/// `#[model(collection = "...")]` on the struct overrides the key prefix;
/// `#[model(skip)]` on a field hides it from sorting and field filters.
/// A `{Name}Patch` struct with every other field wrapped in `Option` is
/// generated for edits.
#[proc_macro_derive(Model, attributes(meta, model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct DataField<'a> {
    ident: &'a Ident,
    field: &'a Field,
    skip: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let vis = &input.vis;
    let patch_name = format_ident!("{}Patch", struct_name);

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Model cannot be derived for generic structs",
        ));
    }

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "Model requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Model can only be derived for structs",
            ));
        }
    };

    let collection = match collection_attr(input)? {
        Some(name) => quote! { #name },
        None => quote! { concat!(module_path!(), "::", stringify!(#struct_name)) },
    };

    // 拆分元数据字段与数据字段
    let mut meta_field = None;
    let mut data_fields = Vec::new();
    for field in named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if field.attrs.iter().any(|attr| attr.path().is_ident("meta")) {
            if meta_field.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[meta]",
                ));
            }
            meta_field = Some(ident);
        } else {
            data_fields.push(DataField {
                ident,
                field,
                skip: has_skip(field)?,
            });
        }
    }
    let Some(meta_field) = meta_field else {
        return Err(syn::Error::new_spanned(
            struct_name,
            "Model requires one field marked #[meta] of type Option<kv_model::Metadata>",
        ));
    };

    let visible: Vec<_> = data_fields.iter().filter(|f| !f.skip).collect();
    let visible_idents: Vec<_> = visible.iter().map(|f| f.ident).collect();
    let visible_names: Vec<_> = visible_idents.iter().map(|i| i.to_string()).collect();

    let patch_fields = data_fields.iter().map(|f| {
        let ident = f.ident;
        let field_vis = &f.field.vis;
        let ty = &f.field.ty;
        quote! { #field_vis #ident: ::core::option::Option<#ty> }
    });

    let patch_setters = data_fields.iter().map(|f| {
        let ident = f.ident;
        let ty = &f.field.ty;
        quote! {
            pub fn #ident(mut self, value: impl ::core::convert::Into<#ty>) -> Self {
                self.#ident = ::core::option::Option::Some(value.into());
                self
            }
        }
    });

    let patch_applies = data_fields.iter().map(|f| {
        let ident = f.ident;
        quote! {
            if let ::core::option::Option::Some(value) = patch.#ident {
                self.#ident = value;
            }
        }
    });

    Ok(quote! {
        impl ::kv_model::Model for #struct_name {
            type Patch = #patch_name;

            fn collection() -> &'static str {
                #collection
            }

            fn metadata(&self) -> ::core::option::Option<&::kv_model::Metadata> {
                self.#meta_field.as_ref()
            }

            fn metadata_mut(&mut self) -> &mut ::kv_model::Metadata {
                self.#meta_field.get_or_insert_with(::core::default::Default::default)
            }

            fn field(&self, name: &str) -> ::core::option::Option<::kv_model::FieldValue> {
                match name {
                    #(
                        #visible_names => ::core::option::Option::Some(
                            ::kv_model::ToFieldValue::to_field_value(&self.#visible_idents),
                        ),
                    )*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_names() -> ::std::vec::Vec<&'static str> {
                ::std::vec![#(#visible_names),*]
            }

            #[allow(unused_variables)]
            fn apply_patch(&mut self, patch: #patch_name) {
                #(#patch_applies)*
            }
        }

        #[derive(Clone, Debug, Default)]
        #vis struct #patch_name {
            #(#patch_fields,)*
        }

        #[allow(dead_code)]
        impl #patch_name {
            pub fn new() -> Self {
                ::core::default::Default::default()
            }

            #(#patch_setters)*
        }
    })
}

fn collection_attr(input: &DeriveInput) -> syn::Result<Option<LitStr>> {
    let mut collection = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let name = meta.value()?.parse::<LitStr>()?;
                // 集合名是键路径的一段，不能为空或包含 '/'
                if name.value().is_empty() || name.value().contains('/') {
                    return Err(syn::Error::new_spanned(
                        &name,
                        "collection name must be non-empty and must not contain '/'",
                    ));
                }
                collection = Some(name);
                Ok(())
            } else {
                Err(meta.error("expected `collection = \"...\"`"))
            }
        })?;
    }
    Ok(collection)
}

fn has_skip(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}
