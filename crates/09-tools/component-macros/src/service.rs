//! `#[derive(Service)]` 实现

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse_quote, Attribute, DeriveInput, Result, Token, Type};

/// 服务属性参数
#[derive(Default)]
pub struct ServiceArgs {
    /// 支持创建新实例
    pub cloneable: bool,
    /// 注册初始化能力
    pub initializable: bool,
    /// 声明的 trait 对象类型
    pub provides: Vec<Type>,
}

impl ServiceArgs {
    /// 从 `#[service(...)]` 属性解析参数
    pub fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut args = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("service")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("cloneable") {
                    args.cloneable = true;
                    Ok(())
                } else if meta.path.is_ident("initializable") {
                    args.initializable = true;
                    Ok(())
                } else if meta.path.is_ident("provides") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let types = content.parse_terminated(Type::parse, Token![,])?;
                    args.provides.extend(types);
                    Ok(())
                } else {
                    Err(meta.error(
                        "不支持的 service 参数, 可用参数: cloneable, initializable, provides(...)",
                    ))
                }
            })?;
        }

        Ok(args)
    }
}

/// 生成 `ServiceDescriptor` 实现
pub fn expand(input: &DeriveInput) -> Result<TokenStream> {
    let args = ServiceArgs::from_attributes(&input.attrs)?;
    let name = &input.ident;

    let mut generics = input.generics.clone();
    let type_params: Vec<_> = generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    let where_clause = generics.make_where_clause();
    for ident in type_params {
        where_clause
            .predicates
            .push(parse_quote!(#ident: ::std::marker::Send + ::std::marker::Sync + 'static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let provides = args.provides.iter().map(|ty| {
        quote! {
            .provides::<#ty>(|service| service as ::std::sync::Arc<#ty>)
        }
    });
    let cloneable = args.cloneable.then(|| quote! { .cloneable() });
    let initializable = args.initializable.then(|| quote! { .initializable() });

    Ok(quote! {
        impl #impl_generics ::di_abstractions::ServiceDescriptor for #name #ty_generics #where_clause {
            fn describe(
                slot: ::di_abstractions::SlotBuilder<Self>,
            ) -> ::di_abstractions::SlotBuilder<Self> {
                slot #(#provides)* #cloneable #initializable
            }
        }
    })
}
