use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Attribute, Ident, Lit, LitStr, Meta, NestedMeta};

/// Port symbol of a member: `#[member(name = "..")]` if present, the field name otherwise.
pub(super) fn get_member_symbol(attrs: &[Attribute], name: &Ident) -> LitStr {
    for attr in attrs.iter().filter(|attr| attr.path.is_ident("member")) {
        if let Ok(Meta::List(nvs)) = attr.parse_meta() {
            let symbol = nvs.nested.iter().find_map(|nv| match nv {
                NestedMeta::Meta(Meta::NameValue(nv)) if nv.path.is_ident("name") => match &nv.lit {
                    Lit::Str(symbol) => Some(symbol.clone()),
                    _ => panic!("{name}: member name should be a string literal"),
                },
                _ => None,
            });

            if let Some(symbol) = symbol {
                return symbol;
            }
        }
    }

    LitStr::new(&name.to_string(), Span::call_site())
}

/// Width expression of a member, from `#[width(addr | data | strb | <int>)]`.
pub(super) fn get_width(attrs: &[Attribute], name: &Ident) -> TokenStream {
    for attr in attrs.iter().filter(|attr| attr.path.is_ident("width")) {
        let nvs = match attr.parse_meta() {
            Ok(Meta::List(nvs)) => nvs,
            _ => panic!("{name}: width should be given as `#[width(..)]`"),
        };
        assert_eq!(nvs.nested.len(), 1, "{name}: width takes exactly one argument");

        return match nvs.nested.first().unwrap() {
            NestedMeta::Lit(Lit::Int(width)) => {
                let width = width.base10_parse::<usize>().unwrap_or_else(|_| panic!("{name}: width should be usize"));
                assert!(0 < width && width <= 64, "{name}: width {width} does not fit a 64-bit register");
                quote! { Width::Fixed(#width) }
            }
            NestedMeta::Meta(Meta::Path(path)) if path.is_ident("addr") => quote! { Width::Addr },
            NestedMeta::Meta(Meta::Path(path)) if path.is_ident("data") => quote! { Width::Data },
            NestedMeta::Meta(Meta::Path(path)) if path.is_ident("strb") => quote! { Width::Strb },
            _ => panic!("{name}: width should be `addr`, `data`, `strb` or an integer literal"),
        };
    }

    panic!("{name}: members of a `Signal` need a `#[width(..)]` attribute")
}
