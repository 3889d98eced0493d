use proc_macro::{self, TokenStream};
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use super::utils::{get_member_symbol, get_width};

pub fn derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let name = &ast.ident;
    match ast.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(syn::FieldsNamed { ref named, .. }), ..
        }) => {
            let fields = named;
            assert!(!fields.is_empty(), "{name}: Empty structs cannot be derived as `Signal`");

            // fields for `port_decls`.
            let port_decls_fields = fields.iter().map(|f| {
                let ident = f.ident.as_ref().unwrap();
                let symbol = get_member_symbol(&f.attrs, ident);
                let width = get_width(&f.attrs, ident);
                quote! { PortDecl::new(#symbol, config.resolve(#width)) }
            });

            // fields for `truncate`.
            let truncate_fields = fields.iter().map(|f| {
                let ident = f.ident.as_ref().unwrap();
                let width = get_width(&f.attrs, ident);
                quote! { #ident: config.truncate(#width, self.#ident) }
            });

            let expanded = quote! {
                impl #impl_generics Signal for #name #ty_generics #where_clause {
                    fn port_decls(config: &Config) -> Vec<PortDecl> {
                        vec![
                            #(#port_decls_fields,)*
                        ]
                    }
                    fn truncate(self, config: &Config) -> Self {
                        Self {
                            #(#truncate_fields,)*
                        }
                    }
                }
            };

            expanded.into()
        }
        syn::Data::Struct(_) => panic!("{name}: Only structs with named fields can be derived as `Signal`"),
        _ => todo!("Signal macro is not implemented for enum and union types"),
    }
}
