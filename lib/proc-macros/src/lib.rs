// Copyright 2024 The Ledgertree Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod content_hash;

extern crate proc_macro;

use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Derives `ContentHash` for a struct or enum by hashing each field in
/// declaration order (structs) or the variant's ordinal followed by its
/// fields (enums). All hashed members must themselves implement
/// `ContentHash`.
#[proc_macro_derive(ContentHash)]
pub fn derive_content_hash(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let hash_impl = content_hash::generate_hash_impl(&input.data);

    let generics = content_hash::add_trait_bounds(input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        #[automatically_derived]
        impl #impl_generics ::ledgertree::identity::ContentHash for #name #ty_generics
        #where_clause {
            fn hash(&self, state: &mut impl ::ledgertree::identity::DigestUpdate) {
                #hash_impl
            }
        }
    };
    expanded.into()
}
