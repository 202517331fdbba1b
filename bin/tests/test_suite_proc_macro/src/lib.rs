use std::collections::BTreeMap;
use std::path::Path;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Generates one `#[test]` per `.lox` file below `tests/suite`, each calling `lox_expect`.
///
/// Every directory of the suite becomes a module inside `mod suite`, so a failure reads
/// as e.g. `suite::errors::missing_colon`.
#[proc_macro]
pub fn generate_tests(_: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let root_dir = format!("{}/../suite", env!("CARGO_MANIFEST_DIR"));

    let mut groups: BTreeMap<String, Vec<TokenStream>> = BTreeMap::new();
    for entry in walkdir::WalkDir::new(&root_dir).sort_by_file_name().into_iter().flatten() {
        let path = entry.path();
        if path.extension() != Some("lox".as_ref()) {
            continue;
        }
        let relative = path.strip_prefix(&root_dir).unwrap();
        let group = relative.parent().map(module_name).unwrap_or_default();
        groups.entry(group).or_default().push(test_fn(path));
    }

    let modules = groups.into_iter().map(|(group, tests)| {
        if group.is_empty() {
            return quote! { #(#tests)* };
        }
        let module = format_ident!("{}", group);
        quote! {
            mod #module {
                #(#tests)*
            }
        }
    });

    quote! {
        #[ctor::ctor]
        fn init() {
            env_logger::init();
        }

        mod suite {
            #(#modules)*
        }
    }
    .into()
}

/// `nested/dir` becomes `nested_dir`.
fn module_name(dir: &Path) -> String {
    dir.to_string_lossy().replace(['/', '\\'], "_")
}

fn test_fn(path: &Path) -> TokenStream {
    let test_file_path = path.to_string_lossy();
    let test_ident = format_ident!("{}", path.file_stem().unwrap().to_string_lossy());
    quote! {
        #[test]
        fn #test_ident() {
            crate::lox_expect(std::fs::read_to_string(#test_file_path).unwrap().as_str());
        }
    }
}
