use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap_or_else(|_| ".".to_string()));

    // Header generation is a convenience for C consumers; a failure here
    // should not break the Rust build.
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("HTCLIENT_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("htclient.h"));
        }
        Err(err) => println!("cargo:warning=skipping htclient.h: {err}"),
    }
}
