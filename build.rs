use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };

    let result = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("MODFILTER_H")
        .with_parse_deps(false)
        .generate();

    match result {
        Ok(bindings) => {
            bindings.write_to_file(crate_dir.join("include").join("modfilter.h"));
        }
        Err(err) => println!("cargo:warning=failed to generate C header: {}", err),
    }
}
