use build_script_cfg::Cfg;
use search_cuda_tools::{cutensor_include, find_cuda_root, find_cutensor_root, include_cutensor};
use std::{
    env,
    path::{Path, PathBuf},
};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let cutensor = Cfg::new("cutensor");
    let Some(cuda_root) = find_cuda_root() else {
        return;
    };
    let Some(root) = find_cutensor_root() else {
        return;
    };
    cutensor.define();
    include_cutensor(root.as_deref());
    bind_cutensor(cuda_root, root.as_deref())
}

fn bind_cutensor(toolkit: impl AsRef<Path>, root: Option<&Path>) {
    // Tell cargo to invalidate the built crate whenever the wrapper changes.
    println!("cargo:rerun-if-changed=wrapper.h");

    let mut builder = bindgen::Builder::default()
        .header("wrapper.h")
        .clang_arg(format!("-I{}", toolkit.as_ref().join("include").display()));
    if let Some(root) = root {
        builder = builder.clang_arg(format!("-I{}", cutensor_include(root).display()))
    }
    let bindings = builder
        .allowlist_function("cutensor.*")
        .allowlist_item("cutensor.*")
        // Compute descriptors are exported as global constants.
        .allowlist_item("CUTENSOR.*")
        .must_use_type("cutensorStatus_t")
        .default_enum_style(bindgen::EnumVariation::Rust {
            non_exhaustive: true,
        })
        .use_core()
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}
