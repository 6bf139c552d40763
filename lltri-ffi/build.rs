use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let var = "LLTRI_FFI";
    let header = "lltri.h";
    println!("cargo:rerun-if-changed={header}");
    println!("cargo:rerun-if-env-changed={var}");
    println!("cargo:rerun-if-env-changed=CI");
    if env::var_os(var).is_some() {
        let manifest = env::var_os("CARGO_MANIFEST_DIR").ok_or("CARGO_MANIFEST_DIR is not set")?;
        let manifest = Path::new(&manifest);
        let header = &manifest.join(header);
        let changed = cbindgen::generate(manifest)?.write_to_file(header);
        if env::var_os("CI").is_some() {
            assert!(!changed, "lltri-ffi bindings are not up to date");
        }
    }
    Ok(())
}
