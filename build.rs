// build.rs — pdf2img
//
// Compiles the Slint UI description for the `pdf2img-gui` binary. Nothing
// happens unless the `gui` feature is active, so library-only builds never
// pull in the Slint compiler.

fn main() {
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_GUI");

    #[cfg(feature = "gui")]
    {
        println!("cargo:rerun-if-changed=ui");
        slint_build::compile("ui/app-window.slint").expect("Slint build failed");
    }
}
