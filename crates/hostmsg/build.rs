// Build provenance for `hostmsg version --extended`.
fn main() {
    for (source, exported) in [
        ("TARGET", "HOSTMSG_BUILD_TARGET"),
        ("PROFILE", "HOSTMSG_BUILD_PROFILE"),
        ("GITHUB_SHA", "HOSTMSG_GIT_HASH"),
    ] {
        if let Ok(value) = std::env::var(source) {
            println!("cargo:rustc-env={exported}={value}");
        }
        println!("cargo:rerun-if-env-changed={source}");
    }
}
