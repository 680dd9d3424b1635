//! Build script: embeds the buildaux version string at compile time.

use std::process::Command;

fn main() {
    // Prefer BUILDAUX_VERSION when set by the release pipeline, otherwise
    // describe the checkout for local builds.
    if let Ok(version) = std::env::var("BUILDAUX_VERSION") {
        println!("cargo:rustc-env=BUILDAUX_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=BUILDAUX_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=BUILDAUX_VERSION");
}
