//! Build script for Clinic Reports
//!
//! Embeds the build timestamp and profile for the startup banner and status tool.

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=PROFILE");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=CLINIC_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=CLINIC_BUILD_PROFILE={}", profile);
}
