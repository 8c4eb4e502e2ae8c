use std::env;
use std::process::Command;

// Embeds the short commit hash as PAUC_GIT_SHA so experiments can record the exact build.
fn main() {
    println!("cargo:rerun-if-env-changed=PAUC_GIT_SHA");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let sha = env::var("PAUC_GIT_SHA")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(short_head);

    if let Some(sha) = sha {
        println!("cargo:rustc-env=PAUC_GIT_SHA={}", sha);
    }
}

fn short_head() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sha.is_empty() { None } else { Some(sha) }
}
