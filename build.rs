// LiveTail - GPL-3.0-or-later
// Embeds the git revision as GIT_HASH

use std::process::{Command, Output};

fn git(args: &[&str]) -> Option<Output> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
}

fn main() {
    let revision = git(&["rev-parse", "--short", "HEAD"])
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |hash| hash.trim().to_string());

    let dirty = git(&["status", "--porcelain"]).is_some_and(|output| !output.stdout.is_empty());

    if dirty {
        println!("cargo:rustc-env=GIT_HASH={revision}-dirty");
    } else {
        println!("cargo:rustc-env=GIT_HASH={revision}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
