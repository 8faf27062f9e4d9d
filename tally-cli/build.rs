//! Stamps `tally --version` with the commit the binary was built from.
//!
//! `TALLY_BUILD_SHA` in the environment wins (release tarballs have no
//! `.git`); otherwise `git describe` on the workspace root, with a `-dirty`
//! suffix for uncommitted changes.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const OVERRIDE: &str = "TALLY_BUILD_SHA";

fn main() {
    let manifest_dir =
        PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap_or_else(|| ".".into()));
    let workspace = manifest_dir.parent().unwrap_or(&manifest_dir).to_path_buf();

    let sha = env::var(OVERRIDE)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| describe(&workspace))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={OVERRIDE}={sha}");
    println!("cargo:rerun-if-env-changed={OVERRIDE}");

    let git_dir = workspace.join(".git");
    for watched in ["HEAD", "index", "refs"] {
        let p = git_dir.join(watched);
        if p.exists() {
            println!("cargo:rerun-if-changed={}", p.display());
        }
    }
}

fn describe(repo: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (!sha.is_empty()).then_some(sha)
}
