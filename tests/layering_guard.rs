//! Layering guardrails to keep the shared vocabulary crate free of backend dependencies.
//!
//! `stackgen_core` holds pure, backend-independent registries. It must not depend on the generator crate (or anything
//! else): this test scans its `Cargo.toml` and fails if its `[dependencies]` table gains an entry.

#[test]
fn core_crate_has_no_dependencies() {
    let manifest = include_str!("../crates/stackgen_core/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if !line_no_comment.is_empty() {
            panic!("`stackgen_core` must stay dependency-free, found `{line_no_comment}` in [dependencies]");
        }
    }
}

#[test]
fn ir_does_not_import_backend() {
    let sources = [
        include_str!("../src/ir/mod.rs"),
        include_str!("../src/ir/expr.rs"),
        include_str!("../src/ir/types.rs"),
        include_str!("../src/ir/span.rs"),
        include_str!("../src/ir/visit.rs"),
    ];
    for source in sources {
        for line in source.lines().filter(|l| l.trim_start().starts_with("use ")) {
            assert!(!line.contains("backend"), "the IR must not depend on the backend: {line}");
        }
    }
}
