//! Default tree contents.

use serde_json::json;

use unified_scripts::scripts::{ScriptBuilder, UserInput, HOOKS};
use unified_scripts::{build, BinResolver, Paths};

use crate::fixtures::{downstream, script_at, self_build};

#[test]
fn test_every_group_is_present() {
    let tree = downstream(json!({}));
    let scripts = tree["scripts"].as_object().unwrap();
    let names: Vec<&str> = scripts.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["checkDeps", "lint", "test", "typeCheck", "build", "bump", "prepare"]
    );
    assert_eq!(tree["options"], json!({"logLevel": "warn"}));
}

#[test]
fn test_test_variants_have_distinct_flags() {
    let tree = downstream(json!({}));
    assert_eq!(script_at(&tree, "test.default"), "unified.jest");
    assert_eq!(script_at(&tree, "test.watch"), "unified.jest --watch");
    assert_eq!(script_at(&tree, "test.coverage"), "unified.jest --coverage");
}

#[test]
fn test_bump_variant_flags() {
    let tree = downstream(json!({}));
    let default = script_at(&tree, "bump.default");
    let beta = script_at(&tree, "bump.beta");
    let first = script_at(&tree, "bump.first");

    assert_eq!(beta.matches("--prerelease=beta").count(), 1);
    assert_eq!(first.matches("--first-release").count(), 1);
    assert!(!default.contains("--prerelease=beta"));
    assert!(!default.contains("--first-release"));
    assert!(!beta.contains("--first-release"));
    assert!(!first.contains("--prerelease=beta"));

    assert!(beta.ends_with("&& unified.standard-version --prerelease=beta"));
    assert!(default.ends_with("&& unified.standard-version"));
}

#[test]
fn test_bump_runs_full_build_first() {
    let tree = downstream(json!({}));
    let build = script_at(&tree, "build.default");
    for variant in ["default", "beta", "first"] {
        let bump = script_at(&tree, &format!("bump.{}", variant));
        assert!(
            bump.starts_with(&build),
            "bump.{} should start with the full build",
            variant
        );
    }
}

#[test]
fn test_prepare_builds_then_tests() {
    let tree = downstream(json!({}));
    let prepare = script_at(&tree, "prepare");
    let build = script_at(&tree, "build.default");
    assert_eq!(
        prepare,
        format!("{} && unified.jest --passWithNoTests", build)
    );
}

#[test]
fn test_watch_has_no_cleanup() {
    let tree = downstream(json!({}));
    let watch = script_at(&tree, "build.watch");
    assert!(watch.contains("--names \"tsc,babel\""));
    assert!(watch.contains("--preserveWatchOutput --watch"));
    assert!(watch.contains("--watch --verbose"));
    assert!(!watch.contains("unified.del"));
    assert!(!watch.contains("&&"));
}

#[test]
fn test_self_build_uses_plain_binaries() {
    let tree = self_build(json!({}));
    let rendered = serde_json::to_string(&tree).unwrap();
    assert!(!rendered.contains("unified."));
    assert_eq!(script_at(&tree, "typeCheck"), "ttsc --pretty --noEmit");
    assert!(script_at(&tree, "build.default").ends_with("&& del \"dist/**/*.spec.*\" \"dist/**/*.test.*\""));
}

#[test]
fn test_downstream_prefixes_every_tool() {
    let tree = downstream(json!({}));
    let build = script_at(&tree, "build.default");
    for tool in ["eslint", "babel", "ttsc", "del"] {
        assert!(
            build.contains(&format!("unified.{}", tool)),
            "build.default should call unified.{}",
            tool
        );
    }
    assert_eq!(
        script_at(&tree, "checkDeps"),
        "npm-check --skip-unused || true"
    );
}

#[test]
fn test_build_is_idempotent() {
    let input = json!({"scripts": {"prebuild": "echo hi", "lint": {"default": {"script": "x"}}}});
    assert_eq!(downstream(input.clone()), downstream(input));
    assert_eq!(
        build(UserInput::None).unwrap(),
        build(UserInput::None).unwrap()
    );
}

#[test]
fn test_resolver_contract() {
    for name in ["eslint", "jest", "x", "standard-version"] {
        assert_eq!(BinResolver::self_build().resolve(name), name);
        assert_eq!(
            BinResolver::new(false).resolve(name),
            format!("unified.{}", name)
        );
    }
}

#[test]
fn test_default_scripts_never_define_hooks() {
    let builder = ScriptBuilder::new(BinResolver::default(), Paths::default());
    let tree = builder.default_scripts(&Default::default());
    for hook in HOOKS {
        assert!(tree.get(hook).is_none());
    }
}
