//! Integration tests for build-order resolution
//!
//! Covers ordering guarantees over required and optional dependencies,
//! alternative-group choice, conflict and cycle detection, and determinism.

mod common;

use std::collections::HashMap;
use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;

use droidforge::core::arch::Arch;
use droidforge::core::build_env::BuildContext;
use droidforge::core::recipe::{Recipe, Registry};
use droidforge::core::resolver::{self, BuildOrder};
use droidforge::error::ResolverError;
use droidforge::infra::dirs::BuildDirs;
use droidforge::infra::ndk::NdkLayout;

fn recipe(toml_content: &str) -> Recipe {
    Recipe::from_toml(toml_content).expect("valid recipe")
}

fn simple(name: &str, depends: &[&str]) -> Recipe {
    let deps: Vec<String> = depends.iter().map(|d| format!("\"{d}\"")).collect();
    recipe(&format!(
        "[recipe]\nname = \"{name}\"\nversion = \"1.0\"\ndepends = [{}]\n",
        deps.join(", ")
    ))
}

fn registry(recipes: Vec<Recipe>) -> Registry {
    let mut reg = Registry::new();
    for r in recipes {
        reg.insert(r);
    }
    reg
}

fn resolve(reg: &Registry, requested: &[&str]) -> Result<BuildOrder, ResolverError> {
    let requested: Vec<String> = requested.iter().map(ToString::to_string).collect();
    resolver::resolve(&requested, reg)
}

#[test]
fn dependencies_and_optionals_precede_dependents() {
    let reg = registry(vec![
        recipe(
            "[recipe]\nname = \"python3\"\nversion = \"3.7.1\"\ndepends = [\"hostpython3\"]\nopt_depends = [\"openssl\", \"sqlite3\"]\n",
        ),
        simple("hostpython3", &[]),
        simple("openssl", &[]),
        simple("sqlite3", &["hostpython3"]),
    ]);

    let order = resolve(&reg, &["python3", "openssl", "sqlite3"]).unwrap();

    let python = order.position("python3").unwrap();
    assert!(order.position("hostpython3").unwrap() < python);
    assert!(order.position("openssl").unwrap() < python);
    assert!(order.position("sqlite3").unwrap() < python);
}

#[test]
fn mutual_conflict_fails_resolution() {
    let reg = registry(vec![
        recipe("[recipe]\nname = \"runtime-a\"\nversion = \"1.0\"\nconflicts = [\"runtime-b\"]\n"),
        recipe("[recipe]\nname = \"runtime-b\"\nversion = \"1.0\"\nconflicts = [\"runtime-a\"]\n"),
    ]);

    let err = resolve(&reg, &["runtime-a", "runtime-b"]).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("runtime-a"), "message: {message}");
    assert!(message.contains("runtime-b"), "message: {message}");
}

#[test]
fn two_recipe_cycle_fails_resolution() {
    let reg = registry(vec![simple("a", &["b"]), simple("b", &["a"])]);

    let err = resolve(&reg, &["a"]).unwrap_err();
    assert!(matches!(err, ResolverError::Cycle { .. }));
}

#[test]
fn resolving_twice_yields_identical_order() {
    let reg = registry(vec![
        simple("app", &["libfoo", "libbar"]),
        simple("libfoo", &["zlib"]),
        simple("libbar", &["zlib"]),
        simple("zlib", &[]),
    ]);

    let first = resolve(&reg, &["app"]).unwrap();
    let second = resolve(&reg, &["app"]).unwrap();
    assert_eq!(first.as_slice(), second.as_slice());
}

#[test]
fn alternative_group_prefers_member_required_elsewhere() {
    // The group lists x, y, z in order; y is a hard dependency of another
    // selected recipe, so y must be chosen
    let reg = registry(vec![
        recipe("[recipe]\nname = \"consumer\"\nversion = \"1.0\"\ndepends = [[\"x\", \"y\", \"z\"]]\n"),
        simple("needs-y", &["y"]),
        simple("x", &[]),
        simple("y", &[]),
        simple("z", &[]),
    ]);

    let order = resolve(&reg, &["consumer", "needs-y"]).unwrap();

    assert!(order.contains("y"));
    assert!(!order.contains("x"));
    assert!(!order.contains("z"));
}

#[test]
fn optional_dependency_flags_reach_consumer_context() {
    // End to end: {runtime-a, libssl} with libssl optional for runtime-a.
    // libssl builds first and its include/link flags land in runtime-a's
    // environment.
    let reg = registry(vec![
        recipe(
            "[recipe]\nname = \"runtime-a\"\nversion = \"3.7.1\"\nopt_depends = [\"libssl\"]\n\n[build]\nlink_libs = []\n",
        ),
        recipe(
            "[recipe]\nname = \"libssl\"\nversion = \"1.1.1\"\n\n[build]\nlink_libs = [\"ssl\", \"crypto\"]\nexport_version_var = \"OPENSSL_VERSION\"\n",
        ),
    ]);

    let order = resolve(&reg, &["runtime-a", "libssl"]).unwrap();
    assert!(order.position("libssl").unwrap() < order.position("runtime-a").unwrap());

    let arch = Arch::armeabi_v7a();
    let work = TempDir::new().unwrap();
    let dirs = BuildDirs::new(work.path().to_path_buf());
    std::fs::create_dir_all(dirs.recipe_build_dir("libssl", arch.name)).unwrap();

    let ndk = NdkLayout::new(work.path().join("ndk"), "linux-x86_64");
    let ctx = BuildContext::for_recipe(
        reg.get("runtime-a").unwrap(),
        &arch,
        21,
        &ndk,
        &order,
        &reg,
        &dirs,
        Path::new("/host/bin"),
        &HashMap::new(),
    )
    .unwrap();

    let cppflags = ctx.get("CPPFLAGS").unwrap();
    let ldflags = ctx.get("LDFLAGS").unwrap();
    let libssl_build = dirs.recipe_build_dir("libssl", arch.name);
    assert!(cppflags.contains(&format!("-I{}", libssl_build.display())));
    assert!(ldflags.contains("-lssl"));
    assert!(ldflags.contains("-lcrypto"));
    assert_eq!(ctx.get("OPENSSL_VERSION").unwrap(), "1.1.1");
}

#[test]
fn requesting_conflicting_runtimes_names_both() {
    let reg = registry(vec![
        recipe("[recipe]\nname = \"runtime-a\"\nversion = \"1.0\"\nconflicts = [\"runtime-b\"]\n"),
        recipe("[recipe]\nname = \"runtime-b\"\nversion = \"1.0\"\n"),
    ]);

    match resolve(&reg, &["runtime-a", "runtime-b"]) {
        Err(ResolverError::Conflict {
            recipe,
            conflicts_with,
        }) => {
            let mut pair = [recipe, conflicts_with];
            pair.sort();
            assert_eq!(pair, ["runtime-a".to_string(), "runtime-b".to_string()]);
        }
        other => panic!("Expected conflict, got {other:?}"),
    }
}

// ============================================
// Property-Based Tests
// ============================================

/// Strategy for acyclic dependency sets: recipe i may depend only on
/// recipes with a higher index
fn dag_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (2usize..8).prop_flat_map(|n| {
        let mut recipes = Vec::with_capacity(n);
        for i in 0..n {
            let choices: Vec<usize> = (i + 1..n).collect();
            recipes.push(proptest::sample::subsequence(choices, 0..n - i));
        }
        recipes
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any acyclic, conflict-free recipe set, every recipe appears
    /// after all of its dependencies, and resolution is deterministic.
    #[test]
    fn prop_acyclic_sets_resolve_in_dependency_order(deps in dag_strategy()) {
        let names: Vec<String> = (0..deps.len()).map(|i| format!("r{i}")).collect();
        let mut reg = Registry::new();
        for (i, dep_indices) in deps.iter().enumerate() {
            let dep_names: Vec<&str> = dep_indices.iter().map(|j| names[*j].as_str()).collect();
            reg.insert(simple(&names[i], &dep_names));
        }

        let requested: Vec<String> = names.clone();
        let order = resolver::resolve(&requested, &reg).unwrap();
        let again = resolver::resolve(&requested, &reg).unwrap();
        prop_assert_eq!(order.as_slice(), again.as_slice());

        for (i, dep_indices) in deps.iter().enumerate() {
            let pos = order.position(&names[i]).unwrap();
            for j in dep_indices {
                prop_assert!(
                    order.position(&names[*j]).unwrap() < pos,
                    "{} must precede {}", names[*j], names[i]
                );
            }
        }
    }
}
