//! Build-order resolution
//!
//! Expands a requested set of recipes into the full selected set, resolves
//! each alternative-group to one concrete choice, computes a stable
//! topological build order, and validates that no two selected recipes
//! conflict.
//!
//! Alternative-group policy: prefer a member that is already part of the
//! build (selected earlier in the expansion, or implied by another recipe's
//! required dependencies), otherwise take the first listed member.
//!
//! Optional dependencies are soft edges: they never pull a recipe into the
//! build, but when the optional recipe is present it is ordered strictly
//! before every recipe that lists it, so its build outputs exist by the time
//! a consumer's environment references them.

use std::collections::{HashMap, HashSet};

use crate::core::recipe::{DependencySpec, Registry};
use crate::error::ResolverError;

/// A validated, linear build order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOrder {
    order: Vec<String>,
}

impl BuildOrder {
    /// Recipes in build order, dependencies first
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    /// Whether a recipe is part of this build
    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|n| n == name)
    }

    /// Position of a recipe in the order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }

    /// Iterate recipes in build order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.order.iter()
    }

    /// Number of recipes in the order
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if no recipes were selected
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Resolve a requested recipe set into a conflict-free build order
pub fn resolve(requested: &[String], registry: &Registry) -> Result<BuildOrder, ResolverError> {
    let implied = implied_closure(requested, registry)?;

    // Expansion: select recipes depth-first in requested order, resolving
    // each alternative-group to one concrete choice as it is encountered.
    let mut selected: Vec<String> = Vec::new();
    let mut selected_set: HashSet<String> = HashSet::new();
    let mut chosen_deps: HashMap<String, Vec<String>> = HashMap::new();
    for name in requested {
        select(
            name,
            None,
            registry,
            &implied,
            &mut selected,
            &mut selected_set,
            &mut chosen_deps,
        )?;
    }

    // Soft edges: optional dependencies that ended up selected
    let mut soft_deps: HashMap<String, Vec<String>> = HashMap::new();
    for name in &selected {
        if let Ok(recipe) = registry.get(name) {
            let soft: Vec<String> = recipe
                .recipe
                .opt_depends
                .iter()
                .filter(|opt| selected_set.contains(*opt))
                .cloned()
                .collect();
            soft_deps.insert(name.clone(), soft);
        }
    }

    let order = topological_sort(&selected, &chosen_deps, &soft_deps)?;
    check_conflicts(&order, registry)?;

    Ok(BuildOrder { order })
}

/// Closure over the requested set following only single (non-group) required
/// dependencies. Used to decide which alternative-group members are already
/// implied by the rest of the build.
fn implied_closure(
    requested: &[String],
    registry: &Registry,
) -> Result<HashSet<String>, ResolverError> {
    let mut implied: HashSet<String> = HashSet::new();
    let mut stack: Vec<(String, Option<String>)> =
        requested.iter().map(|n| (n.clone(), None)).collect();

    while let Some((name, requester)) = stack.pop() {
        if !implied.insert(name.clone()) {
            continue;
        }
        let recipe = registry
            .get(&name)
            .map_err(|_| unknown(&name, requester.as_deref()))?;
        for spec in &recipe.recipe.depends {
            if let DependencySpec::Single(dep) = spec {
                stack.push((dep.clone(), Some(name.clone())));
            }
        }
    }

    Ok(implied)
}

/// Error for a recipe name that is not in the registry, worded by whether it
/// was requested directly or pulled in as a dependency
fn unknown(name: &str, requester: Option<&str>) -> ResolverError {
    match requester {
        Some(requester) => ResolverError::UnknownRecipe {
            recipe: requester.to_string(),
            dependency: name.to_string(),
        },
        None => ResolverError::UnknownRequested {
            recipe: name.to_string(),
        },
    }
}

fn select(
    name: &str,
    requester: Option<&str>,
    registry: &Registry,
    implied: &HashSet<String>,
    selected: &mut Vec<String>,
    selected_set: &mut HashSet<String>,
    chosen_deps: &mut HashMap<String, Vec<String>>,
) -> Result<(), ResolverError> {
    if selected_set.contains(name) {
        return Ok(());
    }
    let recipe = registry
        .get(name)
        .map_err(|_| unknown(name, requester))?;

    selected.push(name.to_string());
    selected_set.insert(name.to_string());

    let mut deps = Vec::new();
    for spec in &recipe.recipe.depends {
        let chosen = match spec {
            DependencySpec::Single(dep) => dep.clone(),
            DependencySpec::Any(group) => choose_alternative(group, selected_set, implied),
        };
        deps.push(chosen);
    }
    chosen_deps.insert(name.to_string(), deps.clone());

    for dep in &deps {
        select(
            dep,
            Some(name),
            registry,
            implied,
            selected,
            selected_set,
            chosen_deps,
        )?;
    }

    Ok(())
}

/// Resolve one alternative-group to a single member
fn choose_alternative(
    group: &[String],
    selected_set: &HashSet<String>,
    implied: &HashSet<String>,
) -> String {
    group
        .iter()
        .find(|m| selected_set.contains(*m) || implied.contains(*m))
        .unwrap_or(&group[0])
        .clone()
}

/// Stable topological sort: nodes visited in first-seen order, dependencies
/// (hard, then soft) in listed order.
fn topological_sort(
    nodes: &[String],
    hard_deps: &HashMap<String, Vec<String>>,
    soft_deps: &HashMap<String, Vec<String>>,
) -> Result<Vec<String>, ResolverError> {
    let mut visited = HashSet::new();
    let mut temp_visited = HashSet::new();
    let mut result = Vec::new();
    let mut path = Vec::new();

    for node in nodes {
        if !visited.contains(node) {
            visit(
                node,
                hard_deps,
                soft_deps,
                &mut visited,
                &mut temp_visited,
                &mut result,
                &mut path,
            )?;
        }
    }

    Ok(result)
}

fn visit(
    node: &str,
    hard_deps: &HashMap<String, Vec<String>>,
    soft_deps: &HashMap<String, Vec<String>>,
    visited: &mut HashSet<String>,
    temp_visited: &mut HashSet<String>,
    result: &mut Vec<String>,
    path: &mut Vec<String>,
) -> Result<(), ResolverError> {
    if temp_visited.contains(node) {
        // Found a cycle; report it starting from its first occurrence
        let start = path.iter().position(|n| n == node).unwrap_or(0);
        let mut cycle: Vec<String> = path[start..].to_vec();
        cycle.push(node.to_string());
        return Err(ResolverError::Cycle { cycle });
    }

    if visited.contains(node) {
        return Ok(());
    }

    temp_visited.insert(node.to_string());
    path.push(node.to_string());

    let hard = hard_deps.get(node).map(Vec::as_slice).unwrap_or(&[]);
    let soft = soft_deps.get(node).map(Vec::as_slice).unwrap_or(&[]);
    for dep in hard.iter().chain(soft.iter()) {
        visit(
            dep,
            hard_deps,
            soft_deps,
            visited,
            temp_visited,
            result,
            path,
        )?;
    }

    path.pop();
    temp_visited.remove(node);
    visited.insert(node.to_string());
    result.push(node.to_string());

    Ok(())
}

/// Validate that no two recipes in the final order are mutually exclusive
fn check_conflicts(order: &[String], registry: &Registry) -> Result<(), ResolverError> {
    for (i, name) in order.iter().enumerate() {
        let Ok(recipe) = registry.get(name) else {
            continue;
        };
        for other in &order[i + 1..] {
            let other_recipe = registry.get(other);
            let forward = recipe.recipe.conflicts.iter().any(|c| c == other);
            let backward = other_recipe
                .map(|r| r.recipe.conflicts.iter().any(|c| c == name))
                .unwrap_or(false);
            if forward || backward {
                return Err(ResolverError::Conflict {
                    recipe: name.clone(),
                    conflicts_with: other.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::Recipe;

    fn recipe(toml_content: &str) -> Recipe {
        Recipe::from_toml(toml_content).expect("valid recipe")
    }

    fn registry(recipes: &[&str]) -> Registry {
        let mut reg = Registry::new();
        for r in recipes {
            reg.insert(recipe(r));
        }
        reg
    }

    fn simple(name: &str, depends: &[&str]) -> String {
        let deps: Vec<String> = depends.iter().map(|d| format!("\"{d}\"")).collect();
        format!(
            "[recipe]\nname = \"{name}\"\nversion = \"1.0\"\ndepends = [{}]\n",
            deps.join(", ")
        )
    }

    #[test]
    fn test_dependencies_come_first() {
        let reg = registry(&[
            &simple("app", &["lib"]),
            &simple("lib", &["zlib"]),
            &simple("zlib", &[]),
        ]);
        let order = resolve(&["app".to_string()], &reg).unwrap();

        assert!(order.position("zlib") < order.position("lib"));
        assert!(order.position("lib") < order.position("app"));
    }

    #[test]
    fn test_cycle_detected_with_path() {
        let reg = registry(&[
            &simple("a", &["b"]),
            &simple("b", &["c"]),
            &simple("c", &["a"]),
        ]);
        let err = resolve(&["a".to_string()], &reg).unwrap_err();
        match err {
            ResolverError::Cycle { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.len() >= 3);
            }
            other => panic!("Expected cycle error, got {other}"),
        }
    }

    #[test]
    fn test_conflict_names_both_recipes() {
        let reg = registry(&[
            "[recipe]\nname = \"python3\"\nversion = \"3.7\"\nconflicts = [\"python2\"]\n",
            "[recipe]\nname = \"python2\"\nversion = \"2.7\"\n",
        ]);
        let err = resolve(&["python3".to_string(), "python2".to_string()], &reg).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("python3"));
        assert!(message.contains("python2"));
    }

    #[test]
    fn test_conflict_checked_in_both_directions() {
        // Only python2 declares the conflict, python3 does not
        let reg = registry(&[
            "[recipe]\nname = \"python3\"\nversion = \"3.7\"\n",
            "[recipe]\nname = \"python2\"\nversion = \"2.7\"\nconflicts = [\"python3\"]\n",
        ]);
        let result = resolve(&["python3".to_string(), "python2".to_string()], &reg);
        assert!(matches!(result, Err(ResolverError::Conflict { .. })));
    }

    #[test]
    fn test_alternative_prefers_already_required() {
        // app requires hostpython3 directly; requests' group lists
        // hostpython2 first but must resolve to hostpython3
        let reg = registry(&[
            &simple("app", &["hostpython3", "requests"]),
            &simple("hostpython2", &[]),
            &simple("hostpython3", &[]),
            "[recipe]\nname = \"requests\"\nversion = \"2.13.0\"\ndepends = [[\"hostpython2\", \"hostpython3\"]]\n",
        ]);
        let order = resolve(&["app".to_string()], &reg).unwrap();

        assert!(order.contains("hostpython3"));
        assert!(!order.contains("hostpython2"));
    }

    #[test]
    fn test_alternative_falls_back_to_first_listed() {
        let reg = registry(&[
            &simple("hostpython2", &[]),
            &simple("hostpython3", &[]),
            "[recipe]\nname = \"requests\"\nversion = \"2.13.0\"\ndepends = [[\"hostpython2\", \"hostpython3\"]]\n",
        ]);
        let order = resolve(&["requests".to_string()], &reg).unwrap();

        assert!(order.contains("hostpython2"));
        assert!(!order.contains("hostpython3"));
    }

    #[test]
    fn test_optional_dependency_ordered_before_consumer() {
        let reg = registry(&[
            "[recipe]\nname = \"python3\"\nversion = \"3.7\"\nopt_depends = [\"openssl\"]\n",
            &simple("openssl", &[]),
        ]);
        // Requested with the consumer first; the soft edge must still put
        // openssl earlier in the order.
        let order = resolve(&["python3".to_string(), "openssl".to_string()], &reg).unwrap();
        assert!(order.position("openssl") < order.position("python3"));
    }

    #[test]
    fn test_optional_dependency_not_pulled_in() {
        let reg = registry(&[
            "[recipe]\nname = \"python3\"\nversion = \"3.7\"\nopt_depends = [\"openssl\"]\n",
            &simple("openssl", &[]),
        ]);
        let order = resolve(&["python3".to_string()], &reg).unwrap();
        assert!(!order.contains("openssl"));
    }

    #[test]
    fn test_unknown_dependency_names_requirer() {
        let reg = registry(&[&simple("app", &["missing"])]);
        let err = resolve(&["app".to_string()], &reg).unwrap_err();
        match err {
            ResolverError::UnknownRecipe { recipe, dependency } => {
                assert_eq!(recipe, "app");
                assert_eq!(dependency, "missing");
            }
            other => panic!("Expected unknown recipe error, got {other}"),
        }
    }

    #[test]
    fn test_unknown_requested_recipe_named_plainly() {
        let reg = registry(&[]);
        let err = resolve(&["ghost".to_string()], &reg).unwrap_err();
        match &err {
            ResolverError::UnknownRequested { recipe } => assert_eq!(recipe, "ghost"),
            other => panic!("Expected unknown requested error, got {other}"),
        }
        assert!(!err.to_string().contains("required by"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let reg = registry(&[
            &simple("app", &["lib1", "lib2"]),
            &simple("lib1", &["zlib"]),
            &simple("lib2", &["zlib"]),
            &simple("zlib", &[]),
        ]);
        let first = resolve(&["app".to_string()], &reg).unwrap();
        let second = resolve(&["app".to_string()], &reg).unwrap();
        assert_eq!(first, second);
    }
}
