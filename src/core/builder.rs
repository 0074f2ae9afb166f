//! Recipe build execution and orchestration
//!
//! Each (recipe, architecture) build walks a fixed phase sequence with two
//! idempotency checkpoints read before the step runs: the configured marker
//! skips configuration, the built marker (the primary artifact) skips the
//! build. Restart after a failure is purely a consequence of marker presence.
//!
//! Build behavior is dispatched by phase through [`BuildSteps`]; the default
//! implementation drives a configure-then-make build from recipe data.

use std::path::Path;

use crate::core::arch::Arch;
use crate::core::build_env::BuildContext;
use crate::core::recipe::{Recipe, Registry};
use crate::core::resolver::BuildOrder;
use crate::error::{BuildError, DroidforgeError};
use crate::infra::dirs::BuildDirs;
use crate::infra::filesystem;
use crate::infra::ndk::NdkLayout;
use crate::infra::process::CommandRunner;

/// Where a (recipe, architecture) build stands, derived from marker files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Nothing has run yet
    NotStarted,
    /// Configuration ran, the primary artifact is absent
    Configured,
    /// The primary artifact exists
    Done,
}

/// Outcome of one recipe build
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Recipe name
    pub recipe: String,
    /// Architecture name
    pub arch: String,
    /// Configuration was skipped because its marker already existed
    pub configure_skipped: bool,
    /// The build was skipped because the artifact already existed
    pub build_skipped: bool,
}

/// Everything a build phase needs
pub struct StepContext<'a> {
    /// The recipe being built
    pub recipe: &'a Recipe,
    /// Target architecture
    pub arch: &'a Arch,
    /// Platform API level
    pub api: u32,
    /// The recipe's build directory; every command runs here
    pub build_dir: &'a Path,
    /// Environment for spawned commands
    pub ctx: &'a BuildContext,
    /// Process spawner
    pub runner: &'a dyn CommandRunner,
    /// NDK layout, for staging platform objects
    pub ndk: &'a NdkLayout,
}

impl StepContext<'_> {
    /// Run an external tool in the build directory. A non-zero exit is fatal
    /// for the recipe.
    pub fn run(&self, program: &str, args: &[String]) -> Result<(), BuildError> {
        let output = self
            .runner
            .run(program, args, self.build_dir, self.ctx.vars())
            .map_err(|e| BuildError::SpawnFailed {
                recipe: self.recipe.name().to_string(),
                command: program.to_string(),
                error: e,
            })?;
        if !output.success {
            return Err(BuildError::BuildFailed {
                recipe: self.recipe.name().to_string(),
                arch: self.arch.name.to_string(),
                output: output.combined(),
            });
        }
        Ok(())
    }
}

/// Build behavior, dispatched by phase
///
/// The defaults drive a configure-then-make build from recipe data; a recipe
/// needing different behavior overrides only the phases it cares about.
pub trait BuildSteps {
    /// Runs before configuration. Default: stage platform objects the linker
    /// fails to pick up through `--sysroot` alone.
    fn prebuild(&self, cx: &StepContext<'_>) -> Result<(), DroidforgeError> {
        for object in &cx.recipe.build.staged_objects {
            let src = cx.ndk.platform_lib_dir(cx.api, cx.arch).join(object);
            filesystem::copy_file(&src, &cx.build_dir.join(object))?;
        }
        Ok(())
    }

    /// Configuration phase. Default: run the recipe's configure program with
    /// its substituted arguments.
    fn configure(&self, cx: &StepContext<'_>) -> Result<(), DroidforgeError> {
        let args: Vec<String> = cx
            .recipe
            .build
            .configure_args
            .iter()
            .map(|a| expand_placeholders(a, cx.recipe, cx.arch, cx.api))
            .collect();
        cx.run(&cx.recipe.build.configure_program, &args)?;
        Ok(())
    }

    /// Build phase. Default: `make -j<jobs> <make_args>`.
    fn build(&self, cx: &StepContext<'_>) -> Result<(), DroidforgeError> {
        let mut args = vec![format!("-j{}", num_cpus::get())];
        args.extend(cx.recipe.build.make_args.iter().cloned());
        cx.run("make", &args)?;
        Ok(())
    }

    /// Runs after the build phase, also when the build was skipped. Default:
    /// copy generated headers where dependents expect them.
    fn postbuild(&self, cx: &StepContext<'_>) -> Result<(), DroidforgeError> {
        for header in &cx.recipe.build.exported_headers {
            filesystem::copy_file(
                &cx.build_dir.join(&header.src),
                &cx.build_dir.join(&header.dst),
            )?;
        }
        Ok(())
    }
}

/// The default configure-then-make behavior
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigureMakeSteps;

impl BuildSteps for ConfigureMakeSteps {}

/// Substitute `{triple}`, `{clang_target}`, `{api}` and `{version}` in a
/// configure argument
fn expand_placeholders(arg: &str, recipe: &Recipe, arch: &Arch, api: u32) -> String {
    arg.replace("{triple}", arch.triple)
        .replace("{clang_target}", arch.clang_target)
        .replace("{api}", &api.to_string())
        .replace("{version}", recipe.version())
}

/// Executes single recipe builds against a build directory layout
pub struct Executor<'a> {
    runner: &'a dyn CommandRunner,
    dirs: &'a BuildDirs,
    ndk: &'a NdkLayout,
    api: u32,
}

impl<'a> Executor<'a> {
    /// Create an executor
    pub fn new(
        runner: &'a dyn CommandRunner,
        dirs: &'a BuildDirs,
        ndk: &'a NdkLayout,
        api: u32,
    ) -> Self {
        Self {
            runner,
            dirs,
            ndk,
            api,
        }
    }

    /// Current phase of a (recipe, architecture) build, from marker files
    pub fn phase(&self, recipe: &Recipe, arch: &Arch) -> BuildPhase {
        let build_dir = self.dirs.recipe_build_dir(recipe.name(), arch.name);
        if build_dir.join(recipe.built_marker()).exists() {
            BuildPhase::Done
        } else if build_dir.join(&recipe.build.configured_marker).exists() {
            BuildPhase::Configured
        } else {
            BuildPhase::NotStarted
        }
    }

    /// Build one recipe with the default phase behavior
    pub fn execute(
        &self,
        recipe: &Recipe,
        arch: &Arch,
        ctx: &BuildContext,
    ) -> Result<BuildResult, DroidforgeError> {
        self.execute_with_steps(recipe, arch, ctx, &ConfigureMakeSteps)
    }

    /// Build one recipe with custom phase behavior
    pub fn execute_with_steps(
        &self,
        recipe: &Recipe,
        arch: &Arch,
        ctx: &BuildContext,
        steps: &dyn BuildSteps,
    ) -> Result<BuildResult, DroidforgeError> {
        let build_dir = self.dirs.recipe_build_dir(recipe.name(), arch.name);
        filesystem::create_dir_all(&build_dir)?;

        // Markers are read up front, never mid-step
        let configure_skipped = build_dir.join(&recipe.build.configured_marker).exists();
        let build_skipped = build_dir.join(recipe.built_marker()).exists();

        let cx = StepContext {
            recipe,
            arch,
            api: self.api,
            build_dir: &build_dir,
            ctx,
            runner: self.runner,
            ndk: self.ndk,
        };

        if configure_skipped {
            tracing::info!("{} ({}): already configured, skipping", recipe.name(), arch);
        } else {
            tracing::info!("{} ({}): configuring", recipe.name(), arch);
            steps.prebuild(&cx)?;
            steps.configure(&cx)?;
        }

        if build_skipped {
            tracing::info!("{} ({}): already built, skipping", recipe.name(), arch);
        } else {
            tracing::info!("{} ({}): building", recipe.name(), arch);
            steps.build(&cx)?;
        }

        // Always re-run: the build tool creates the artifact marker, so a
        // failure between it and the header export must be repairable by a
        // plain restart
        steps.postbuild(&cx)?;

        Ok(BuildResult {
            recipe: recipe.name().to_string(),
            arch: arch.name.to_string(),
            configure_skipped,
            build_skipped,
        })
    }
}

/// Builds every recipe of a [`BuildOrder`] in sequence for one architecture.
/// The first failure aborts the remaining recipes; already-built recipes stay
/// on disk.
#[allow(clippy::too_many_arguments)]
pub fn build_all(
    order: &BuildOrder,
    arch: &Arch,
    api: u32,
    registry: &Registry,
    dirs: &BuildDirs,
    ndk: &NdkLayout,
    runner: &dyn CommandRunner,
    host_bin: &Path,
    base_env: &std::collections::HashMap<String, String>,
) -> Result<Vec<BuildResult>, DroidforgeError> {
    let executor = Executor::new(runner, dirs, ndk, api);
    let mut results = Vec::with_capacity(order.len());

    for name in order.iter() {
        let recipe = registry.get(name)?;
        let ctx = BuildContext::for_recipe(
            recipe, arch, api, ndk, order, registry, dirs, host_bin, base_env,
        )?;
        results.push(executor.execute(recipe, arch, &ctx)?);
    }

    Ok(results)
}
