//! NDK directory layout
//!
//! Path conventions over an installed Android NDK tree. Every toolchain path
//! used by a build is derived here so that build logic never re-assembles
//! paths from strings.
//!
//! The layout covered is the unified-headers NDK (r14+): a shared clang under
//! `toolchains/llvm`, per-triple GCC toolchains for binutils, a common
//! `sysroot/` for headers, and per-API `platforms/` sysroots for linking.

use std::path::{Path, PathBuf};

use crate::config::defaults::NDK_TOOLCHAIN_VERSION;
use crate::core::arch::Arch;

/// An installed NDK tree plus the host tag of its prebuilt binaries
#[derive(Debug, Clone)]
pub struct NdkLayout {
    root: PathBuf,
    host_tag: String,
}

impl NdkLayout {
    /// Create a layout over an NDK root directory
    pub fn new(root: PathBuf, host_tag: &str) -> Self {
        Self {
            root,
            host_tag: host_tag.to_string(),
        }
    }

    /// NDK root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// GCC toolchain directory for an architecture's triple
    /// (`toolchains/<triple>-4.9/prebuilt/<host_tag>`)
    pub fn toolchain_dir(&self, arch: &Arch) -> PathBuf {
        self.root
            .join("toolchains")
            .join(format!("{}-{}", arch.triple, NDK_TOOLCHAIN_VERSION))
            .join("prebuilt")
            .join(&self.host_tag)
    }

    /// Path to the shared clang driver
    pub fn clang(&self) -> PathBuf {
        self.root
            .join("toolchains")
            .join("llvm")
            .join("prebuilt")
            .join(&self.host_tag)
            .join("bin")
            .join("clang")
    }

    /// A binutils tool from the triple's GCC toolchain
    /// (`<toolchain>/bin/<triple>-<tool>`)
    pub fn tool(&self, arch: &Arch, tool: &str) -> PathBuf {
        self.toolchain_dir(arch)
            .join("bin")
            .join(format!("{}-{}", arch.triple, tool))
    }

    /// Unified-headers sysroot used for compilation
    pub fn header_sysroot(&self) -> PathBuf {
        self.root.join("sysroot")
    }

    /// Per-triple include directory under the unified-headers sysroot
    pub fn triple_include_dir(&self, arch: &Arch) -> PathBuf {
        self.header_sysroot()
            .join("usr")
            .join("include")
            .join(&arch.triple)
    }

    /// Per-API platform sysroot used for linking
    /// (`platforms/android-<api>/<platform_dir>`)
    pub fn platform_sysroot(&self, api: u32, arch: &Arch) -> PathBuf {
        self.root
            .join("platforms")
            .join(format!("android-{api}"))
            .join(arch.platform_dir)
    }

    /// Library directory under the platform sysroot
    pub fn platform_lib_dir(&self, api: u32, arch: &Arch) -> PathBuf {
        self.platform_sysroot(api, arch).join("usr").join("lib")
    }
}
