//! Target architecture descriptors
//!
//! Each Android ABI carries the toolchain triple used for binutils lookup,
//! the clang `-target` value, the platform sysroot directory name, and the
//! range of platform API levels it supports.

use std::fmt;

/// A target architecture (Android ABI)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arch {
    /// ABI name (e.g. "armeabi-v7a")
    pub name: &'static str,
    /// Toolchain triple (e.g. "arm-linux-androideabi")
    pub triple: &'static str,
    /// Clang `-target` value (e.g. "armv7-none-linux-androideabi")
    pub clang_target: &'static str,
    /// Directory name under `platforms/android-<api>/`
    pub platform_dir: &'static str,
    /// Lowest platform API with support for this ABI
    pub min_api: u32,
    /// Highest platform API with support for this ABI, if bounded
    pub max_api: Option<u32>,
}

impl Arch {
    /// 32-bit ARM
    pub fn armeabi_v7a() -> Self {
        Self {
            name: "armeabi-v7a",
            triple: "arm-linux-androideabi",
            clang_target: "armv7-none-linux-androideabi",
            platform_dir: "arch-arm",
            min_api: 16,
            max_api: None,
        }
    }

    /// 64-bit ARM
    pub fn arm64_v8a() -> Self {
        Self {
            name: "arm64-v8a",
            triple: "aarch64-linux-android",
            clang_target: "aarch64-none-linux-android",
            platform_dir: "arch-arm64",
            min_api: 21,
            max_api: None,
        }
    }

    /// 32-bit x86
    pub fn x86() -> Self {
        Self {
            name: "x86",
            triple: "i686-linux-android",
            clang_target: "i686-none-linux-android",
            platform_dir: "arch-x86",
            min_api: 16,
            max_api: None,
        }
    }

    /// 64-bit x86
    pub fn x86_64() -> Self {
        Self {
            name: "x86_64",
            triple: "x86_64-linux-android",
            clang_target: "x86_64-none-linux-android",
            platform_dir: "arch-x86_64",
            min_api: 21,
            max_api: None,
        }
    }

    /// All supported architectures
    pub fn all() -> Vec<Self> {
        vec![
            Self::armeabi_v7a(),
            Self::arm64_v8a(),
            Self::x86(),
            Self::x86_64(),
        ]
    }

    /// Look up an architecture by ABI name
    pub fn by_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|a| a.name == name)
    }

    /// Whether this architecture supports the given platform API level
    pub fn supports_api(&self, api: u32) -> bool {
        api >= self.min_api && self.max_api.map_or(true, |max| api <= max)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
