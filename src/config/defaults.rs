//! Default configuration values

/// Default Android platform API level
pub const DEFAULT_PLATFORM_API: u32 = 21;

/// Host tag for prebuilt NDK toolchains
pub const DEFAULT_NDK_HOST_TAG: &str = "linux-x86_64";

/// GCC toolchain version suffix used by NDK toolchain directories
pub const NDK_TOOLCHAIN_VERSION: &str = "4.9";

/// Runtime shared-library base name (lib<runtime><version>m.so)
pub const RUNTIME_LIB_NAME: &str = "python";

/// Major.minor version tag of the bundled runtime
pub const RUNTIME_VERSION_TAG: &str = "3.7";

/// Host-side interpreter used for byte-compilation
pub const DEFAULT_HOST_INTERPRETER: &str = "python3";

/// Directory name for collected extension modules inside a bundle
pub const BUNDLE_MODULES_DIR: &str = "modules";

/// Directory name for the filtered standard library inside a bundle
pub const BUNDLE_STDLIB_DIR: &str = "stdlib";

/// File name of the compressed standard library archive
pub const BUNDLE_STDLIB_ZIP: &str = "stdlib.zip";

/// Directory name for filtered third-party packages inside a bundle
pub const BUNDLE_SITE_PACKAGES_DIR: &str = "site-packages";

/// Directory name for per-architecture shared libraries inside a bundle
pub const BUNDLE_LIBS_DIR: &str = "libs";
