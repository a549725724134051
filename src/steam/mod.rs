//! Steam integration module
//!
//! Locates the Steam root for native and Flatpak clients and manages GE-Proton
//! entries in its `compatibilitytools.d`.

mod paths;
mod proton;

pub use paths::{
    locate_install_target, root_path, InstallTarget, COMPAT_TOOLS_DIR, COMPAT_TOOLS_MODE,
};
pub use proton::{
    find_installed_ge_protons, is_release_installed, prune_prior_versions, InstalledEntry,
    GE_PROTON_PREFIX,
};

#[cfg(test)]
pub(crate) use proton::prune_with;
