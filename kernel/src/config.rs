// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

/// Upper bound on the number of target implementation CPU descriptors
/// accepted from the hypervisor.
pub const DEFAULT_MAX_TARGET_IMPL_CPUS: usize = 64;

/// Boot-time tunables for hypervisor service discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KvmGuestConfig {
    /// Sanity bound applied to the untrusted CPU implementation count before
    /// any memory is reserved for the table.
    pub max_target_impl_cpus: usize,
}

impl KvmGuestConfig {
    pub const DEFAULT: Self = Self {
        max_target_impl_cpus: DEFAULT_MAX_TARGET_IMPL_CPUS,
    };

    pub const fn with_max_target_impl_cpus(self, max_target_impl_cpus: usize) -> Self {
        Self {
            max_target_impl_cpus,
        }
    }
}

impl Default for KvmGuestConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
