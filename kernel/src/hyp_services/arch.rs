// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use super::KvmHypServices;
use crate::platform::SmcccPlatform;

/// Architecture-specific follow-up run once the KVM service bitmap has been
/// published.
pub trait ArchHypServices {
    fn init_hyp_services(&mut self, services: &KvmHypServices, platform: &dyn SmcccPlatform);
}

/// No follow-up.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoArchHypServices;

impl ArchHypServices for NoArchHypServices {
    fn init_hyp_services(&mut self, _services: &KvmHypServices, _platform: &dyn SmcccPlatform) {}
}

/// AArch64 guests discover the CPU implementations they may be migrated
/// across as soon as the service bitmap is known.
#[derive(Clone, Copy, Debug, Default)]
pub struct Arm64HypServices;

impl ArchHypServices for Arm64HypServices {
    fn init_hyp_services(&mut self, services: &KvmHypServices, platform: &dyn SmcccPlatform) {
        services.init_target_impl_cpus(platform);
    }
}
