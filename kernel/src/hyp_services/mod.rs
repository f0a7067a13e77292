// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

//! Discovery of the KVM vendor hypervisor services.
//!
//! [`KvmHypServices`] holds the results of discovery.  Both the service
//! bitmap and the target implementation CPU table are written once during
//! boot and are read-only afterwards; a consumer either sees nothing or the
//! complete result of a stage.

pub mod arch;
pub mod flags;
pub mod probe;
pub mod ptp;
pub mod target_impl;

pub use arch::{ArchHypServices, Arm64HypServices, NoArchHypServices};
pub use flags::KvmHypServiceFlags;
pub use ptp::{PtpCounter, PtpCrosstamp};
pub use target_impl::{TargetImplCpu, TargetImplCpus};

use crate::config::KvmGuestConfig;
use crate::error::KvmGuestError;
use crate::platform::SmcccPlatform;
use crate::utils::ImmutAfterInitCell;
use cpuarch::midr::{Midr, MidrRange, is_midr_in_range_list};

#[derive(Debug)]
pub struct KvmHypServices {
    config: KvmGuestConfig,
    services: ImmutAfterInitCell<KvmHypServiceFlags>,
    target_impl_cpus: ImmutAfterInitCell<TargetImplCpus>,
}

impl KvmHypServices {
    pub const fn new(config: KvmGuestConfig) -> Self {
        Self {
            config,
            services: ImmutAfterInitCell::uninit(),
            target_impl_cpus: ImmutAfterInitCell::uninit(),
        }
    }

    pub fn config(&self) -> &KvmGuestConfig {
        &self.config
    }

    /// Probes for KVM and publishes the service bitmap.  On success `arch`
    /// is given the chance to act on the published bitmap.
    ///
    /// Failure to find KVM is not an error: the empty set is published and
    /// returned.  Calling this again after the first run returns the
    /// published set without issuing any calls.
    pub fn init_hyp_services(
        &self,
        platform: &dyn SmcccPlatform,
        arch: &mut dyn ArchHypServices,
    ) -> KvmHypServiceFlags {
        if let Ok(services) = self.services.try_get_inner() {
            return *services;
        }

        let (services, found) = match probe::probe(platform) {
            Ok(services) => (services, true),
            Err(err) => {
                log::debug!("KVM hypervisor services unavailable: {}", err);
                (KvmHypServiceFlags::empty(), false)
            }
        };

        if self.services.init(services).is_err() {
            log::warn!("KVM hypervisor services already published");
            return self.services();
        }

        if found {
            arch.init_hyp_services(self, platform);
        }

        services
    }

    /// The published service bitmap, or the empty set before discovery.
    pub fn services(&self) -> KvmHypServiceFlags {
        self.services
            .try_get_inner()
            .map_or(KvmHypServiceFlags::empty(), |services| *services)
    }

    pub fn hyp_service_available(&self, func_id: u32) -> bool {
        self.services().has(func_id)
    }

    /// Enumerates the target implementation CPUs.  Does nothing once a table
    /// has been published; every failure leaves the table empty.
    pub fn init_target_impl_cpus(&self, platform: &dyn SmcccPlatform) {
        if self.target_impl_cpus.is_init() {
            return;
        }

        let published = target_impl::discover(self.services(), platform, &self.config)
            .and_then(|cpus| {
                let count = cpus.len();
                self.target_impl_cpus
                    .init(cpus)
                    .map_err(|_| KvmGuestError::AlreadyInitialized)?;
                Ok(count)
            });

        match published {
            Ok(count) => log::info!("Number of target implementation CPUs is {}", count),
            Err(KvmGuestError::ServiceUnavailable(func)) => {
                log::debug!("Target implementation CPU discovery unavailable (function {})", func)
            }
            Err(err) => log::warn!("{}", err),
        }
    }

    /// The published target implementation CPUs in hypervisor order; empty
    /// if discovery has not run or did not succeed.
    pub fn target_impl_cpus(&self) -> &[TargetImplCpu] {
        self.target_impl_cpus
            .try_get_inner()
            .map(TargetImplCpus::as_slice)
            .unwrap_or(&[])
    }

    pub fn target_impl_cpu_num(&self) -> usize {
        self.target_impl_cpus().len()
    }

    /// Checks `ranges` against every published target implementation, or
    /// against `current` when the hypervisor described none.
    pub fn is_midr_in_range_list(&self, current: Midr, ranges: &[MidrRange]) -> bool {
        match self.target_impl_cpus.try_get_inner() {
            Ok(cpus) => cpus.is_midr_in_range_list(ranges),
            Err(_) => is_midr_in_range_list(current, ranges),
        }
    }

    pub fn ptp_get_crosststamp(
        &self,
        platform: &dyn SmcccPlatform,
        counter: PtpCounter,
    ) -> Result<PtpCrosstamp, KvmGuestError> {
        ptp::get_crosststamp(self.services(), platform, counter)
    }
}

impl Default for KvmHypServices {
    fn default() -> Self {
        Self::new(KvmGuestConfig::DEFAULT)
    }
}
