// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use super::flags::KvmHypServiceFlags;
use crate::error::KvmGuestError;
use crate::platform::{Conduit, SmcccPlatform};
use core::time::Duration;
use smccc::SmcccError;
use smccc::kvm::{
    ARM_SMCCC_KVM_FUNC_PTP, ARM_SMCCC_VENDOR_HYP_KVM_PTP_FUNC_ID, KVM_PTP_PHYS_COUNTER,
    KVM_PTP_VIRT_COUNTER,
};

const LOWER_32_BITS: u64 = 0xffff_ffff;

/// The architected counter sampled alongside the host wall clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PtpCounter {
    Virtual,
    Physical,
}

impl PtpCounter {
    const fn selector(self) -> u64 {
        match self {
            Self::Virtual => KVM_PTP_VIRT_COUNTER,
            Self::Physical => KVM_PTP_PHYS_COUNTER,
        }
    }
}

/// A host wall-clock reading paired with the guest counter value sampled at
/// the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PtpCrosstamp {
    pub wall_clock_ns: u64,
    pub counter: u64,
}

impl PtpCrosstamp {
    pub fn wall_clock(&self) -> Duration {
        Duration::from_nanos(self.wall_clock_ns)
    }
}

pub fn get_crosststamp(
    services: KvmHypServiceFlags,
    platform: &dyn SmcccPlatform,
    counter: PtpCounter,
) -> Result<PtpCrosstamp, KvmGuestError> {
    if !services.has(ARM_SMCCC_KVM_FUNC_PTP) {
        return Err(KvmGuestError::ServiceUnavailable(ARM_SMCCC_KVM_FUNC_PTP));
    }
    if platform.conduit() != Conduit::Hvc {
        return Err(KvmGuestError::ConduitAbsent);
    }

    let res = platform.invoke(ARM_SMCCC_VENDOR_HYP_KVM_PTP_FUNC_ID, &[counter.selector()]);
    // Each register carries 32 bits of the result, so a negative status can
    // only be detected in the low word of a0.
    if (res.a0 as u32 as i32) < 0 {
        return Err(KvmGuestError::Smccc(SmcccError::NotSupported));
    }

    Ok(PtpCrosstamp {
        wall_clock_ns: ((res.a0 & LOWER_32_BITS) << 32) | (res.a1 & LOWER_32_BITS),
        counter: ((res.a2 & LOWER_32_BITS) << 32) | (res.a3 & LOWER_32_BITS),
    })
}
