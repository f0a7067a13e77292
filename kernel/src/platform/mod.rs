// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use smccc::{FunctionId, SmcccRes};

#[cfg(target_arch = "aarch64")]
pub mod arm;

#[cfg(target_arch = "aarch64")]
pub use arm::ArmSmcccPlatform;

/// The instruction class used to reach the SMCCC implementation, as
/// selected by the firmware interface (PSCI) before discovery runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conduit {
    None,
    Smc,
    Hvc,
}

/// The services a guest platform provides to hypervisor discovery.
pub trait SmcccPlatform {
    /// Returns the conduit that SMCCC v1.1 calls travel through.
    fn conduit(&self) -> Conduit;

    /// Issues one synchronous SMCCC v1.1 call.  At most
    /// [`smccc::SMCCC_MAX_ARGS`] arguments are passed; missing arguments are
    /// zero.
    fn invoke(&self, func: FunctionId, args: &[u64]) -> SmcccRes;
}
