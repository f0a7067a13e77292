// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use super::{Conduit, SmcccPlatform};
use core::arch::asm;
use smccc::{FunctionId, SMCCC_MAX_ARGS, SMCCC_RET_NOT_SUPPORTED, SmcccRes};

/// SMCCC v1.1 calls issued directly with `HVC #0` or `SMC #0`.
#[derive(Clone, Copy, Debug)]
pub struct ArmSmcccPlatform {
    conduit: Conduit,
}

impl ArmSmcccPlatform {
    /// # Safety
    /// The caller must pass the conduit advertised by the firmware.  Issuing
    /// a call through a conduit that is not implemented raises an exception
    /// that the guest may not be prepared to handle.
    pub const unsafe fn new(conduit: Conduit) -> Self {
        Self { conduit }
    }
}

impl SmcccPlatform for ArmSmcccPlatform {
    fn conduit(&self) -> Conduit {
        self.conduit
    }

    fn invoke(&self, func: FunctionId, args: &[u64]) -> SmcccRes {
        debug_assert!(args.len() <= SMCCC_MAX_ARGS);
        let mut regs = [0u64; SMCCC_MAX_ARGS];
        for (reg, arg) in regs.iter_mut().zip(args) {
            *reg = *arg;
        }

        match self.conduit {
            // SAFETY: the conduit was supplied by the firmware interface at
            // construction time, and SMCCC v1.1 preserves every register
            // other than x0-x3.
            Conduit::Hvc => unsafe { hvc_call(func, regs) },
            // SAFETY: as above.
            Conduit::Smc => unsafe { smc_call(func, regs) },
            Conduit::None => SmcccRes::new(SMCCC_RET_NOT_SUPPORTED as u64, 0, 0, 0),
        }
    }
}

/// # Safety
/// The caller must ensure that an HVC conduit exists.
unsafe fn hvc_call(func: FunctionId, args: [u64; SMCCC_MAX_ARGS]) -> SmcccRes {
    let a0: u64;
    let a1: u64;
    let a2: u64;
    let a3: u64;
    // SAFETY: the caller guarantees the conduit; the asm only touches x0-x3.
    unsafe {
        asm!(
            "hvc #0",
            inout("x0") u64::from(u32::from(func)) => a0,
            inout("x1") args[0] => a1,
            inout("x2") args[1] => a2,
            inout("x3") args[2] => a3,
            options(nostack),
        );
    }
    SmcccRes::new(a0, a1, a2, a3)
}

/// # Safety
/// The caller must ensure that an SMC conduit exists.
unsafe fn smc_call(func: FunctionId, args: [u64; SMCCC_MAX_ARGS]) -> SmcccRes {
    let a0: u64;
    let a1: u64;
    let a2: u64;
    let a3: u64;
    // SAFETY: the caller guarantees the conduit; the asm only touches x0-x3.
    unsafe {
        asm!(
            "smc #0",
            inout("x0") u64::from(u32::from(func)) => a0,
            inout("x1") args[0] => a1,
            inout("x2") args[1] => a2,
            inout("x3") args[2] => a3,
            options(nostack),
        );
    }
    SmcccRes::new(a0, a1, a2, a3)
}
