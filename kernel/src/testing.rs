// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

//! A scripted KVM vendor hypervisor for unit tests.

use crate::hyp_services::TargetImplCpu;
use crate::platform::{Conduit, SmcccPlatform};
use alloc::vec::Vec;
use core::cell::RefCell;
use smccc::kvm::{
    ARM_SMCCC_VENDOR_HYP_CALL_UID_FUNC_ID, ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_CPUS_FUNC_ID,
    ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_VER_FUNC_ID, ARM_SMCCC_VENDOR_HYP_KVM_FEATURES_FUNC_ID,
    ARM_SMCCC_VENDOR_HYP_KVM_PTP_FUNC_ID, ARM_SMCCC_VENDOR_HYP_UID_KVM,
};
use smccc::{FunctionId, SMCCC_RET_NOT_SUPPORTED, SmcccRes};

pub const SMCCC_NOT_SUPPORTED: u64 = SMCCC_RET_NOT_SUPPORTED as u64;

const NOT_SUPPORTED: SmcccRes = SmcccRes::new(SMCCC_NOT_SUPPORTED, 0, 0, 0);

/// Answers the KVM vendor hypervisor functions from canned responses and
/// records every call it receives.
#[derive(Debug)]
pub struct MockKvm {
    conduit: Conduit,
    uid: SmcccRes,
    features: SmcccRes,
    impl_version: SmcccRes,
    impl_cpus: Vec<SmcccRes>,
    ptp: SmcccRes,
    calls: RefCell<Vec<(FunctionId, [u64; smccc::SMCCC_MAX_ARGS])>>,
}

impl MockKvm {
    /// A KVM hypervisor on an HVC conduit that advertises no functions.
    pub fn new() -> Self {
        Self {
            conduit: Conduit::Hvc,
            uid: ARM_SMCCC_VENDOR_HYP_UID_KVM,
            features: SmcccRes::default(),
            impl_version: NOT_SUPPORTED,
            impl_cpus: Vec::new(),
            ptp: NOT_SUPPORTED,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_conduit(mut self, conduit: Conduit) -> Self {
        self.conduit = conduit;
        self
    }

    pub fn with_uid(mut self, uid: SmcccRes) -> Self {
        self.uid = uid;
        self
    }

    pub fn with_features(self, words: [u32; 4]) -> Self {
        let [a0, a1, a2, a3] = words.map(u64::from);
        self.with_feature_registers(SmcccRes::new(a0, a1, a2, a3))
    }

    pub fn with_feature_registers(mut self, features: SmcccRes) -> Self {
        self.features = features;
        self
    }

    /// Describes `cpus` through the version 1.0 discovery interface.
    pub fn with_impl_cpus(mut self, cpus: &[TargetImplCpu]) -> Self {
        self.impl_version = SmcccRes::new(0, 0x1_0000, cpus.len() as u64, 0);
        self.impl_cpus = cpus
            .iter()
            .map(|cpu| SmcccRes::new(0, cpu.midr, cpu.revidr, cpu.aidr))
            .collect();
        self
    }

    pub fn with_impl_version(mut self, res: SmcccRes) -> Self {
        self.impl_version = res;
        self
    }

    pub fn with_failing_impl_cpu(mut self, index: usize) -> Self {
        self.impl_cpus[index] = NOT_SUPPORTED;
        self
    }

    pub fn with_ptp(mut self, res: SmcccRes) -> Self {
        self.ptp = res;
        self
    }

    pub fn calls(&self) -> Vec<FunctionId> {
        self.calls.borrow().iter().map(|(func, _)| *func).collect()
    }

    /// Every call paired with its first argument.
    pub fn calls_with_args(&self) -> Vec<(FunctionId, u64)> {
        self.calls
            .borrow()
            .iter()
            .map(|(func, args)| (*func, args[0]))
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Default for MockKvm {
    fn default() -> Self {
        Self::new()
    }
}

impl SmcccPlatform for MockKvm {
    fn conduit(&self) -> Conduit {
        self.conduit
    }

    fn invoke(&self, func: FunctionId, args: &[u64]) -> SmcccRes {
        assert!(args.len() <= smccc::SMCCC_MAX_ARGS);
        let mut regs = [0u64; smccc::SMCCC_MAX_ARGS];
        regs[..args.len()].copy_from_slice(args);
        self.calls.borrow_mut().push((func, regs));

        if func == ARM_SMCCC_VENDOR_HYP_CALL_UID_FUNC_ID {
            self.uid
        } else if func == ARM_SMCCC_VENDOR_HYP_KVM_FEATURES_FUNC_ID {
            self.features
        } else if func == ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_VER_FUNC_ID {
            self.impl_version
        } else if func == ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_CPUS_FUNC_ID {
            usize::try_from(regs[0])
                .ok()
                .and_then(|index| self.impl_cpus.get(index).copied())
                .unwrap_or(NOT_SUPPORTED)
        } else if func == ARM_SMCCC_VENDOR_HYP_KVM_PTP_FUNC_ID {
            self.ptp
        } else {
            NOT_SUPPORTED
        }
    }
}
