// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use bitflags::bitflags;
use core::fmt;
use core::fmt::Write;
use smccc::kvm::{
    ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_CPUS, ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_VER,
    ARM_SMCCC_KVM_FUNC_FEATURES, ARM_SMCCC_KVM_FUNC_FEATURES_2, ARM_SMCCC_KVM_FUNC_HYP_MEMINFO,
    ARM_SMCCC_KVM_FUNC_MEM_SHARE, ARM_SMCCC_KVM_FUNC_MEM_UNSHARE, ARM_SMCCC_KVM_FUNC_MMIO_GUARD,
    ARM_SMCCC_KVM_FUNC_PTP, ARM_SMCCC_KVM_NUM_FUNCS,
};

bitflags! {
    /// The KVM vendor hypervisor functions advertised by the feature query,
    /// one bit per function number.  Bits without a name are retained.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct KvmHypServiceFlags: u128 {
        const FEATURES           = 1 << ARM_SMCCC_KVM_FUNC_FEATURES;
        const PTP                = 1 << ARM_SMCCC_KVM_FUNC_PTP;
        const HYP_MEMINFO        = 1 << ARM_SMCCC_KVM_FUNC_HYP_MEMINFO;
        const MEM_SHARE          = 1 << ARM_SMCCC_KVM_FUNC_MEM_SHARE;
        const MEM_UNSHARE        = 1 << ARM_SMCCC_KVM_FUNC_MEM_UNSHARE;
        const MMIO_GUARD         = 1 << ARM_SMCCC_KVM_FUNC_MMIO_GUARD;
        const DISCOVER_IMPL_VER  = 1 << ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_VER;
        const DISCOVER_IMPL_CPUS = 1 << ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_CPUS;
        const FEATURES_2         = 1 << ARM_SMCCC_KVM_FUNC_FEATURES_2;
    }
}

impl KvmHypServiceFlags {
    /// Builds the set from the low 32 bits of each feature query register;
    /// register `i` supplies function numbers `32 * i .. 32 * i + 32`.
    pub fn from_feature_words(words: [u32; 4]) -> Self {
        let bits = words
            .iter()
            .rev()
            .fold(0u128, |bits, word| (bits << 32) | u128::from(*word));
        Self::from_bits_retain(bits)
    }

    pub fn feature_words(&self) -> [u32; 4] {
        let bits = self.bits();
        [
            bits as u32,
            (bits >> 32) as u32,
            (bits >> 64) as u32,
            (bits >> 96) as u32,
        ]
    }

    /// Returns whether KVM function `func_id` is available.  Function numbers
    /// beyond the bitmap are never available.
    pub fn has(&self, func_id: u32) -> bool {
        func_id < ARM_SMCCC_KVM_NUM_FUNCS && self.bits() & (1u128 << func_id) != 0
    }
}

impl fmt::Display for KvmHypServiceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        for (name, _) in self.iter_names() {
            if !first {
                f.write_char(' ')?;
            }
            f.write_str(name)?;
            first = false;
        }

        let unnamed = self.bits() & !Self::all().bits();
        if unnamed != 0 {
            if !first {
                f.write_char(' ')?;
            }
            write!(f, "{:#x}", unnamed)?;
        }

        Ok(())
    }
}
