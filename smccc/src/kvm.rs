// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

//! KVM vendor hypervisor service definitions.

use crate::{CallConv, FunctionId, Owner, SmcccRes};

pub const ARM_SMCCC_KVM_FUNC_FEATURES: u32 = 0;
pub const ARM_SMCCC_KVM_FUNC_PTP: u32 = 1;
// Start of the pKVM hypercall range.
pub const ARM_SMCCC_KVM_FUNC_HYP_MEMINFO: u32 = 2;
pub const ARM_SMCCC_KVM_FUNC_MEM_SHARE: u32 = 3;
pub const ARM_SMCCC_KVM_FUNC_MEM_UNSHARE: u32 = 4;
pub const ARM_SMCCC_KVM_FUNC_MMIO_GUARD: u32 = 7;
// End of the pKVM hypercall range.
pub const ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_VER: u32 = 64;
pub const ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_CPUS: u32 = 65;
pub const ARM_SMCCC_KVM_FUNC_FEATURES_2: u32 = 127;

/// Number of KVM function numbers covered by the feature bitmap.
pub const ARM_SMCCC_KVM_NUM_FUNCS: u32 = 128;

pub const ARM_SMCCC_VENDOR_HYP_CALL_UID_FUNC_ID: FunctionId =
    FunctionId::fast(CallConv::Smc32, Owner::VendorHyp, 0xff01);

pub const ARM_SMCCC_VENDOR_HYP_KVM_FEATURES_FUNC_ID: FunctionId = FunctionId::fast(
    CallConv::Smc32,
    Owner::VendorHyp,
    ARM_SMCCC_KVM_FUNC_FEATURES as u16,
);

pub const ARM_SMCCC_VENDOR_HYP_KVM_PTP_FUNC_ID: FunctionId = FunctionId::fast(
    CallConv::Smc32,
    Owner::VendorHyp,
    ARM_SMCCC_KVM_FUNC_PTP as u16,
);

pub const ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_VER_FUNC_ID: FunctionId = FunctionId::fast(
    CallConv::Smc64,
    Owner::VendorHyp,
    ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_VER as u16,
);

pub const ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_CPUS_FUNC_ID: FunctionId = FunctionId::fast(
    CallConv::Smc64,
    Owner::VendorHyp,
    ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_CPUS as u16,
);

pub const ARM_SMCCC_VENDOR_HYP_UID_KVM_REG_0: u64 = 0xb66f_b428;
pub const ARM_SMCCC_VENDOR_HYP_UID_KVM_REG_1: u64 = 0xe911_c52e;
pub const ARM_SMCCC_VENDOR_HYP_UID_KVM_REG_2: u64 = 0x564b_caa9;
pub const ARM_SMCCC_VENDOR_HYP_UID_KVM_REG_3: u64 = 0x743a_004d;

/// The UID query response identifying KVM
/// (28b46fb6-2ec5-11e9-a9ca-4b564d003a74).
pub const ARM_SMCCC_VENDOR_HYP_UID_KVM: SmcccRes = SmcccRes::new(
    ARM_SMCCC_VENDOR_HYP_UID_KVM_REG_0,
    ARM_SMCCC_VENDOR_HYP_UID_KVM_REG_1,
    ARM_SMCCC_VENDOR_HYP_UID_KVM_REG_2,
    ARM_SMCCC_VENDOR_HYP_UID_KVM_REG_3,
);

/// Only major version 1 of the target implementation CPU interface exists.
pub const KVM_DISCOVER_IMPL_VER_MAJOR: u16 = 1;

// PTP counter selectors.
pub const KVM_PTP_VIRT_COUNTER: u64 = 0;
pub const KVM_PTP_PHYS_COUNTER: u64 = 1;
