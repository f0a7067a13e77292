// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use super::flags::KvmHypServiceFlags;
use crate::error::KvmGuestError;
use crate::platform::{Conduit, SmcccPlatform};
use smccc::SMCCC_MAX_ARGS;
use smccc::kvm::{
    ARM_SMCCC_VENDOR_HYP_CALL_UID_FUNC_ID, ARM_SMCCC_VENDOR_HYP_KVM_FEATURES_FUNC_ID,
    ARM_SMCCC_VENDOR_HYP_UID_KVM,
};

/// Confirms that the vendor hypervisor is KVM and reads its feature bitmap.
///
/// The UID and feature queries carry data in every result register, so
/// neither is checked against the SMCCC status convention.  The feature query
/// is only issued once the UID matched exactly.
pub fn probe(platform: &dyn SmcccPlatform) -> Result<KvmHypServiceFlags, KvmGuestError> {
    if platform.conduit() != Conduit::Hvc {
        return Err(KvmGuestError::ConduitAbsent);
    }

    let res = platform.invoke(ARM_SMCCC_VENDOR_HYP_CALL_UID_FUNC_ID, &[]);
    if res != ARM_SMCCC_VENDOR_HYP_UID_KVM {
        log::debug!("Vendor hypervisor UID {} is not KVM", res.uid());
        return Err(KvmGuestError::IdentityMismatch);
    }

    let res = platform.invoke(
        ARM_SMCCC_VENDOR_HYP_KVM_FEATURES_FUNC_ID,
        &[0; SMCCC_MAX_ARGS],
    );
    let words = res.lower_32_bits();

    log::info!(
        "hypervisor services detected (0x{:08x} 0x{:08x} 0x{:08x} 0x{:08x})",
        words[3],
        words[2],
        words[1],
        words[0]
    );

    Ok(KvmHypServiceFlags::from_feature_words(words))
}
