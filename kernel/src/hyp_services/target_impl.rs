// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use super::flags::KvmHypServiceFlags;
use crate::config::KvmGuestConfig;
use crate::error::KvmGuestError;
use crate::platform::SmcccPlatform;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem::size_of;
use cpuarch::midr::{Midr, MidrRange, is_midr_in_range_list};
use smccc::SmcccVersion;
use smccc::kvm::{
    ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_CPUS, ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_VER,
    ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_CPUS_FUNC_ID,
    ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_VER_FUNC_ID, KVM_DISCOVER_IMPL_VER_MAJOR,
};

/// Identification registers of one CPU implementation the guest may run on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetImplCpu {
    pub midr: u64,
    pub revidr: u64,
    pub aidr: u64,
}

impl TargetImplCpu {
    pub fn midr_el1(&self) -> Midr {
        Midr::from(self.midr)
    }
}

/// The complete, ordered set of target implementation CPUs reported by the
/// hypervisor.  Only ever constructed from a fully successful enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetImplCpus {
    cpus: Box<[TargetImplCpu]>,
}

impl TargetImplCpus {
    pub fn as_slice(&self) -> &[TargetImplCpu] {
        &self.cpus
    }

    pub fn len(&self) -> usize {
        self.cpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpus.is_empty()
    }

    /// Returns whether any target implementation falls within `ranges`.
    pub fn is_midr_in_range_list(&self, ranges: &[MidrRange]) -> bool {
        self.cpus
            .iter()
            .any(|cpu| is_midr_in_range_list(cpu.midr_el1(), ranges))
    }
}

/// Exclusively owns the table while it is being filled in.  Dropping the
/// builder discards every descriptor recorded so far.
#[derive(Debug)]
struct TargetImplCpusBuilder {
    cpus: Vec<TargetImplCpu>,
    count: usize,
}

impl TargetImplCpusBuilder {
    /// Validates the hypervisor-supplied `count` and reserves room for it.
    fn with_count(count: u64, config: &KvmGuestConfig) -> Result<Self, KvmGuestError> {
        let out_of_bounds = KvmGuestError::CpuCountOutOfBounds(count);
        let count = usize::try_from(count)
            .ok()
            .filter(|count| *count <= config.max_target_impl_cpus)
            .ok_or(out_of_bounds)?;
        count
            .checked_mul(size_of::<TargetImplCpu>())
            .filter(|size| *size <= isize::MAX as usize)
            .ok_or(out_of_bounds)?;

        let mut cpus = Vec::new();
        cpus.try_reserve_exact(count)
            .map_err(|_| KvmGuestError::AllocationFailure)?;
        Ok(Self { cpus, count })
    }

    fn count(&self) -> usize {
        self.count
    }

    fn push(&mut self, cpu: TargetImplCpu) {
        debug_assert!(self.cpus.len() < self.count);
        self.cpus.push(cpu);
    }

    fn finish(self) -> TargetImplCpus {
        debug_assert_eq!(self.cpus.len(), self.count);
        TargetImplCpus {
            cpus: self.cpus.into_boxed_slice(),
        }
    }
}

/// Runs the target implementation CPU discovery protocol:
///
/// 1. Both discovery functions must be advertised in `services`.
/// 2. The version query must succeed with major version 1 and a non-zero
///    CPU count.
/// 3. Every index below the count must be enumerated successfully.
///
/// Any failure discards the partially built table.
pub fn discover(
    services: KvmHypServiceFlags,
    platform: &dyn SmcccPlatform,
    config: &KvmGuestConfig,
) -> Result<TargetImplCpus, KvmGuestError> {
    for func in [
        ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_VER,
        ARM_SMCCC_KVM_FUNC_DISCOVER_IMPL_CPUS,
    ] {
        if !services.has(func) {
            return Err(KvmGuestError::ServiceUnavailable(func));
        }
    }

    let res = platform
        .invoke(ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_VER_FUNC_ID, &[0])
        .into_result()?;

    // The version lives in the low 32 bits in SMCCC version format.
    let version = SmcccVersion::from(res.a1 as u32);
    if version.major() != KVM_DISCOVER_IMPL_VER_MAJOR {
        return Err(KvmGuestError::UnsupportedVersion(version));
    }

    if res.a2 == 0 {
        return Err(KvmGuestError::ZeroCpuCount);
    }

    let mut builder = TargetImplCpusBuilder::with_count(res.a2, config)?;
    for index in 0..builder.count() {
        let res = platform
            .invoke(
                ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_CPUS_FUNC_ID,
                &[index as u64],
            )
            .into_result()
            .map_err(|error| KvmGuestError::EnumerationFailed { index, error })?;
        builder.push(TargetImplCpu {
            midr: res.a1,
            revidr: res.a2,
            aidr: res.a3,
        });
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockKvm, SMCCC_NOT_SUPPORTED};
    use smccc::{SmcccError, SmcccRes};

    fn discovery_flags() -> KvmHypServiceFlags {
        KvmHypServiceFlags::DISCOVER_IMPL_VER | KvmHypServiceFlags::DISCOVER_IMPL_CPUS
    }

    const CPUS: [TargetImplCpu; 3] = [
        TargetImplCpu {
            midr: 0x410f_d0c1,
            revidr: 0x1,
            aidr: 0x10,
        },
        TargetImplCpu {
            midr: 0x413f_d0c1,
            revidr: 0x2,
            aidr: 0x20,
        },
        TargetImplCpu {
            midr: 0x410f_d401,
            revidr: 0x3,
            aidr: 0x30,
        },
    ];

    #[test]
    fn test_discover_requires_both_functions() {
        let config = KvmGuestConfig::DEFAULT;
        let kvm = MockKvm::new().with_impl_cpus(&CPUS);

        for flags in [
            KvmHypServiceFlags::empty(),
            KvmHypServiceFlags::DISCOVER_IMPL_VER,
            KvmHypServiceFlags::DISCOVER_IMPL_CPUS,
        ] {
            assert!(matches!(
                discover(flags, &kvm, &config),
                Err(KvmGuestError::ServiceUnavailable(_))
            ));
        }
        assert_eq!(kvm.call_count(), 0);
    }

    #[test]
    fn test_discover_success() {
        let kvm = MockKvm::new().with_impl_cpus(&CPUS[..2]);
        let cpus = discover(discovery_flags(), &kvm, &KvmGuestConfig::DEFAULT).unwrap();
        assert_eq!(cpus.as_slice(), &CPUS[..2]);
        assert_eq!(
            kvm.calls_with_args(),
            [
                (ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_VER_FUNC_ID, 0),
                (ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_CPUS_FUNC_ID, 0),
                (ARM_SMCCC_VENDOR_HYP_KVM_DISCOVER_IMPL_CPUS_FUNC_ID, 1),
            ]
        );
    }

    #[test]
    fn test_discover_version_call_fails() {
        let kvm = MockKvm::new()
            .with_impl_cpus(&CPUS)
            .with_impl_version(SmcccRes::new(SMCCC_NOT_SUPPORTED, 0x1_0000, 3, 0));
        assert_eq!(
            discover(discovery_flags(), &kvm, &KvmGuestConfig::DEFAULT),
            Err(KvmGuestError::Smccc(SmcccError::NotSupported))
        );
        assert_eq!(kvm.call_count(), 1);
    }

    #[test]
    fn test_discover_unsupported_major() {
        for version in [0x0000_0001u64, 0x0002_0000, 0xffff_0000] {
            let kvm = MockKvm::new()
                .with_impl_cpus(&CPUS)
                .with_impl_version(SmcccRes::new(0, version, 3, 0));
            assert_eq!(
                discover(discovery_flags(), &kvm, &KvmGuestConfig::DEFAULT),
                Err(KvmGuestError::UnsupportedVersion(SmcccVersion::from(
                    version as u32
                )))
            );
            assert_eq!(kvm.call_count(), 1);
        }
    }

    #[test]
    fn test_discover_minor_and_upper_bits_ignored() {
        // Minor revisions are compatible, and only the low 32 bits of the
        // version register carry the version.
        let kvm = MockKvm::new()
            .with_impl_cpus(&CPUS)
            .with_impl_version(SmcccRes::new(0, 0xffff_ffff_0001_0007, 3, 0));
        let cpus = discover(discovery_flags(), &kvm, &KvmGuestConfig::DEFAULT).unwrap();
        assert_eq!(cpus.len(), 3);
    }

    #[test]
    fn test_discover_zero_count() {
        let kvm = MockKvm::new().with_impl_cpus(&[]);
        assert_eq!(
            discover(discovery_flags(), &kvm, &KvmGuestConfig::DEFAULT),
            Err(KvmGuestError::ZeroCpuCount)
        );
        assert_eq!(kvm.call_count(), 1);
    }

    #[test]
    fn test_discover_count_out_of_bounds() {
        let config = KvmGuestConfig::DEFAULT.with_max_target_impl_cpus(2);
        let kvm = MockKvm::new().with_impl_cpus(&CPUS);
        assert_eq!(
            discover(discovery_flags(), &kvm, &config),
            Err(KvmGuestError::CpuCountOutOfBounds(3))
        );
        assert_eq!(kvm.call_count(), 1);

        let config = KvmGuestConfig::DEFAULT.with_max_target_impl_cpus(usize::MAX);
        let kvm = MockKvm::new().with_impl_version(SmcccRes::new(0, 0x1_0000, u64::MAX, 0));
        assert_eq!(
            discover(discovery_flags(), &kvm, &config),
            Err(KvmGuestError::CpuCountOutOfBounds(u64::MAX))
        );
        assert_eq!(kvm.call_count(), 1);
    }

    #[test]
    fn test_discover_enumeration_failure() {
        let kvm = MockKvm::new().with_impl_cpus(&CPUS).with_failing_impl_cpu(1);
        assert_eq!(
            discover(discovery_flags(), &kvm, &KvmGuestConfig::DEFAULT),
            Err(KvmGuestError::EnumerationFailed {
                index: 1,
                error: SmcccError::NotSupported
            })
        );
        // Enumeration stops at the first failure.
        assert_eq!(kvm.call_count(), 3);
    }

    #[test]
    fn test_midr_range_list() {
        use cpuarch::midr::{ARM_CPU_IMP_ARM, ARM_CPU_PART_CORTEX_A72, ARM_CPU_PART_NEOVERSE_N1};

        let kvm = MockKvm::new().with_impl_cpus(&CPUS[..2]);
        let cpus = discover(discovery_flags(), &kvm, &KvmGuestConfig::DEFAULT).unwrap();

        let n1 = Midr::cpu_model(ARM_CPU_IMP_ARM, ARM_CPU_PART_NEOVERSE_N1);
        let a72 = Midr::cpu_model(ARM_CPU_IMP_ARM, ARM_CPU_PART_CORTEX_A72);
        // Only the second implementation is an r3 part.
        assert!(cpus.is_midr_in_range_list(&[MidrRange::revisions(n1, 3, 0, 1)]));
        assert!(!cpus.is_midr_in_range_list(&[MidrRange::revisions(n1, 2, 0, 0xf)]));
        assert!(!cpus.is_midr_in_range_list(&[MidrRange::all_versions(a72)]));
    }
}
