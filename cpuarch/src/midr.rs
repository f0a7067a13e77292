// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use bitfield_struct::bitfield;

pub const ARM_CPU_IMP_ARM: u8 = 0x41;
pub const ARM_CPU_IMP_APM: u8 = 0x50;
pub const ARM_CPU_IMP_AMPERE: u8 = 0xC0;

pub const ARM_CPU_ARCH_ARMV8: u8 = 0xF;

pub const ARM_CPU_PART_CORTEX_A53: u16 = 0xD03;
pub const ARM_CPU_PART_CORTEX_A57: u16 = 0xD07;
pub const ARM_CPU_PART_CORTEX_A72: u16 = 0xD08;
pub const ARM_CPU_PART_NEOVERSE_N1: u16 = 0xD0C;
pub const ARM_CPU_PART_NEOVERSE_V1: u16 = 0xD40;

const MIDR_REVISION_MASK: u64 = 0xf;
const MIDR_VARIANT_SHIFT: u32 = 20;
const MIDR_VARIANT_MASK: u64 = 0xf << MIDR_VARIANT_SHIFT;
const MIDR_CPU_MODEL_MASK: u64 = 0xff0f_fff0;

/// Layout of the `MIDR_EL1` main ID register.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Midr {
    #[bits(4)]
    pub revision: u8,
    #[bits(12)]
    pub partnum: u16,
    #[bits(4)]
    pub architecture: u8,
    #[bits(4)]
    pub variant: u8,
    pub implementer: u8,
    rsvd_63_32: u32,
}

impl Midr {
    /// Builds the model portion of a MIDR (implementer, architecture and
    /// part number) with zero variant and revision.
    pub const fn cpu_model(implementer: u8, partnum: u16) -> Self {
        Self::new()
            .with_implementer(implementer)
            .with_architecture(ARM_CPU_ARCH_ARMV8)
            .with_partnum(partnum)
    }

    pub const fn model(&self) -> u64 {
        self.into_bits() & MIDR_CPU_MODEL_MASK
    }

    /// Variant and revision packed in their register positions, suitable for
    /// ordered comparison.
    pub const fn variant_revision(&self) -> u64 {
        self.into_bits() & (MIDR_VARIANT_MASK | MIDR_REVISION_MASK)
    }
}

/// An inclusive range of variant/revision pairs of one CPU model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidrRange {
    model: u64,
    rv_min: u64,
    rv_max: u64,
}

const fn pack_variant_revision(variant: u8, revision: u8) -> u64 {
    (((variant as u64) << MIDR_VARIANT_SHIFT) & MIDR_VARIANT_MASK)
        | ((revision as u64) & MIDR_REVISION_MASK)
}

impl MidrRange {
    pub const fn new(
        model: Midr,
        variant_min: u8,
        revision_min: u8,
        variant_max: u8,
        revision_max: u8,
    ) -> Self {
        Self {
            model: model.model(),
            rv_min: pack_variant_revision(variant_min, revision_min),
            rv_max: pack_variant_revision(variant_max, revision_max),
        }
    }

    /// Matches every variant and revision of `model`.
    pub const fn all_versions(model: Midr) -> Self {
        Self::new(model, 0, 0, 0xf, 0xf)
    }

    /// Matches revisions `revision_min..=revision_max` of one variant.
    pub const fn revisions(model: Midr, variant: u8, revision_min: u8, revision_max: u8) -> Self {
        Self::new(model, variant, revision_min, variant, revision_max)
    }

    pub fn contains(&self, midr: Midr) -> bool {
        let rv = midr.variant_revision();
        midr.model() == self.model && rv >= self.rv_min && rv <= self.rv_max
    }
}

pub fn is_midr_in_range_list(midr: Midr, ranges: &[MidrRange]) -> bool {
    ranges.iter().any(|range| range.contains(midr))
}
