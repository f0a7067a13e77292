// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

//! This crate provides structures and routines defined by the Arm SMC Calling
//! Convention (SMCCC) binary interface, together with the KVM vendor
//! hypervisor service definitions layered on top of it.

#![no_std]

pub mod kvm;

use bitfield_struct::bitfield;
use core::fmt;
use uuid::Uuid;
use zerocopy::byteorder::little_endian::U32;

pub const SMCCC_RET_SUCCESS: i64 = 0;
pub const SMCCC_RET_NOT_SUPPORTED: i64 = -1;
pub const SMCCC_RET_NOT_REQUIRED: i64 = -2;
pub const SMCCC_RET_INVALID_PARAMETER: i64 = -3;

/// Maximum number of argument registers passed to an SMCCC v1.1 call by this
/// crate's users.
pub const SMCCC_MAX_ARGS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallConv {
    Smc32 = 0,
    Smc64 = 1,
}

/// Service owners, encoded in bits [29:24] of a function identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Arch = 0,
    Cpu = 1,
    Sip = 2,
    Oem = 3,
    Standard = 4,
    StandardHyp = 5,
    VendorHyp = 6,
    TrustedApp = 48,
    TrustedOs = 50,
}

#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct FunctionId {
    pub number: u16,
    rsvd_23_16: u8,
    #[bits(6)]
    pub owner: u8,
    pub smc64: bool,
    pub fast_call: bool,
}

impl FunctionId {
    /// Encodes a fast-call function identifier.
    pub const fn fast(conv: CallConv, owner: Owner, number: u16) -> Self {
        let bits = (1u32 << 31) | ((conv as u32) << 30) | (((owner as u32) & 0x3f) << 24);
        Self::from_bits(bits | number as u32)
    }
}

/// Decoded SMCCC return codes other than `SMCCC_RET_SUCCESS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmcccError {
    NotSupported,
    NotRequired,
    InvalidParameter,
    Unknown(u64),
}

impl SmcccError {
    fn from_status(status: u64) -> Self {
        match status as i64 {
            SMCCC_RET_NOT_SUPPORTED => Self::NotSupported,
            SMCCC_RET_NOT_REQUIRED => Self::NotRequired,
            SMCCC_RET_INVALID_PARAMETER => Self::InvalidParameter,
            _ => Self::Unknown(status),
        }
    }
}

impl fmt::Display for SmcccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "function not supported"),
            Self::NotRequired => write!(f, "call not required"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::Unknown(status) => write!(f, "unknown status {:#x}", status),
        }
    }
}

/// The four result registers of an SMCCC v1.1 call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SmcccRes {
    pub a0: u64,
    pub a1: u64,
    pub a2: u64,
    pub a3: u64,
}

impl SmcccRes {
    pub const fn new(a0: u64, a1: u64, a2: u64, a3: u64) -> Self {
        Self { a0, a1, a2, a3 }
    }

    /// Interprets `a0` as a status word.  Only meaningful for functions that
    /// follow the status convention; UID and feature queries return raw data
    /// in every register.
    pub fn into_result(self) -> Result<Self, SmcccError> {
        if self.a0 as i64 == SMCCC_RET_SUCCESS {
            Ok(self)
        } else {
            Err(SmcccError::from_status(self.a0))
        }
    }

    pub const fn lower_32_bits(&self) -> [u32; 4] {
        [
            self.a0 as u32,
            self.a1 as u32,
            self.a2 as u32,
            self.a3 as u32,
        ]
    }

    /// Renders a UID query response as a UUID.  Each register carries four
    /// bytes of the UUID in little-endian order.
    pub fn uid(&self) -> Uuid {
        let words = self.lower_32_bits().map(U32::new);
        let bytes: [u8; 16] = zerocopy::transmute!(words);
        Uuid::from_bytes(bytes)
    }
}

/// Version numbers in the SMCCC/PSCI `major[31:16].minor[15:0]` format.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct SmcccVersion {
    pub minor: u16,
    pub major: u16,
}

impl fmt::Display for SmcccVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major(), self.minor())
    }
}
