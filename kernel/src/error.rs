// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use core::error::Error;
use core::fmt;
use smccc::{SmcccError, SmcccVersion};

/// Reasons a discovery stage downgrades to "no services".  None of these is
/// fatal; callers log them and carry on with the empty state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KvmGuestError {
    /// The firmware does not provide an HVC conduit.
    ConduitAbsent,
    /// The vendor hypervisor UID is not KVM's.
    IdentityMismatch,
    /// A function required by the stage is not advertised in the feature
    /// bitmap.
    ServiceUnavailable(u32),
    /// A status-returning call reported an error.
    Smccc(SmcccError),
    UnsupportedVersion(SmcccVersion),
    ZeroCpuCount,
    CpuCountOutOfBounds(u64),
    AllocationFailure,
    EnumerationFailed { index: usize, error: SmcccError },
    /// The publication slot has already been written.
    AlreadyInitialized,
}

impl From<SmcccError> for KvmGuestError {
    fn from(err: SmcccError) -> Self {
        Self::Smccc(err)
    }
}

impl Error for KvmGuestError {}

impl fmt::Display for KvmGuestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConduitAbsent => write!(f, "no HVC conduit"),
            Self::IdentityMismatch => write!(f, "vendor hypervisor is not KVM"),
            Self::ServiceUnavailable(func) => {
                write!(f, "KVM function {} not available", func)
            }
            Self::Smccc(err) => write!(f, "SMCCC call failed: {}", err),
            Self::UnsupportedVersion(ver) => {
                write!(f, "Unsupported target CPU implementation version {}", ver)
            }
            Self::ZeroCpuCount => write!(f, "No target implementation CPUs specified"),
            Self::CpuCountOutOfBounds(count) => {
                write!(f, "Target implementation CPU count {} out of bounds", count)
            }
            Self::AllocationFailure => {
                write!(f, "Not enough memory for target implementation CPUs")
            }
            Self::EnumerationFailed { index, error } => write!(
                f,
                "Discovering target implementation CPUs failed at index {}: {}",
                index, error
            ),
            Self::AlreadyInitialized => write!(f, "already initialized"),
        }
    }
}
