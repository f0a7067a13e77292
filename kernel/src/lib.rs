// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

//! Early-boot discovery of the KVM vendor hypervisor services available to
//! an Arm guest, including the CPU implementations the guest may run on.
//!
//! Boot code constructs one [`KvmHypServices`], calls
//! [`KvmHypServices::init_hyp_services`] once the SMCCC conduit is known, and
//! shares the object read-only with the rest of the system afterwards.

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod hyp_services;
pub mod platform;
#[cfg(test)]
pub mod testing;
pub mod utils;

pub use config::KvmGuestConfig;
pub use error::KvmGuestError;
pub use hyp_services::KvmHypServices;
pub use platform::{Conduit, SmcccPlatform};
