// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

pub mod immut_after_init;

pub use immut_after_init::{ImmutAfterInitCell, ImmutAfterInitError, ImmutAfterInitResult};
