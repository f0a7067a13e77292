// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

//! Architectural register layouts shared between the guest discovery code
//! and its consumers.

#![no_std]

pub mod midr;
