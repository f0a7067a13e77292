// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The kvmguest Authors

use core::cell::UnsafeCell;
use core::fmt;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU8, Ordering};

const IMMUT_UNINIT: u8 = 0;
const IMMUT_INITIALIZING: u8 = 1;
const IMMUT_INIT: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImmutAfterInitError {
    AlreadyInit,
    Uninitialized,
}

pub type ImmutAfterInitResult<T> = Result<T, ImmutAfterInitError>;

/// A container for data that is written exactly once during boot and read
/// without synchronization afterwards.
///
/// Initialization moves the cell from `UNINIT` through `INITIALIZING` to
/// `INIT` with an atomic compare-exchange, so only one writer can ever store
/// a value.  Readers observe either no value or the complete value, never a
/// partially written one.
pub struct ImmutAfterInitCell<T> {
    data: UnsafeCell<MaybeUninit<T>>,
    state: AtomicU8,
}

impl<T> ImmutAfterInitCell<T> {
    pub const fn uninit() -> Self {
        Self {
            data: UnsafeCell::new(MaybeUninit::uninit()),
            state: AtomicU8::new(IMMUT_UNINIT),
        }
    }

    /// Stores `v` if the cell has never been written.  On failure `v` is
    /// dropped and the existing contents are left untouched.
    pub fn init(&self, v: T) -> ImmutAfterInitResult<()> {
        self.state
            .compare_exchange(
                IMMUT_UNINIT,
                IMMUT_INITIALIZING,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .map_err(|_| ImmutAfterInitError::AlreadyInit)?;

        // SAFETY: the successful transition to IMMUT_INITIALIZING grants this
        // caller exclusive access to the data, and no reader dereferences it
        // before IMMUT_INIT is published below.
        unsafe {
            (*self.data.get()).write(v);
        }
        self.state.store(IMMUT_INIT, Ordering::Release);
        Ok(())
    }

    pub fn is_init(&self) -> bool {
        self.state.load(Ordering::Acquire) == IMMUT_INIT
    }

    pub fn try_get_inner(&self) -> ImmutAfterInitResult<&T> {
        if !self.is_init() {
            return Err(ImmutAfterInitError::Uninitialized);
        }
        // SAFETY: IMMUT_INIT is only stored after the value has been fully
        // written, and the value is never mutated afterwards.
        Ok(unsafe { (*self.data.get()).assume_init_ref() })
    }
}

impl<T> Drop for ImmutAfterInitCell<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == IMMUT_INIT {
            // SAFETY: the value was fully initialized and `&mut self`
            // guarantees that no outstanding references exist.
            unsafe {
                self.data.get_mut().assume_init_drop();
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ImmutAfterInitCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_get_inner() {
            Ok(v) => f.debug_tuple("ImmutAfterInitCell").field(v).finish(),
            Err(_) => f.write_str("ImmutAfterInitCell(<uninit>)"),
        }
    }
}

impl<T> Default for ImmutAfterInitCell<T> {
    fn default() -> Self {
        Self::uninit()
    }
}

// SAFETY: shared access only ever hands out `&T` after initialization, and
// initialization is serialized by the atomic state, so sharing the cell is
// sound whenever sharing and sending `T` is.
unsafe impl<T: Send + Sync> Sync for ImmutAfterInitCell<T> {}
// SAFETY: the cell owns its `T`.
unsafe impl<T: Send> Send for ImmutAfterInitCell<T> {}
