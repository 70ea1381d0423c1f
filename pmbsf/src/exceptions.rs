// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Sticky exception register.
//!
//! Exceptions accumulate by OR and are never cleared piecemeal: the
//! state machine surfaces them to the platform's error reviewer and
//! zeroes the whole register once the reviewer acknowledges. The bit
//! positions are stable and may be persisted or logged by the platform,
//! so they must not be renumbered. 0x08 is unassigned.

use core::sync::atomic::{AtomicU16, Ordering};

use tock_registers::fields::FieldValue;
use tock_registers::{register_bitfields, LocalRegisterCopy};

/// The empty exception word.
pub const NO_EXCEP: u16 = 0x00;

register_bitfields![u16,
    pub EXCEPTION [
        /// The bus timeout source fired. 0x01.
        TIME_OUT OFFSET(0) NUMBITS(1) [],
        /// The platform's frame validator rejected the received bytes. 0x02.
        FRAME_CHECK_FAIL OFFSET(1) NUMBITS(1) [],
        /// The transmit drain ended with bytes still pending. 0x04.
        SEND_NOT_COMPLETE OFFSET(2) NUMBITS(1) [],
        /// Unrecoverable internal fault. 0x10.
        HALT OFFSET(4) NUMBITS(1) [],
        /// A byte arrived while the receive buffer was at its limit. 0x20.
        BUFFER_FULL OFFSET(5) NUMBITS(1) [],
        /// Packet Error Code validation failed. 0x40.
        PEC_ERROR OFFSET(6) NUMBITS(1) []
    ]
];

/// A point-in-time copy of the exception word, queried by field.
pub type ExceptionSet = LocalRegisterCopy<u16, EXCEPTION::Register>;

/// Atomic word holding the sticky exception flags.
pub struct ExceptionRegister {
    word: AtomicU16,
}

impl ExceptionRegister {
    pub const fn new() -> ExceptionRegister {
        ExceptionRegister {
            word: AtomicU16::new(0),
        }
    }

    /// Latch an exception. Single-word atomic OR, callable from
    /// interrupt context.
    pub fn set(&self, exception: FieldValue<u16, EXCEPTION::Register>) {
        self.word.fetch_or(exception.value, Ordering::Relaxed);
    }

    /// True if any exception is latched.
    pub fn any(&self) -> bool {
        self.word.load(Ordering::Relaxed) != NO_EXCEP
    }

    /// Snapshot the current flags.
    pub fn get(&self) -> ExceptionSet {
        LocalRegisterCopy::new(self.word.load(Ordering::Relaxed))
    }

    /// Drop every latched exception. Only the state machine's terminal
    /// cleanup path does this.
    pub fn clear_all(&self) {
        self.word.store(NO_EXCEP, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::{ExceptionRegister, EXCEPTION};

    /// The bit positions are part of the platform's log format.
    #[test]
    fn wire_values_are_stable() {
        assert_eq!(EXCEPTION::TIME_OUT::SET.value, 0x01);
        assert_eq!(EXCEPTION::FRAME_CHECK_FAIL::SET.value, 0x02);
        assert_eq!(EXCEPTION::SEND_NOT_COMPLETE::SET.value, 0x04);
        assert_eq!(EXCEPTION::HALT::SET.value, 0x10);
        assert_eq!(EXCEPTION::BUFFER_FULL::SET.value, 0x20);
        assert_eq!(EXCEPTION::PEC_ERROR::SET.value, 0x40);
    }

    #[test]
    fn exceptions_accumulate() {
        let register = ExceptionRegister::new();
        assert!(!register.any());

        register.set(EXCEPTION::TIME_OUT::SET);
        register.set(EXCEPTION::PEC_ERROR::SET);
        assert!(register.any());
        assert_eq!(register.get().get(), 0x41);

        register.clear_all();
        assert!(!register.any());
        assert_eq!(register.get().get(), 0x00);
    }
}
