// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Sticky event register: the mailbox from the interrupt side to the
//! state machine.
//!
//! The interrupt service layer raises events as it observes line
//! conditions; the state machine consumes them at its own tempo and
//! clears the whole register in one shot when a transaction finishes.
//! The register is a single atomic word, so raising an event from
//! interrupt context while a step reads the register is always safe
//! without masking interrupts.

use core::sync::atomic::{AtomicU16, Ordering};

use tock_registers::fields::FieldValue;
use tock_registers::{register_bitfields, LocalRegisterCopy};

register_bitfields![u16,
    pub EVENT [
        /// The bus timeout source fired.
        TIME_OUT OFFSET(0) NUMBITS(1) [],
        /// START condition addressed to this slave.
        FRAME_START OFFSET(1) NUMBITS(1) [],
        /// Repeated start with the read bit: the master wants to read.
        QUERY_SIGN OFFSET(2) NUMBITS(1) [],
        /// STOP condition.
        STOP_SIGN OFFSET(3) NUMBITS(1) [],
        /// The received command needs asynchronous handling.
        SPECIAL_CMD OFFSET(4) NUMBITS(1) [],
        /// Set by the state machine itself once the asynchronous
        /// executor has been started.
        SPECIAL_CMD_IN_WAITING OFFSET(5) NUMBITS(1) [],
        /// The asynchronous executor finished.
        SPECIAL_CMD_END OFFSET(6) NUMBITS(1) [],
        /// Software reset request.
        RESET OFFSET(7) NUMBITS(1) []
    ]
];

/// A point-in-time copy of the event word, queried by field.
pub type EventSet = LocalRegisterCopy<u16, EVENT::Register>;

/// Atomic word holding the sticky event flags.
pub struct EventRegister {
    word: AtomicU16,
}

impl EventRegister {
    pub const fn new() -> EventRegister {
        EventRegister {
            word: AtomicU16::new(0),
        }
    }

    /// Raise an event. Single-word atomic OR, callable from interrupt
    /// context.
    pub fn set(&self, event: FieldValue<u16, EVENT::Register>) {
        self.word.fetch_or(event.value, Ordering::Relaxed);
    }

    /// Snapshot the current flags.
    pub fn get(&self) -> EventSet {
        LocalRegisterCopy::new(self.word.load(Ordering::Relaxed))
    }

    /// Drop every pending event. Only the state machine's terminal
    /// cleanup path does this.
    pub fn clear_all(&self) {
        self.word.store(0, Ordering::Relaxed);
    }
}
