// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Interface to the platform the frame handler runs on.
//!
//! The handler drives everything device-specific through this trait:
//! the byte ports of the I2C/SMBus hardware on one side, and the
//! command table and error policy of the application on the other.
//! Each slave device instance supplies its own implementation.

use crate::exceptions::ExceptionSet;

pub trait SlaveController {
    /// Poll the hardware for the next received byte.
    ///
    /// Returns `Some` if a new byte was present. Called at most once per
    /// step while a frame is being received; the implementation must be
    /// safe to call when nothing has arrived.
    fn get_byte(&self) -> Option<u8>;

    /// Whether the accumulated bytes form a recognized, well-formed
    /// command. Must be pure with respect to its argument.
    fn check_frame(&self, frame: &[u8]) -> bool;

    /// Whether the frame's Packet Error Code is valid. The last byte of
    /// `frame` is the PEC. Only called when PEC use is enabled.
    fn check_pec(&self, frame: &[u8]) -> bool;

    /// Begin asynchronous handling of a special command. Must not
    /// block; the platform signals completion later through
    /// `notify_special_cmd_end` on the handler.
    fn execute_special(&self, frame: &[u8]);

    /// Offer one byte to the line. Returns `false` if the hardware
    /// cannot take it yet; the handler will retry on a later step.
    fn put_byte(&self, byte: u8) -> bool;

    /// Execute a checked command frame. The return value is reserved
    /// and currently ignored.
    fn execute_command(&self, frame: &[u8]) -> bool;

    /// Review the latched exceptions at the end of a transaction.
    ///
    /// Called once per step while the handler sits in its error-check
    /// state, including after clean transactions (with an empty set).
    /// Return `true` once the exceptions have been consumed; the
    /// handler then clears its registers and returns to idle. Returning
    /// `false` holds the handler in place for another look next step.
    fn review_error(&self, exceptions: ExceptionSet) -> bool;
}
