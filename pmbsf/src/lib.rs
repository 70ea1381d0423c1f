// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! PMBsf: a PMBus slave-frame protocol engine.
//!
//! PMBsf drives the slave side of a PMBus (SMBus/I2C) transaction on a
//! microcontroller. It is a cooperative, event-driven state machine:
//! the interrupt layer reports line conditions (start, stop, read
//! turn-around, timeout) through small notifier calls, and the
//! platform's main loop ticks the engine forward one bounded step at a
//! time. The engine accumulates the master's bytes, has the platform
//! validate the frame (optionally including the PEC), dispatches the
//! command to the platform's executors, and feeds answer bytes back to
//! the line on a read turn-around. It does not allocate and it does not
//! touch hardware; everything device-specific sits behind the
//! [`SlaveController`] trait.
//!
//! ```rust
//! use pmbsf::exceptions::ExceptionSet;
//! use pmbsf::{FrameBuffer, FrameHandler, SlaveController};
//!
//! struct Port;
//!
//! impl SlaveController for Port {
//!     fn get_byte(&self) -> Option<u8> {
//!         None
//!     }
//!     fn check_frame(&self, _frame: &[u8]) -> bool {
//!         true
//!     }
//!     fn check_pec(&self, _frame: &[u8]) -> bool {
//!         true
//!     }
//!     fn execute_special(&self, _frame: &[u8]) {}
//!     fn put_byte(&self, _byte: u8) -> bool {
//!         true
//!     }
//!     fn execute_command(&self, _frame: &[u8]) -> bool {
//!         true
//!     }
//!     fn review_error(&self, _exceptions: ExceptionSet) -> bool {
//!         true
//!     }
//! }
//!
//! let mut rx_storage = [0u8; 34];
//! let mut tx_storage = [0u8; 34];
//! let rx_buffer = FrameBuffer::new(&mut rx_storage);
//! let tx_buffer = FrameBuffer::new(&mut tx_storage);
//! let port = Port;
//! let handler = FrameHandler::new(&port, &rx_buffer, &tx_buffer, false);
//!
//! // The interrupt layer raises events as it sees line conditions...
//! handler.notify_frame_start();
//! // ...and the main loop ticks the engine.
//! handler.step();
//! ```
//!
//! The event and exception registers are single atomic words, so every
//! notifier is safe to call from interrupt context while a step is in
//! flight. The step itself must only ever run from one place: the
//! engine is cooperative, not concurrent.

#![forbid(unsafe_code)]
#![no_std]

pub mod buffer;
pub mod events;
pub mod exceptions;
pub mod handler;
pub mod slave_controller;


pub use crate::buffer::FrameBuffer;
pub use crate::handler::{FrameHandler, State};
pub use crate::slave_controller::SlaveController;
