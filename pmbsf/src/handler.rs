// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! The slave-frame state machine.
//!
//! A [`FrameHandler`] consumes the events raised by the interrupt layer
//! and walks one transaction at a time through reception, checking,
//! execution and transmission. It is cooperative: the platform's main
//! loop calls [`FrameHandler::step`] on every tick, each call performs
//! the bounded work of the current state and at most one state
//! transition, and a step with nothing to do simply returns. The
//! handler never blocks and never allocates.
//!
//! Exceptions latched along the way are not handled internally. Every
//! path funnels into [`State::ErrorCheck`], where the platform's
//! reviewer decides when the handler may clear its registers and go
//! back to idle.

use core::cell::Cell;

use crate::buffer::FrameBuffer;
use crate::events::{EventRegister, EventSet, EVENT};
use crate::exceptions::{ExceptionRegister, ExceptionSet, EXCEPTION};
use crate::slave_controller::SlaveController;

/// The nine states of the frame handler.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    /// Awaiting a new transaction.
    Idle,
    /// Accumulating bytes into the receive buffer.
    Receive,
    /// Validating the PEC and the frame contents.
    FrameCheck,
    /// Frame is good; deciding what runs next.
    FrameCheckOk,
    /// An asynchronous special command is running.
    SpecialCmdInWaiting,
    /// Draining the transmit queue onto the line.
    WaitTrans,
    /// Running the normal command executor.
    ExecCmd,
    /// Holding the latched exceptions out for review.
    ErrorCheck,
    /// Trap state. Left only on an exclusive reset or stop.
    Halt,
}

/// Protocol engine for one slave device instance.
///
/// Construction binds the controller, one receive buffer and one
/// transmit buffer for the lifetime of the handler. All entry points
/// take `&self`; the notifier entry points additionally restrict
/// themselves to single-word atomic updates so the interrupt layer can
/// call them while a step is in flight.
pub struct FrameHandler<'a, C: SlaveController> {
    controller: &'a C,
    old_state: Cell<State>,
    now_state: Cell<State>,
    events: EventRegister,
    exceptions: ExceptionRegister,
    rx_buffer: &'a FrameBuffer<'a>,
    tx_buffer: &'a FrameBuffer<'a>,
    pec_enabled: Cell<bool>,
}

impl<'a, C: SlaveController> FrameHandler<'a, C> {
    pub fn new(
        controller: &'a C,
        rx_buffer: &'a FrameBuffer<'a>,
        tx_buffer: &'a FrameBuffer<'a>,
        use_pec: bool,
    ) -> FrameHandler<'a, C> {
        FrameHandler {
            controller,
            old_state: Cell::new(State::Idle),
            now_state: Cell::new(State::Idle),
            events: EventRegister::new(),
            exceptions: ExceptionRegister::new(),
            rx_buffer,
            tx_buffer,
            pec_enabled: Cell::new(use_pec),
        }
    }

    /// Run one tick of the state machine.
    ///
    /// Performs the work of the current state and at most one
    /// transition. Events raised before this call are visible to it;
    /// events raised while it runs are picked up no later than the next
    /// call.
    pub fn step(&self) {
        match self.now_state.get() {
            State::Idle => {
                let events = self.events.get();
                if events.is_set(EVENT::FRAME_START) {
                    // New write phase: the previous answer is stale.
                    self.tx_buffer.reset();
                    self.change_state(State::Receive);
                } else if events.is_set(EVENT::QUERY_SIGN) {
                    // Read without a preceding write phase. The
                    // transmit queue must have been primed earlier.
                    self.change_state(State::WaitTrans);
                }
            }
            State::Receive => {
                // Take the byte first so one arriving together with the
                // stop still lands in the frame.
                if let Some(byte) = self.controller.get_byte() {
                    if !self.rx_buffer.append(byte) {
                        self.exceptions.set(EXCEPTION::BUFFER_FULL::SET);
                    }
                }

                if self.exceptions.any() {
                    self.change_state(State::ErrorCheck);
                } else {
                    let events = self.events.get();
                    if events.is_set(EVENT::QUERY_SIGN) || events.is_set(EVENT::STOP_SIGN) {
                        self.change_state(State::FrameCheck);
                    }
                }
            }
            State::FrameCheck => {
                if self.pec_enabled.get() {
                    let pec_ok = self
                        .rx_buffer
                        .map_frame(|frame| self.controller.check_pec(frame))
                        .unwrap_or(false);
                    if !pec_ok {
                        self.exceptions.set(EXCEPTION::PEC_ERROR::SET);
                    }
                }
                if !self.exceptions.any() {
                    let frame_ok = self
                        .rx_buffer
                        .map_frame(|frame| self.controller.check_frame(frame))
                        .unwrap_or(false);
                    if !frame_ok {
                        self.exceptions.set(EXCEPTION::FRAME_CHECK_FAIL::SET);
                    }
                }

                if self.exceptions.any() {
                    // A bad frame is reported only after the master's
                    // stop. Until then the slave stays silent here; a
                    // master that never stops is broken out of only by
                    // the platform's timeout path.
                    if self.events.get().is_set(EVENT::STOP_SIGN) {
                        self.change_state(State::ErrorCheck);
                    }
                } else {
                    self.change_state(State::FrameCheckOk);
                }
            }
            State::FrameCheckOk => {
                if self.events.get().is_set(EVENT::SPECIAL_CMD) {
                    let _ = self
                        .rx_buffer
                        .map_frame(|frame| self.controller.execute_special(frame));
                    self.events.set(EVENT::SPECIAL_CMD_IN_WAITING::SET);
                }

                let events = self.events.get();
                if events.is_set(EVENT::SPECIAL_CMD_IN_WAITING) {
                    self.change_state(State::SpecialCmdInWaiting);
                } else if events.is_set(EVENT::QUERY_SIGN) {
                    self.change_state(State::WaitTrans);
                } else {
                    self.change_state(State::ExecCmd);
                }
            }
            State::SpecialCmdInWaiting => {
                // Exceptions win over completion so a single step never
                // transitions twice.
                if self.exceptions.any() {
                    self.change_state(State::ErrorCheck);
                } else {
                    let events = self.events.get();
                    if events.is_set(EVENT::SPECIAL_CMD_END) {
                        if events.is_set(EVENT::QUERY_SIGN) {
                            self.change_state(State::WaitTrans);
                        } else {
                            self.change_state(State::ExecCmd);
                        }
                    }
                }
            }
            State::ExecCmd => {
                // The executor's return value is reserved.
                let _ = self
                    .rx_buffer
                    .map_frame(|frame| self.controller.execute_command(frame));
                self.change_state(State::ErrorCheck);
            }
            State::WaitTrans => {
                // Push bytes until the queue empties or the line pushes
                // back.
                while self.tx_buffer.len() > 0 {
                    match self.tx_buffer.peek() {
                        Some(byte) => {
                            if !self.controller.put_byte(byte) {
                                break;
                            }
                            self.tx_buffer.advance();
                        }
                        None => break,
                    }
                }

                if self.exceptions.any() || self.events.get().is_set(EVENT::STOP_SIGN) {
                    if self.tx_buffer.len() > 0 {
                        self.exceptions.set(EXCEPTION::SEND_NOT_COMPLETE::SET);
                    }
                    self.change_state(State::ErrorCheck);
                }
            }
            State::ErrorCheck => {
                if self.controller.review_error(self.exceptions.get()) {
                    self.exceptions.clear_all();
                    self.events.clear_all();
                    self.rx_buffer.reset();
                    self.change_state(State::Idle);
                }
            }
            State::Halt => {
                // Whole-word equality, not a bit test: leaving the trap
                // requires the reset (or stop) flag to be the only one
                // raised, which tells a clean reset apart from a reset
                // tangled up with leftover line events.
                let events = self.events.get().get();
                if events == EVENT::RESET::SET.value {
                    self.change_state(State::Idle);
                } else if events == EVENT::STOP_SIGN::SET.value {
                    self.change_state(State::ErrorCheck);
                }
            }
        }
    }

    /// A START condition addressed to this slave was observed.
    /// Single-word atomic update; callable from interrupt context.
    pub fn notify_frame_start(&self) {
        self.events.set(EVENT::FRAME_START::SET);
    }

    /// The received command was recognized as needing asynchronous
    /// handling. Single-word atomic update; callable from interrupt
    /// context.
    pub fn notify_special_cmd(&self) {
        self.events.set(EVENT::SPECIAL_CMD::SET);
    }

    /// A repeated start with the read bit was observed: the master now
    /// wants to read. Single-word atomic update; callable from
    /// interrupt context.
    pub fn notify_query(&self) {
        self.events.set(EVENT::QUERY_SIGN::SET);
    }

    /// The asynchronous special-command executor finished. Single-word
    /// atomic update; callable from interrupt context.
    pub fn notify_special_cmd_end(&self) {
        self.events.set(EVENT::SPECIAL_CMD_END::SET);
    }

    /// Request a software reset. Only honored from the trap state, and
    /// only when no other event is pending. Single-word atomic update;
    /// callable from interrupt context.
    pub fn notify_reset(&self) {
        self.events.set(EVENT::RESET::SET);
    }

    /// A STOP condition was observed. Ignored while idle, so stray
    /// stops between transactions cannot kick the handler out of its
    /// rest state. Otherwise a single-word atomic update; callable from
    /// interrupt context.
    pub fn notify_stop(&self) {
        if self.now_state.get() == State::Idle {
            return;
        }
        self.events.set(EVENT::STOP_SIGN::SET);
    }

    /// The external timeout source reports its verdict. `true` latches
    /// both the timeout event and the timeout exception; `false` is a
    /// no-op. Single-word atomic updates; callable from interrupt
    /// context.
    pub fn notify_timeout(&self, timed_out: bool) {
        if timed_out {
            self.events.set(EVENT::TIME_OUT::SET);
            self.exceptions.set(EXCEPTION::TIME_OUT::SET);
        }
    }

    /// Turn PEC validation on or off for subsequent frames.
    pub fn set_use_pec(&self, use_pec: bool) {
        self.pec_enabled.set(use_pec);
    }

    /// Queue one byte for the next read turn-around. Returns whether it
    /// fit. All bytes of an answer must be queued before the handler
    /// starts draining them.
    pub fn put_transmit_buffer(&self, byte: u8) -> bool {
        self.tx_buffer.enqueue(byte)
    }

    pub fn state(&self) -> State {
        self.now_state.get()
    }

    /// The state before the most recent transition.
    pub fn previous_state(&self) -> State {
        self.old_state.get()
    }

    /// Snapshot of the pending events.
    pub fn events(&self) -> EventSet {
        self.events.get()
    }

    /// Snapshot of the latched exceptions.
    pub fn exceptions(&self) -> ExceptionSet {
        self.exceptions.get()
    }

    fn change_state(&self, next: State) {
        self.old_state.set(self.now_state.get());
        self.now_state.set(next);
    }

    #[cfg(test)]
    pub(crate) fn force_state(&self, state: State) {
        self.now_state.set(state);
    }
}
