//! Continuous transmission state machine
//!
//! A session is either idle or transmitting. While transmitting, every
//! TX-done re-arms the radio with the same payload until the user asks to
//! stop; the completion following a stop reports how many packets went out.

use core::fmt::{self, Write};

use crate::config::{TX_PAYLOAD, TX_TIMEOUT};
use crate::radio::Radio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    #[default]
    Idle,
    Transmitting,
}

/// Failure while arming a transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    BufferWrite,
    StartTx,
}

impl TxError {
    pub fn message(&self) -> &'static str {
        match self {
            TxError::BufferWrite => "Failed to write TX packet to buffer",
            TxError::StartTx => "Failed to start TX",
        }
    }
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Transmission session: state flag and number of completed packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxSession {
    state: TxState,
    message_count: u32,
}

impl TxSession {
    pub const fn new() -> Self {
        Self {
            state: TxState::Idle,
            message_count: 0,
        }
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn is_transmitting(&self) -> bool {
        self.state == TxState::Transmitting
    }

    /// Packets completed since the session started
    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    /// Toggle the session: start when idle, stop when transmitting
    pub async fn toggle<R: Radio>(&mut self, radio: &mut R, out: &mut dyn Write) {
        if self.is_transmitting() {
            self.stop(out);
        } else {
            let _ = writeln!(out, "Starting TX\r");
            if let Err(e) = self.start(radio).await {
                let _ = writeln!(out, "{e}\r");
            }
        }
    }

    /// Arm the first transmission.
    /// The session only becomes active once the radio accepted the request,
    /// a failure leaves it idle with the counter untouched.
    pub async fn start<R: Radio>(&mut self, radio: &mut R) -> Result<(), TxError> {
        arm(radio).await?;
        info!("TX started");
        self.state = TxState::Transmitting;
        Ok(())
    }

    /// Request a stop: the transmission in flight still completes and is
    /// accounted for by `on_tx_done`.
    pub fn stop(&mut self, out: &mut dyn Write) {
        let _ = writeln!(out, "Stopping TX\r");
        self.state = TxState::Idle;
    }

    /// Handle a TX-done event
    pub async fn on_tx_done<R: Radio>(&mut self, radio: &mut R, out: &mut dyn Write) {
        self.message_count = self.message_count.wrapping_add(1);
        radio.post_transmit_teardown().await;
        if self.is_transmitting() {
            if let Err(e) = arm(radio).await {
                warn!("Re-arm failed after {} packets: {}", self.message_count, e);
                let _ = writeln!(out, "{e}\r");
                self.state = TxState::Idle;
                self.message_count = 0;
            }
        } else {
            let _ = writeln!(out, "Sent {} TX packets\r", self.message_count);
            info!("TX stopped after {} packets", self.message_count);
            self.message_count = 0;
        }
    }
}

/// Load the payload and kick a transmission
async fn arm<R: Radio>(radio: &mut R) -> Result<(), TxError> {
    radio.write_tx_buffer(TX_PAYLOAD).await.map_err(|e| {
        error!("TX buffer write: {}", e);
        TxError::BufferWrite
    })?;
    radio.pre_transmit_setup().await;
    radio.start_transmit(TX_TIMEOUT).await.map_err(|e| {
        error!("Set TX: {}", e);
        TxError::StartTx
    })
}
