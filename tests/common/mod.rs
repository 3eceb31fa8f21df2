//! Shared test helpers: recording radio and console driver
#![allow(dead_code)]

use embassy_futures::block_on;
use lr2021_tx_tool::radio::{IrqSet, Radio};
use lr2021_tx_tool::tool::TxTool;

/// Operation issued to the radio
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ApplyFrequency(u32),
    WriteTxBuffer(Vec<u8>),
    StartTransmit(u32),
    PreTransmit,
    PostTransmit,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Radio recording every call, with injectable failures
#[derive(Debug, Default)]
pub struct MockRadio {
    pub calls: Vec<Call>,
    pub fail_frequency: bool,
    pub fail_write: bool,
    pub fail_start: bool,
    /// Interrupts returned by the next poll
    pub pending: IrqSet,
}

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&mut self, irqs: IrqSet) {
        self.pending = self.pending | irqs;
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn started(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::StartTransmit(_))).count()
    }
}

impl Radio for MockRadio {
    type Error = MockError;

    async fn apply_frequency(&mut self, freq_hz: u32) -> Result<(), MockError> {
        self.calls.push(Call::ApplyFrequency(freq_hz));
        if self.fail_frequency { Err(MockError) } else { Ok(()) }
    }

    async fn write_tx_buffer(&mut self, payload: &[u8]) -> Result<(), MockError> {
        self.calls.push(Call::WriteTxBuffer(payload.to_vec()));
        if self.fail_write { Err(MockError) } else { Ok(()) }
    }

    async fn start_transmit(&mut self, timeout: u32) -> Result<(), MockError> {
        self.calls.push(Call::StartTransmit(timeout));
        if self.fail_start { Err(MockError) } else { Ok(()) }
    }

    async fn pre_transmit_setup(&mut self) {
        self.calls.push(Call::PreTransmit);
    }

    async fn post_transmit_teardown(&mut self) {
        self.calls.push(Call::PostTransmit);
    }

    async fn reset_device(&mut self) {
        self.calls.push(Call::Reset);
    }

    async fn poll_and_clear_interrupts(&mut self, mask: IrqSet) -> IrqSet {
        let irqs = self.pending.masked(mask);
        self.pending = IrqSet::NONE;
        irqs
    }
}

pub fn new_tool() -> TxTool<MockRadio> {
    TxTool::new(MockRadio::new()).expect("default commands")
}

/// Run one loop iteration with the given console input, return the console output
pub fn send(tool: &mut TxTool<MockRadio>, input: &str) -> String {
    let mut out = String::new();
    block_on(tool.tick(input.bytes(), &mut out));
    out
}

/// Raise a TX-done and run one loop iteration without input
pub fn complete_tx(tool: &mut TxTool<MockRadio>) -> String {
    tool.radio_mut().fire(IrqSet::TX_DONE);
    send(tool, "")
}
