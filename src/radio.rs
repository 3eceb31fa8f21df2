//! Radio collaborator interface
//!
//! The TX state machine only needs a handful of operations from the
//! transceiver. The board implements them on top of the LR2021 driver,
//! tests implement them with a recording mock.

use core::fmt::Debug;
use core::ops::BitOr;

/// Set of interrupt sources, bit positions follow the LR2021 IRQ register
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqSet(u32);

impl IrqSet {
    pub const NONE         : IrqSet = IrqSet(0);
    pub const HEADER_ERROR : IrqSet = IrqSet(0x0000_0200);
    pub const RX_DONE      : IrqSet = IrqSet(0x0004_0000);
    pub const TX_DONE      : IrqSet = IrqSet(0x0008_0000);
    pub const TIMEOUT      : IrqSet = IrqSet(0x0020_0000);
    pub const CRC_ERROR    : IrqSet = IrqSet(0x0040_0000);
    pub const LEN_ERROR    : IrqSet = IrqSet(0x0080_0000);

    pub const fn from_bits(bits: u32) -> Self {
        IrqSet(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn union(self, other: IrqSet) -> Self {
        IrqSet(self.0 | other.0)
    }

    /// Keep only the sources present in the mask
    pub const fn masked(self, mask: IrqSet) -> Self {
        IrqSet(self.0 & mask.0)
    }

    /// True when all sources of `other` are set
    pub const fn contains(&self, other: IrqSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn tx_done(&self) -> bool {
        self.contains(IrqSet::TX_DONE)
    }
}

impl BitOr for IrqSet {
    type Output = IrqSet;

    fn bitor(self, rhs: IrqSet) -> IrqSet {
        self.union(rhs)
    }
}

/// Operations the TX tool issues to the transceiver.
///
/// The radio handle is owned by the event loop: every call happens from the
/// loop, one at a time.
#[allow(async_fn_in_trait)]
pub trait Radio {
    #[cfg(feature = "defmt")]
    type Error: Debug + defmt::Format;

    #[cfg(not(feature = "defmt"))]
    type Error: Debug;

    /// Set the RF channel (in Hz)
    async fn apply_frequency(&mut self, freq_hz: u32) -> Result<(), Self::Error>;

    /// Copy the payload into the radio TX buffer
    async fn write_tx_buffer(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Start a transmission of the buffered payload. A timeout of 0 disables it.
    async fn start_transmit(&mut self, timeout: u32) -> Result<(), Self::Error>;

    /// Board specific actions before a transmission (RF switch, TX led, ...)
    async fn pre_transmit_setup(&mut self);

    /// Board specific actions once a transmission completed
    async fn post_transmit_teardown(&mut self);

    /// Hardware reset of the transceiver
    async fn reset_device(&mut self);

    /// Return the pending interrupts restricted to `mask` and acknowledge all
    /// of them. An empty set means nothing happened since the last poll.
    async fn poll_and_clear_interrupts(&mut self, mask: IrqSet) -> IrqSet;
}
