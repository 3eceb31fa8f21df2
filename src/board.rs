use defmt::Format;
use embassy_executor::Spawner;
use embassy_stm32::{
    bind_interrupts,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    mode::Async,
    spi::{Config as SpiConfig, Spi},
    time::Hertz,
    usart::{Config as UartConfig, Uart, UartRx}
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel, signal::Signal};
use embassy_time::{Duration, Timer};
use lr2021::{
    lora::{HeaderType, Ldro, LoraBw, LoraCr, Sf},
    radio::{PaLfMode, PacketType, RampTime, RxBoost, RxPath},
    status::Intr,
    system::DioNum,
    BusyAsync, Lr2021, Lr2021Error
};

use crate::config::{Bandwidth, CodingRate, SpreadingFactor, TxConfig, IRQ_MASK, PREAMBLE_LEN, TX_PAYLOAD};
use crate::radio::{IrqSet, Radio};

bind_interrupts!(struct UartIrqs {
    USART2 => embassy_stm32::usart::InterruptHandler<embassy_stm32::peripherals::USART2>;
});

pub type Lr2021Stm32 = Lr2021<Output<'static>,SpiWrapper, BusyAsync<ExtiInput<'static>>>;

/// Console bytes received on the UART, drained by the event loop
pub type ConsoleRxChannel = Channel<CriticalSectionRawMutex, u8, CONSOLE_RX_SIZE>;
pub const CONSOLE_RX_SIZE: usize = 128;
pub static CONSOLE_RX: ConsoleRxChannel = Channel::new();

/// Led modes
static LED_RED_MODE: SignalLedMode = Signal::new();
static LED_GREEN_MODE: SignalLedMode = Signal::new();

pub struct BoardNucleoL476Rg {
    pub lr2021: Lr2021Stm32,
    pub irq: ExtiInput<'static>,
    pub uart: Uart<'static, Async>,
    /// Firmware version (major, minor)
    pub fw_version: (u8, u8),
}

impl BoardNucleoL476Rg {

    // Pin mapping
    // Name  | Connector | Nucleo
    // NRST  | CN8 A0    | PA0
    // SCK   | CN5 D13   | PA5
    // MISO  | CN5 D12   | PA6
    // MOSI  | CN5 D11   | PA7
    // NSS   | CN9 D7    | PA8
    // BUSY  | CN9 D3    | PB3
    // DIO7  | CN8 A3    | PB0
    // LEDTX | CN8 A5    | PC0
    // LEDRX | CN8 A4    | PC1

    pub async fn init(spawner: &Spawner) -> BoardNucleoL476Rg {
        let mut config = embassy_stm32::Config::default();

        // System clock at 80MHz from the 16MHz HSI: (16MHz * 10) / (1 * 2)
        config.rcc.hsi = true;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            source: embassy_stm32::rcc::PllSource::HSI,
            prediv: embassy_stm32::rcc::PllPreDiv::DIV1,
            mul: embassy_stm32::rcc::PllMul::MUL10,
            divp: None,
            divq: None,
            divr: Some(embassy_stm32::rcc::PllRDiv::DIV2),
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_R;
        let p = embassy_stm32::init(config);

        // Leds: red is the TX activity, green shows the firmware is alive
        let led_red = Output::new(p.PC1, Level::High, Speed::Low);
        let led_green = Output::new(p.PC0, Level::High, Speed::Low);
        spawner.spawn(blink(led_red, &LED_RED_MODE)).unwrap();
        spawner.spawn(blink(led_green, &LED_GREEN_MODE)).unwrap();
        LED_RED_MODE.signal(LedMode::Off);
        LED_GREEN_MODE.signal(LedMode::BlinkSlow);

        // Control pins
        let busy = ExtiInput::new(p.PB3, p.EXTI3, Pull::Up);
        let nreset = Output::new(p.PA0, Level::High, Speed::Low);
        let irq = ExtiInput::new(p.PB0, p.EXTI0, Pull::None); // DIO7

        // UART on Virtual Com: 115200bauds, 1 stop bit, no parity, no flow control
        let mut uart_config = UartConfig::default();
        uart_config.baudrate = 115_200;
        let uart = Uart::new(p.USART2, p.PA3, p.PA2, UartIrqs, p.DMA1_CH7, p.DMA1_CH6, uart_config).unwrap();

        // SPI
        let mut spi_config = SpiConfig::default();
        spi_config.frequency = Hertz(12_000_000);
        let spi = SpiWrapper(Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi_config));
        let nss = Output::new(p.PA8, Level::High, Speed::VeryHigh);

        // Create driver and reset board
        let mut lr2021 = Lr2021::new(nreset, busy, spi, nss);
        lr2021.reset().await.expect("Resetting chip !");

        // Check version
        let version = lr2021.get_version().await.expect("Reading firmware version !");
        info!("FW Version {}", version);
        let fw_version = (version.major(), version.minor());
        BoardNucleoL476Rg{lr2021, irq, uart, fw_version}
    }

    pub fn led_red_set(mode: LedMode) {
        LED_RED_MODE.signal(mode)
    }
}

/// LR2021 seen through the operations of the TX tool
pub struct Lr2021Radio {
    lr2021: Lr2021Stm32,
    irq: ExtiInput<'static>,
}

impl Lr2021Radio {

    pub fn new(lr2021: Lr2021Stm32, irq: ExtiInput<'static>) -> Self {
        Self { lr2021, irq }
    }

    /// Configure the transceiver for LoRa transmissions of the test payload
    /// and route the tool interrupts to DIO7
    pub async fn configure(&mut self, cfg: &TxConfig) -> Result<(), Lr2021Error> {
        self.lr2021.set_rf(cfg.freq_hz).await?;
        self.lr2021.set_rx_path(RxPath::LfPath, RxBoost::Off).await?;
        self.lr2021.calib_fe(&[]).await?;
        match self.lr2021.get_status().await {
            Ok((status, intr)) => info!("Calibration Done: {} | {}", status, intr),
            Err(e) => error!("Calibration Failed: {}", e),
        }
        self.lr2021.set_pa_lf(PaLfMode::LfPaFsm, 6, 7).await?;
        self.lr2021.set_tx_params(cfg.power_dbm as u8, RampTime::Ramp8u).await?;
        self.lr2021.set_packet_type(PacketType::Lora).await?;
        self.lr2021.set_lora_modulation(sf(cfg.sf), lora_bw(cfg.bw), lora_cr(cfg.cr), Ldro::Off).await?;
        self.lr2021.set_lora_packet(PREAMBLE_LEN, TX_PAYLOAD.len() as u8, HeaderType::Explicit, true, false).await?;
        self.lr2021.set_dio_irq(DioNum::Dio7, Intr::new(IRQ_MASK.bits())).await?;
        Ok(())
    }
}

impl Radio for Lr2021Radio {
    type Error = Lr2021Error;

    async fn apply_frequency(&mut self, freq_hz: u32) -> Result<(), Self::Error> {
        self.lr2021.set_rf(freq_hz).await
    }

    async fn write_tx_buffer(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        self.lr2021.wr_tx_fifo_from(payload).await
    }

    async fn start_transmit(&mut self, timeout: u32) -> Result<(), Self::Error> {
        self.lr2021.set_tx(timeout).await
    }

    async fn pre_transmit_setup(&mut self) {
        BoardNucleoL476Rg::led_red_set(LedMode::On);
    }

    async fn post_transmit_teardown(&mut self) {
        BoardNucleoL476Rg::led_red_set(LedMode::Off);
    }

    async fn reset_device(&mut self) {
        if let Err(e) = self.lr2021.reset().await {
            error!("Reset failed: {}", e);
        }
    }

    async fn poll_and_clear_interrupts(&mut self, mask: IrqSet) -> IrqSet {
        if !self.irq.is_high() {
            return IrqSet::NONE;
        }
        match self.lr2021.get_and_clear_irq().await {
            Ok(intr) => {
                debug!("IRQ {}", intr);
                IrqSet::from_bits(intr.value()).masked(mask)
            }
            Err(e) => {
                error!("GetIrqs: {}", e);
                IrqSet::NONE
            }
        }
    }
}

fn sf(sf: SpreadingFactor) -> Sf {
    match sf {
        SpreadingFactor::Sf5  => Sf::Sf5,
        SpreadingFactor::Sf6  => Sf::Sf6,
        SpreadingFactor::Sf7  => Sf::Sf7,
        SpreadingFactor::Sf8  => Sf::Sf8,
        SpreadingFactor::Sf9  => Sf::Sf9,
        SpreadingFactor::Sf10 => Sf::Sf10,
        SpreadingFactor::Sf11 => Sf::Sf11,
        SpreadingFactor::Sf12 => Sf::Sf12,
    }
}

fn lora_bw(bw: Bandwidth) -> LoraBw {
    match bw {
        Bandwidth::Bw7   => LoraBw::Bw7,
        Bandwidth::Bw10  => LoraBw::Bw10,
        Bandwidth::Bw15  => LoraBw::Bw15,
        Bandwidth::Bw20  => LoraBw::Bw20,
        Bandwidth::Bw31  => LoraBw::Bw31,
        Bandwidth::Bw41  => LoraBw::Bw41,
        Bandwidth::Bw62  => LoraBw::Bw62,
        Bandwidth::Bw125 => LoraBw::Bw125,
        Bandwidth::Bw250 => LoraBw::Bw250,
        Bandwidth::Bw500 => LoraBw::Bw500,
    }
}

fn lora_cr(cr: CodingRate) -> LoraCr {
    match cr {
        CodingRate::Cr4_5 => LoraCr::Cr1Ham45Si,
        CodingRate::Cr4_6 => LoraCr::Cr2Ham46Si,
        CodingRate::Cr4_7 => LoraCr::Cr3Ham47Si,
        CodingRate::Cr4_8 => LoraCr::Cr4Ham48Si,
    }
}

/// Task forwarding every byte received on the console UART to the event loop
#[embassy_executor::task]
pub async fn console_rx(mut uart: UartRx<'static, Async>, channel: &'static ConsoleRxChannel) {
    let mut buffer = [0u8; 32];
    loop {
        match uart.read_until_idle(&mut buffer).await {
            Ok(n) => {
                for &b in &buffer[..n] {
                    // Drop input when the loop is not keeping up
                    if channel.try_send(b).is_err() {
                        debug!("Console RX overflow");
                    }
                }
            }
            Err(e) => error!("UART RX: {}", e),
        }
    }
}


/// Led Mode
#[derive(Debug, Clone, Copy, Format, PartialEq)]
pub enum LedMode {
    Off = 0,
    On  = 1,
    BlinkSlow = 2,
}

impl LedMode {

    /// Blinking half period
    pub fn delay(&self) -> Duration {
        match self {
            LedMode::BlinkSlow => Duration::from_millis(500),
            _ => Duration::from_ticks(0),
        }
    }

    pub fn is_blink(&self) -> bool {
        matches!(self, LedMode::BlinkSlow)
    }
}

pub type SignalLedMode = Signal<CriticalSectionRawMutex, LedMode>;

/// Task pool to control the two leds of the LR2021 module
#[embassy_executor::task(pool_size = 2)]
pub async fn blink(mut led: Output<'static>, signal: &'static SignalLedMode) {
    let mut mode = LedMode::BlinkSlow;
    loop {
        if let Some(next_mode) = signal.try_take() {
            mode = next_mode;
        }
        if mode.is_blink() {
            Timer::after(mode.delay()).await;
            led.toggle();
        } else {
            match mode {
                LedMode::On => led.set_high(),
                _ => led.set_low(),
            }
            mode = signal.wait().await;
        }
    }
}


// Wrapper around blocking SPI to use the non-DMA SPI with the LR2021 driver
pub struct SpiWrapper(pub Spi<'static,embassy_stm32::mode::Blocking>);

impl embedded_hal_1::spi::ErrorType for SpiWrapper {
    type Error = embassy_stm32::spi::Error;
}

impl<W: embassy_stm32::spi::Word> embedded_hal_async::spi::SpiBus<W> for SpiWrapper {
    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn write(&mut self, words: &[W]) -> Result<(), Self::Error> {
        self.0.blocking_write(words)
    }

    async fn read(&mut self, words: &mut [W]) -> Result<(), Self::Error> {
        self.0.blocking_read(words)
    }

    async fn transfer(&mut self, read: &mut [W], write: &[W]) -> Result<(), Self::Error> {
        self.0.blocking_transfer(read, write)
    }

    async fn transfer_in_place(&mut self, words: &mut [W]) -> Result<(), Self::Error> {
        self.0.blocking_transfer_in_place(words)
    }
}
