//! Driver configuration and operating modes

/// Operating mode as tracked by the driver
///
/// [`Mode::Reset`] is not a mode of the chip itself. It marks the time between a reset
/// pulse and the validation of the power-on status by the interrupt handler.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Waiting for the power-on interrupt after a reset pulse
    #[default]
    Reset,
    /// Sleep mode, used to load configurations
    Sleep,
    /// Receiver in self polling mode
    SelfPolling,
    /// Receiver in run mode slave
    Slave,
    /// Transmitter
    Transmit,
}

impl Mode {
    /// Whether this is one of the two receive modes
    pub fn is_receive(&self) -> bool {
        matches!(self, Mode::SelfPolling | Mode::Slave)
    }
}

/// Mode select field (MSEL) of the chip mode control register
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunMode {
    /// Sleep mode
    Sleep = 0,
    /// Self polling receive mode
    SelfPolling = 1,
    /// Run mode slave, receiver always on
    Slave = 2,
    /// Transmit mode
    Transmit = 3,
}

impl From<RunMode> for Mode {
    fn from(mode: RunMode) -> Self {
        match mode {
            RunMode::Sleep => Mode::Sleep,
            RunMode::SelfPolling => Mode::SelfPolling,
            RunMode::Slave => Mode::Slave,
            RunMode::Transmit => Mode::Transmit,
        }
    }
}

/// One of the four configuration sets held by the chip
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigSet {
    /// Configuration A
    #[default]
    A = 0,
    /// Configuration B
    B = 1,
    /// Configuration C
    C = 2,
    /// Configuration D
    D = 3,
}

impl ConfigSet {
    /// Decodes the two bit configuration field
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ConfigSet::A,
            1 => ConfigSet::B,
            2 => ConfigSet::C,
            _ => ConfigSet::D,
        }
    }
}

/// A single register value of a configuration to be loaded with
/// [`write_bulk`](crate::Tda5340::write_bulk)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigEntry {
    /// Register address including page bits
    pub address: u16,
    /// Value to write
    pub value: u8,
}

impl ConfigEntry {
    pub const fn new(address: u16, value: u8) -> Self {
        Self { address, value }
    }
}

/// Configuration parameters
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Additional attempts after a register write failed verification
    pub write_retries: u8,
    /// Initialize the receive FIFO on every frame start in run mode slave
    pub fs_init_rx_fifo: bool,
    /// Low time of the P_ON pin during a reset, at least 100μs
    pub reset_pulse_us: u32,
    /// Reset pulses the interrupt handler may issue when the power-on status does not
    /// validate. `None` keeps retrying forever.
    pub max_reset_attempts: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            write_retries: 3,
            fs_init_rx_fifo: false,
            reset_pulse_us: 200,
            max_reset_attempts: None,
        }
    }
}
