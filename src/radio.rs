//! TDA5340 driver and mode state machine
//!
//! [`Tda5340`] owns the bus, the interrupt source, the P_ON pin and a delay provider.
//! It tracks the operating [`Mode`] and dispatches interrupts to handler callbacks.
//!
//! # Modes
//! - [`Mode::Reset`] after construction and after every [`reset`](Tda5340::reset).
//!   The first interrupt validates the power-on status and moves to [`Mode::Sleep`].
//! - [`Mode::Sleep`], [`Mode::SelfPolling`], [`Mode::Slave`], [`Mode::Transmit`] are
//!   entered on request through [`set_mode`](Tda5340::set_mode).
//!
//! # Contexts
//! The driver is meant to be shared between the foreground and the NINT interrupt
//! handler. Foreground methods mask the interrupt source for the duration of each bus
//! transaction. [`handle_interrupt`](Tda5340::handle_interrupt) runs with its own source
//! masked by the hardware and only changes the mode once, from [`Mode::Reset`] to
//! [`Mode::Sleep`]; every other mode change comes from the foreground. Handler
//! callbacks get an [`IrqContext`], which has bus and FIFO access but no way to change
//! the mode.

use core::{convert::Infallible, hint};

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use regiface::{ReadableRegister, WritableRegister};

use crate::{
    device::Device,
    fifo::{self, BitBuffer, FifoFrame},
    irq::{Events, IrqContext, ReceiveHandler, TransmitHandler},
    lock::TransactionLock,
    registers::{
        ChipModeControl, FifoEvents, InterruptMask0, InterruptMask2, InterruptStatus0,
        InterruptStatus1, InterruptStatus2, ReceiverEvents, RxControl, RxControlFlags,
        TxControl, TxControlFlags, POR_STATUS,
    },
    transport::{InterruptSource, Transport},
    Config, ConfigEntry, ConfigSet, Error, Mode, RunMode,
};

/// Status register value that cannot be told apart from a reset radio
const STATUS_AMBIGUOUS: u8 = 0xFF;

/// Handler callbacks for both receive and transmit modes
pub trait Handler<T, IRQ, PON, DELAY>:
    for<'a> ReceiveHandler<IrqContext<'a, T, IRQ, PON, DELAY>>
    + for<'a> TransmitHandler<IrqContext<'a, T, IRQ, PON, DELAY>>
{
}

impl<H, T, IRQ, PON, DELAY> Handler<T, IRQ, PON, DELAY> for H where
    H: for<'a> ReceiveHandler<IrqContext<'a, T, IRQ, PON, DELAY>>
        + for<'a> TransmitHandler<IrqContext<'a, T, IRQ, PON, DELAY>>
{
}

/// Transmit control bits used for every transmission
const TX_BASE: TxControlFlags = TxControlFlags::END_ON_FIFO_EMPTY
    .union(TxControlFlags::FAILSAFE)
    .union(TxControlFlags::BAUD_RATE_SYNC);

/// Driver for the TDA5340
pub struct Tda5340<T, IRQ, PON, DELAY> {
    device: Device<T>,
    irq: IRQ,
    pon: PON,
    delay: DELAY,
    lock: TransactionLock,
    mode: Mode,
    send_start_bit: bool,
    reset_attempts: u32,
    in_interrupt: bool,
    cfg: Config,
}

impl<T, IRQ, PON, DELAY> Tda5340<T, IRQ, PON, DELAY> {
    /// Creates a new driver without touching the hardware.
    ///
    /// The driver starts in [`Mode::Reset`]. Call [`reset`](Self::reset) unless the
    /// radio has just been powered up.
    pub fn new(transport: T, irq: IRQ, pon: PON, delay: DELAY, cfg: Config) -> Self {
        Self {
            device: Device::new(transport, cfg.write_retries),
            irq,
            pon,
            delay,
            lock: TransactionLock::new(),
            mode: Mode::Reset,
            send_start_bit: false,
            reset_attempts: 0,
            in_interrupt: false,
            cfg,
        }
    }

    /// Releases transport, interrupt source, P_ON pin and delay
    pub fn release(self) -> (T, IRQ, PON, DELAY) {
        (self.device.release(), self.irq, self.pon, self.delay)
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether transmissions use start bit framing
    pub fn send_start_bit(&self) -> bool {
        self.send_start_bit
    }

    /// Get common config
    pub fn config(&self) -> Config {
        self.cfg
    }

    /// Set common config
    pub fn set_config(&mut self, cfg: Config) {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_config({})", cfg);
        self.device.set_retries(cfg.write_retries);
        self.cfg = cfg;
    }
}

impl<T, IRQ, PON, DELAY> Tda5340<T, IRQ, PON, DELAY>
where
    T: Transport,
    IRQ: InterruptSource,
    PON: OutputPin,
    DELAY: DelayNs,
{
    /// Creates a new driver and resets the radio
    pub fn try_new(
        transport: T,
        irq: IRQ,
        pon: PON,
        delay: DELAY,
        cfg: Config,
    ) -> Result<Self, Error<T::Error>> {
        let mut radio = Self::new(transport, irq, pon, delay, cfg);
        radio.reset()?;
        Ok(radio)
    }

    /// Resets the radio by pulling P_ON low.
    ///
    /// The driver returns to [`Mode::Reset`]. Power-on checks are done by the
    /// interrupt handler once the radio signals it is up.
    pub fn reset(&mut self) -> Result<(), Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("reset()");
        self.reset_attempts = 0;
        self.mode = Mode::Reset;
        self.pulse_reset()
    }

    /// Runs `f` as one bus transaction.
    ///
    /// The interrupt source is masked and chip-select asserted for the whole of `f`, so
    /// several accesses can be grouped without the interrupt handler getting in between.
    /// Called through an [`IrqContext`], the source stays masked until the interrupt has
    /// been handled.
    ///
    /// # Panics
    /// Panics in debug builds if another transaction is already in flight.
    pub fn transaction<R>(
        &mut self,
        f: impl FnOnce(&mut Device<T>) -> Result<R, Error<T::Error>>,
    ) -> Result<R, Error<T::Error>> {
        if self.in_interrupt {
            return self.locked(f);
        }

        // the interrupt handler uses the bus as well and must not interrupt this
        self.irq.mask();
        let result = self.locked(f);
        self.irq.unmask();
        result
    }

    /// Reads a register.
    pub fn read_register(&mut self, address: u16) -> Result<u8, Error<T::Error>> {
        self.transaction(|device| device.read_register(address))
    }

    /// Writes and verifies a register.
    pub fn write_register(&mut self, address: u16, value: u8) -> Result<(), Error<T::Error>> {
        self.transaction(|device| device.write_register(address, value))
    }

    /// Reads a typed register.
    pub fn read<R>(&mut self) -> Result<R, Error<T::Error>>
    where
        R: ReadableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        self.transaction(|device| device.read())
    }

    /// Writes and verifies a typed register.
    pub fn write<R>(&mut self, register: R) -> Result<(), Error<T::Error>>
    where
        R: WritableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        self.transaction(|device| device.write(register))
    }

    /// Loads a configuration within a single transaction.
    ///
    /// Stops at the first write that fails verification; entries before it stay
    /// applied. The radio should be in [`Mode::Sleep`] while loading.
    pub fn write_bulk(&mut self, entries: &[ConfigEntry]) -> Result<(), Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("write_bulk({} entries)", entries.len());
        self.transaction(|device| device.write_bulk(entries))
    }

    /// Sets the operating mode.
    ///
    /// # Arguments
    /// * `mode` - Mode to enter
    /// * `send_start_bit` - Use start bit framing, only relevant for
    ///   [`RunMode::Transmit`]
    /// * `config` - Configuration set to use
    ///
    /// Entering [`RunMode::Transmit`] clears the transmit FIFO, entering
    /// [`RunMode::Slave`] clears the receive FIFO.
    pub fn set_mode(
        &mut self,
        mode: RunMode,
        send_start_bit: bool,
        config: ConfigSet,
    ) -> Result<(), Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("set_mode({}, {}, {})", mode, send_start_bit, config);
        match mode {
            RunMode::Transmit => {
                let mut set = TX_BASE | TxControlFlags::INIT_FIFO;
                set.set(TxControlFlags::START_BIT_MODE, send_start_bit);
                self.write(TxControl {
                    flags: TxControlFlags::from_reset(set, TxControlFlags::START),
                })?;
                self.send_start_bit = send_start_bit;
            }
            RunMode::Slave => {
                let (set, clear) = if self.cfg.fs_init_rx_fifo {
                    (RxControlFlags::FS_INIT_FIFO, RxControlFlags::empty())
                } else {
                    (RxControlFlags::empty(), RxControlFlags::FS_INIT_FIFO)
                };
                self.write(RxControl {
                    flags: RxControlFlags::from_reset(set | RxControlFlags::INIT_FIFO, clear),
                })?;
            }
            RunMode::Sleep | RunMode::SelfPolling => {}
        }

        // the mode register is write-only, so the brown-out detector bit is always
        // written along with the mode
        self.write(ChipModeControl {
            mode,
            config,
            brown_out_detector: true,
        })?;
        self.mode = mode.into();
        Ok(())
    }

    /// Starts sending the transmit FIFO contents.
    ///
    /// Uses the start bit framing chosen when entering [`Mode::Transmit`].
    pub fn start_transmission(&mut self) -> Result<(), Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("start_transmission()");
        self.require_mode(Mode::Transmit)?;
        let mut set = TX_BASE | TxControlFlags::START;
        set.set(TxControlFlags::START_BIT_MODE, self.send_start_bit);
        self.write(TxControl {
            flags: TxControlFlags::from_reset(set, TxControlFlags::empty()),
        })
    }

    /// Writes one frame into the transmit FIFO.
    ///
    /// # Arguments
    /// * `data` - Payload, the first bit to send in bit 0 of the first byte
    /// * `bits` - Number of bits to send, 1 to 256
    ///
    /// # Errors
    /// * `Error::WrongMode` - The radio is not in [`Mode::Transmit`]
    /// * `Error::InvalidFrameLength` - `bits` out of range or not covered by `data`
    pub fn write_frame(&mut self, data: &[u8], bits: usize) -> Result<(), Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("write_frame({} bits)", bits);
        self.require_mode(Mode::Transmit)?;
        // reject before masking the interrupt source
        fifo::check_frame(data, bits)?;
        self.transaction(|device| device.write_fifo(data, bits))
    }

    /// Reads one block from the receive FIFO.
    ///
    /// # Errors
    /// * `Error::FifoOverflow` - Data was lost, the block is discarded
    pub fn read_frame(&mut self) -> Result<FifoFrame, Error<T::Error>> {
        let frame = self.transaction(|device| device.read_fifo())?;
        if frame.overflow {
            #[cfg(feature = "defmt")]
            defmt::debug!("receive fifo overflow");
            return Err(Error::FifoOverflow);
        }
        Ok(frame)
    }

    /// Drains the receive FIFO into `buf`.
    ///
    /// Blocks are appended in arrival order until a block without valid bits ends the
    /// transfer. Each block is read in its own transaction. Returns the number of bits
    /// received. On error the contents of `buf` are unspecified and the packet should
    /// be dropped.
    ///
    /// # Arguments
    /// * `buf` - Destination, bit `n` of the stream goes to bit `n % 8` of byte `n / 8`
    /// * `max_bits` - Upper limit of bits to accept, capped by the size of `buf`
    ///
    /// # Errors
    /// * `Error::FifoOverflow` - The FIFO overflowed and part of the packet was lost
    /// * `Error::BufferTooSmall` - The packet does not fit into `buf` or `max_bits`
    pub fn read_all(&mut self, buf: &mut [u8], max_bits: usize) -> Result<usize, Error<T::Error>> {
        let mut bits = BitBuffer::with_limit(buf, max_bits);
        loop {
            let frame = self.read_frame()?;
            // truncated packet or done receiving
            if frame.is_end() {
                break;
            }
            bits.push(frame.data, frame.valid_bits)
                .map_err(|_| Error::BufferTooSmall)?;
        }
        Ok(bits.len())
    }

    /// Masks receiver events of configuration sets A and B. Set bits are masked.
    pub fn set_receiver_interrupt_mask(
        &mut self,
        masked: ReceiverEvents,
    ) -> Result<(), Error<T::Error>> {
        self.write(InterruptMask0 { masked })
    }

    /// Masks FIFO and transmitter events. Set bits are masked.
    pub fn set_fifo_interrupt_mask(&mut self, masked: FifoEvents) -> Result<(), Error<T::Error>> {
        self.write(InterruptMask2 { masked })
    }

    /// Handles a NINT interrupt.
    ///
    /// Call this from the interrupt handler. Reads the status registers relevant to the
    /// current mode and invokes the matching `handler` callbacks. Returns the events
    /// that were dispatched.
    ///
    /// Callbacks get an [`IrqContext`] instead of the driver, so the mode only ever
    /// changes here when leaving [`Mode::Reset`].
    ///
    /// In [`Mode::Reset`] this validates the power-on status instead. If validation
    /// fails the radio is reset again and the driver stays in [`Mode::Reset`].
    ///
    /// # Errors
    /// * `Error::ResetFailed` - [`Config::max_reset_attempts`] reset pulses did not bring
    ///   up the radio
    pub fn handle_interrupt<H>(&mut self, handler: &mut H) -> Result<Events, Error<T::Error>>
    where
        H: Handler<T, IRQ, PON, DELAY>,
    {
        let outer = core::mem::replace(&mut self.in_interrupt, true);
        let result = self.service_interrupt(handler);
        self.in_interrupt = outer;
        result
    }

    fn service_interrupt<H>(&mut self, handler: &mut H) -> Result<Events, Error<T::Error>>
    where
        H: Handler<T, IRQ, PON, DELAY>,
    {
        match self.mode {
            Mode::Reset => {
                self.validate_power_on()?;
                Ok(Events::empty())
            }
            Mode::Sleep => Ok(Events::empty()),
            Mode::Transmit => {
                // only IS2 is relevant in transmit mode
                let is2: InterruptStatus2 = self.interrupt_read()?;
                if is2.events.bits() == STATUS_AMBIGUOUS {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("ambiguous status, ignored");
                    return Ok(Events::empty());
                }
                let events = transmit_events(is2.events);
                dispatch_transmit(&mut IrqContext::new(self), handler, events);
                Ok(events)
            }
            Mode::SelfPolling | Mode::Slave => {
                let is0: InterruptStatus0 = self.interrupt_read()?;
                let is2: InterruptStatus2 = self.interrupt_read()?;
                if is0.events.bits() == STATUS_AMBIGUOUS {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("ambiguous status, ignored");
                    return Ok(Events::empty());
                }
                let events = receive_events(is0.events, is2.events);
                dispatch_receive(&mut IrqContext::new(self), handler, events);
                Ok(events)
            }
        }
    }

    /// Power-on checks, see datasheet chapter on startup
    fn validate_power_on(&mut self) -> Result<(), Error<T::Error>> {
        // triggering on the falling edge of NINT, the flag tells whether it was pulled
        // low
        if !self.irq.is_pending() {
            return Ok(());
        }

        // short circuits on the first register that is off
        let por = self.interrupt_read::<InterruptStatus0>()?.events.bits() == POR_STATUS
            && self.interrupt_read::<InterruptStatus1>()?.events.bits() == POR_STATUS
            && self.interrupt_read::<InterruptStatus2>()?.events.bits() == POR_STATUS;
        if !por {
            return self.retry_reset();
        }

        // NINT goes high once the status registers have been read, the flag is cleared
        // by hardware on that edge
        while self.irq.is_pending() {
            hint::spin_loop();
        }

        if !self.interrupt_read::<InterruptStatus2>()?.events.is_empty() {
            return self.retry_reset();
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("power-on status validated");
        self.reset_attempts = 0;
        self.mode = Mode::Sleep;
        Ok(())
    }

    fn retry_reset(&mut self) -> Result<(), Error<T::Error>> {
        if let Some(max) = self.cfg.max_reset_attempts {
            if self.reset_attempts >= max {
                #[cfg(feature = "defmt")]
                defmt::warn!("reset failed {} times, giving up", self.reset_attempts);
                return Err(Error::ResetFailed);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("reset failed, trying again");
        self.reset_attempts = self.reset_attempts.saturating_add(1);
        self.pulse_reset()
    }

    fn pulse_reset(&mut self) -> Result<(), Error<T::Error>> {
        self.pon.set_low().map_err(|_| Error::Pin)?;
        self.delay.delay_us(self.cfg.reset_pulse_us);
        self.pon.set_high().map_err(|_| Error::Pin)?;
        self.device.assume_reset_page();
        Ok(())
    }

    fn require_mode(&self, mode: Mode) -> Result<(), Error<T::Error>> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(Error::WrongMode(self.mode))
        }
    }

    /// Register read from interrupt context, where the source is already masked
    fn interrupt_read<R>(&mut self) -> Result<R, Error<T::Error>>
    where
        R: ReadableRegister<IdType = u16, Array = [u8; 1], Error = Infallible>,
    {
        self.locked(|device| device.read())
    }

    fn locked<R>(
        &mut self,
        f: impl FnOnce(&mut Device<T>) -> Result<R, Error<T::Error>>,
    ) -> Result<R, Error<T::Error>> {
        let _guard = self.lock.acquire();
        self.device.select()?;
        let result = f(&mut self.device);
        let deselected = self.device.deselect();
        let value = result?;
        deselected?;
        Ok(value)
    }
}

fn dispatch_receive<C, H: ReceiveHandler<C>>(ctx: &mut C, handler: &mut H, events: Events) {
    // order matters: if everything arrives at once, keep the natural order of a frame
    if events.contains(Events::FrameSyncA) {
        handler.frame_sync(ctx, ConfigSet::A);
    }
    if events.contains(Events::FrameSyncB) {
        handler.frame_sync(ctx, ConfigSet::B);
    }
    if events.contains(Events::EndOfMessageA) {
        handler.end_of_message(ctx, ConfigSet::A);
    }
    if events.contains(Events::EndOfMessageB) {
        handler.end_of_message(ctx, ConfigSet::B);
    }
    if events.contains(Events::RxFifoAlmostFull) {
        handler.fifo_almost_full(ctx);
    }
}

fn dispatch_transmit<C, H: TransmitHandler<C>>(ctx: &mut C, handler: &mut H, events: Events) {
    if events.contains(Events::TxError) {
        handler.error(ctx);
    }
    if events.contains(Events::TxFifoAlmostEmpty) {
        handler.fifo_almost_empty(ctx);
    }
    if events.contains(Events::TxFifoEmpty) {
        handler.fifo_empty(ctx);
    }
    if events.contains(Events::TxReady) {
        handler.ready(ctx);
    }
}

fn receive_events(is0: ReceiverEvents, is2: FifoEvents) -> Events {
    let mut events = Events::empty();
    events.set(Events::FrameSyncA, is0.contains(ReceiverEvents::FRAME_SYNC_A));
    events.set(Events::FrameSyncB, is0.contains(ReceiverEvents::FRAME_SYNC_B));
    events.set(Events::EndOfMessageA, is0.contains(ReceiverEvents::END_OF_MESSAGE_A));
    events.set(Events::EndOfMessageB, is0.contains(ReceiverEvents::END_OF_MESSAGE_B));
    events.set(Events::RxFifoAlmostFull, is2.contains(FifoEvents::RX_ALMOST_FULL));
    events
}

fn transmit_events(is2: FifoEvents) -> Events {
    let mut events = Events::empty();
    events.set(Events::TxError, is2.contains(FifoEvents::TX_ERROR));
    events.set(Events::TxFifoAlmostEmpty, is2.contains(FifoEvents::TX_ALMOST_EMPTY));
    events.set(Events::TxFifoEmpty, is2.contains(FifoEvents::TX_EMPTY));
    events.set(Events::TxReady, is2.contains(FifoEvents::TX_READY));
    events
}
