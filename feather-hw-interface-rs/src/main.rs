//! feather-hw-interface
//!
//! OLED feather firmware for the Raspberry Pi Pico 2. Wires the library
//! crates into a live loop:
//!
//! 1. A process-wide [`SharedClock`] accumulates milliseconds from the
//!    Embassy time driver across 32-bit counter wraps.
//! 2. The OLED address is probed once with [`I2cDevice`].
//! 3. The OLED task redraws the elapsed seconds at 10 Hz.
//! 4. The button task logs each press of A/B/C with its timestamp and the
//!    interval since the previous press, read from the same clock.

#![no_std]
#![no_main]

use defmt::*;
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice as SharedI2c;
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use feather_bus_device::{BusDeviceError, I2cDevice, ProbeMethod, TransferMode};
use feather_oled::{clock_display_task, Button, ClockDisplayConfig, OledFeather, DEFAULT_ADDRESS};
use feather_time::{EmbassyMillis, SharedClock};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

// Wire the I2C0 peripheral interrupt to Embassy's async handler.
bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Shared I2C0 bus. The probe device and the OLED each access it through
/// their own I2cDevice wrapper.
static I2C_BUS: StaticCell<Mutex<CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>> =
    StaticCell::new();

/// Elapsed-time clock read by both tasks.
static CLOCK: SharedClock<CriticalSectionRawMutex, EmbassyMillis> =
    SharedClock::new(EmbassyMillis);

/// Debounce interval after a button edge.
const DEBOUNCE_MS: u64 = 30;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// Concrete I2C type for devices on I2C_BUS.
type BusI2c = SharedI2c<'static, CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Thin wrapper that monomorphises the generic `clock_display_task` so it
/// can be spawned as a concrete Embassy task.
#[embassy_executor::task]
async fn oled_task(
    driver: OledFeather<BusI2c>,
    clock: &'static SharedClock<CriticalSectionRawMutex, EmbassyMillis>,
    config: ClockDisplayConfig,
) {
    clock_display_task(driver, clock, config).await;
}

/// Waits for any button to go LOW (active-low with pull-ups) and logs the
/// press time from the shared clock.
#[embassy_executor::task]
async fn button_task(
    mut button_a: Input<'static>,
    mut button_b: Input<'static>,
    mut button_c: Input<'static>,
    clock: &'static SharedClock<CriticalSectionRawMutex, EmbassyMillis>,
) {
    info!("Button task started");

    let mut last_press = clock.now();

    loop {
        let pressed = match select3(
            button_a.wait_for_falling_edge(),
            button_b.wait_for_falling_edge(),
            button_c.wait_for_falling_edge(),
        )
        .await
        {
            Either3::First(()) => Button::A,
            Either3::Second(()) => Button::B,
            Either3::Third(()) => Button::C,
        };

        let now = clock.now();
        info!(
            "Button {} (GP{}) at {} s, {} s since last press",
            pressed.label(),
            pressed.gpio(),
            now,
            now - last_press
        );
        last_press = now;

        Timer::after_millis(DEBOUNCE_MS).await;
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("feather-hw-interface starting");

    // First reading anchors the clock near zero.
    info!("Clock started at {} s", CLOCK.now());

    // —— Pin assignments ————————————————————————————————————————————————————
    // I2C_SDA  → GP20  (p.PIN_20)
    // I2C_SCL  → GP21  (p.PIN_21)
    // BUTTON_A → GP8   (p.PIN_8)   active-low, pull-up enabled
    // BUTTON_B → GP7   (p.PIN_7)   active-low, pull-up enabled
    // BUTTON_C → GP6   (p.PIN_6)   active-low, pull-up enabled
    // ———————————————————————————————————————————————————————————————————————

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );
    let i2c_bus = I2C_BUS.init(Mutex::new(i2c));

    // —— OLED presence check ————————————————————————————————————————————————

    // The RP2350 controller rejects zero-length writes, so probe with a read.
    match I2cDevice::with_options(
        SharedI2c::new(i2c_bus),
        DEFAULT_ADDRESS,
        ProbeMethod::ReadByte,
        TransferMode::Combined,
    )
    .await
    {
        Ok(dev) => {
            info!("OLED found at {=u8:#x}", dev.address());
            // The OLED driver gets its own wrapper on the same bus.
            drop(dev);
        }
        Err(BusDeviceError::NoDevice { address }) => {
            warn!("No OLED at {=u8:#x}; display task will fail to init", address)
        }
        Err(BusDeviceError::I2c(_)) => error!("I2C bus error while probing OLED"),
    }

    let oled = OledFeather::new(SharedI2c::new(i2c_bus), DEFAULT_ADDRESS);

    let button_a = Input::new(p.PIN_8, Pull::Up);
    let button_b = Input::new(p.PIN_7, Pull::Up);
    let button_c = Input::new(p.PIN_6, Pull::Up);

    // —— Spawn tasks ————————————————————————————————————————————————————————

    let display_config = ClockDisplayConfig::default(); // 10 Hz refresh rate

    spawner.spawn(unwrap!(oled_task(oled, &CLOCK, display_config)));
    spawner.spawn(unwrap!(button_task(button_a, button_b, button_c, &CLOCK)));

    info!("All tasks spawned");
}
