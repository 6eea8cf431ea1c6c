// PunchWatch — Firmware Entry Point
//
// Boot sequence:
//   1. Bring up the MPU6050 on I2C (±8 g, ±500 °/s, DLPF 21 Hz).
//   2. Join Wi-Fi and start the MQTT client (connects in the background).
//   3. Build the punch pipeline; a window/model shape mismatch aborts boot.
//   4. Spawn the pipeline and MQTT maintenance tasks.
//
// Every 50 ms the pipeline samples, filters and reports the IMU; every
// 150 ms it classifies the latest window and publishes confident punches.

#[cfg(target_os = "espidf")]
mod drivers;
#[cfg(target_os = "espidf")]
mod tasks;

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("punchwatch is ESP-IDF firmware; build it for an espidf target or run `cargo test --lib`");
}

// ---------------------------------------------------------------------------
// Clock: milliseconds since boot from the 64-bit high-resolution timer
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
struct EspTimerClock;

#[cfg(target_os = "espidf")]
impl punchwatch::Clock for EspTimerClock {
    fn now_ms(&self) -> u64 {
        unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u64 }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use punchwatch::config::*;
    use punchwatch::{Clock, Pipeline, PipelineConfig};

    use crate::drivers::imu::Mpu6050;
    use crate::drivers::mqtt::MqttTelemetry;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("PunchWatch firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ---- IMU --------------------------------------------------------------
    let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21, // SDA
        peripherals.pins.gpio22, // SCL
        &i2c_config,
    )?;
    let mut imu = Mpu6050::new(i2c);
    if !imu.is_connected() {
        anyhow::bail!(
            "MPU6050 not found at 0x{:02X} (SDA GPIO{}, SCL GPIO{})",
            I2C_ADDR_MPU6050,
            PIN_I2C_SDA,
            PIN_I2C_SCL
        );
    }
    imu.init()?;

    // ---- Network ----------------------------------------------------------
    // Kept alive for the lifetime of the firmware.
    let _wifi = drivers::wifi::connect(peripherals.modem, sysloop, nvs)?;
    let telemetry = MqttTelemetry::connect()?;
    let (mqtt_client, mqtt_link) = telemetry.shared();

    // ---- Model ------------------------------------------------------------
    #[cfg(feature = "edge-impulse")]
    let classifier = punchwatch::classifier::EiClassifier;
    #[cfg(not(feature = "edge-impulse"))]
    let classifier = punchwatch::StubClassifier::new(SEQ_LENGTH, N_FEATURES, N_OUTPUTS);

    // ---- Pipeline ---------------------------------------------------------
    let clock = EspTimerClock;
    let pipeline = Pipeline::new(
        PipelineConfig::default(),
        imu,
        classifier,
        telemetry,
        clock.now_ms(),
    )?;
    log::info!(
        "Pipeline ready: {}x{} window, stride {}, {} ms / {} ms cadence",
        SEQ_LENGTH,
        N_FEATURES,
        STRIDE,
        SAMPLE_INTERVAL_MS,
        CLASSIFY_INTERVAL_MS
    );

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------
    thread::Builder::new()
        .name("mqtt".into())
        .stack_size(STACK_MQTT)
        .spawn(move || {
            tasks::mqtt::mqtt_task(mqtt_client, mqtt_link);
        })?;

    thread::Builder::new()
        .name("pipeline".into())
        .stack_size(STACK_PIPELINE)
        .spawn(move || {
            tasks::pipeline::pipeline_task(pipeline, clock);
        })?;

    // Main thread has nothing left to do; park it forever.
    // (It still owns the Wi-Fi driver.)
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
