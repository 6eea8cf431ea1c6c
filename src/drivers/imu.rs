// PunchWatch — MPU6050 IMU Driver
//
// Custom register-level driver over I2C.
// Avoids external crate version conflicts with esp-idf-hal.

use esp_idf_hal::i2c::I2cDriver;

use punchwatch::config::*;
use punchwatch::{AcquisitionError, SensorData, SensorSource};

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 14-byte sensor burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

pub struct Mpu6050 {
    i2c: I2cDriver<'static>,
}

impl Mpu6050 {
    pub fn new(i2c: I2cDriver<'static>) -> Self {
        Self { i2c }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&mut self) -> bool {
        let mut buf = [0u8; 1];
        match self
            .i2c
            .write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS)
        {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the sensor and configure accel (±8 g), gyro (±500 °/s), DLPF 21 Hz.
    pub fn init(&mut self) -> anyhow::Result<()> {
        // Wake up (clear SLEEP bit)
        self.i2c.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)?;

        // DLPF bandwidth 21 Hz
        self.i2c.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x04], I2C_TIMEOUT_TICKS)?;

        // Gyroscope: ±500 °/s
        self.i2c.write(I2C_ADDR_MPU6050, &[REG_GYRO_CONFIG, 0x08], I2C_TIMEOUT_TICKS)?;

        // Accelerometer: ±8 g
        self.i2c.write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, 0x10], I2C_TIMEOUT_TICKS)?;

        log::info!("MPU6050 initialised (±8g, ±500°/s, DLPF 21Hz)");
        Ok(())
    }

    /// Burst-read all 6 axes; acceleration in m/s², rotation in rad/s.
    pub fn read_data(&mut self) -> anyhow::Result<SensorData> {
        let mut raw = [0u8; 14];
        self.i2c.write_read(
            I2C_ADDR_MPU6050,
            &[REG_ACCEL_XOUT_H],
            &mut raw,
            I2C_TIMEOUT_TICKS,
        )?;

        let accel = |hi: u8, lo: u8| i16::from_be_bytes([hi, lo]) as f32 / ACCEL_SCALE_8G * STANDARD_GRAVITY;
        let gyro = |hi: u8, lo: u8| (i16::from_be_bytes([hi, lo]) as f32 / GYRO_SCALE_500).to_radians();

        Ok(SensorData {
            ax: accel(raw[0], raw[1]),
            ay: accel(raw[2], raw[3]),
            az: accel(raw[4], raw[5]),
            // raw[6..8] = temperature — skipped
            gx: gyro(raw[8], raw[9]),
            gy: gyro(raw[10], raw[11]),
            gz: gyro(raw[12], raw[13]),
        })
    }
}

impl SensorSource for Mpu6050 {
    fn read(&mut self, out: &mut [f32]) -> Result<(), AcquisitionError> {
        if out.len() != N_FEATURES {
            return Err(AcquisitionError::ChannelCount {
                expected: out.len(),
                actual: N_FEATURES,
            });
        }
        let data = self
            .read_data()
            .map_err(|e| AcquisitionError::Bus(e.to_string()))?;
        out.copy_from_slice(&data.to_channels());
        Ok(())
    }
}
