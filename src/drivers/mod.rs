pub mod imu;
pub mod mqtt;
pub mod wifi;
