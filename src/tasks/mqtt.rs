// PunchWatch — MQTT Maintenance Task
//
// Runs beside the pipeline so that broker reconnects never stall sampling.
// The client reconnects by itself; this task restores the control-topic
// subscription after each (re)connect.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use punchwatch::config::*;

use crate::drivers::mqtt::{ensure_subscribed, LinkState, SharedClient};

pub fn mqtt_task(client: SharedClient, link: Arc<LinkState>) {
    log::info!("MQTT task started");

    let interval = Duration::from_millis(MQTT_MAINTENANCE_MS);
    loop {
        ensure_subscribed(&client, &link);
        thread::sleep(interval);
    }
}
