// PunchWatch — MQTT Telemetry Transport
//
// Wraps the ESP-IDF MQTT client. The client runs its own network task and
// reconnects by itself; the event callback only flips link flags and logs
// control messages, so nothing here ever blocks the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

use punchwatch::config::*;
use punchwatch::{Telemetry, TelemetryError, Topic};

/// Link state shared between the client callback, the maintenance task and the publisher.
#[derive(Debug, Default)]
pub struct LinkState {
    pub connected: AtomicBool,
    pub subscribed: AtomicBool,
}

pub type SharedClient = Arc<Mutex<EspMqttClient<'static>>>;

pub struct MqttTelemetry {
    client: SharedClient,
    link: Arc<LinkState>,
}

impl MqttTelemetry {
    /// Create the client and start connecting in the background.
    pub fn connect() -> anyhow::Result<Self> {
        let client_id = format!(
            "{}{:X}",
            MQTT_CLIENT_ID_PREFIX,
            unsafe { esp_idf_sys::esp_random() } & 0xffff
        );
        log::info!("Connecting to MQTT broker as {}", client_id);

        let conf = MqttClientConfiguration {
            client_id: Some(client_id.as_str()),
            username: (!MQTT_USERNAME.is_empty()).then_some(MQTT_USERNAME),
            password: (!MQTT_PASSWORD.is_empty()).then_some(MQTT_PASSWORD),
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        };

        let link = Arc::new(LinkState::default());
        let cb_link = Arc::clone(&link);

        let client = EspMqttClient::new_cb(MQTT_BROKER_URL, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    log::info!("Connected to MQTT broker");
                    cb_link.subscribed.store(false, Ordering::SeqCst);
                    cb_link.connected.store(true, Ordering::SeqCst);
                }
                EventPayload::Disconnected => {
                    log::warn!("MQTT broker disconnected, client will retry");
                    cb_link.connected.store(false, Ordering::SeqCst);
                }
                EventPayload::Received { topic, data, .. } => {
                    // Control messages are accepted but not acted upon.
                    log::info!(
                        "Message arrived [{}]: {}",
                        topic.unwrap_or("?"),
                        String::from_utf8_lossy(data)
                    );
                }
                EventPayload::Error(e) => log::warn!("MQTT error: {:?}", e),
                _ => {}
            }
        })?;

        Ok(Self {
            client: Arc::new(Mutex::new(client)),
            link,
        })
    }

    /// Handles for the maintenance task.
    pub fn shared(&self) -> (SharedClient, Arc<LinkState>) {
        (Arc::clone(&self.client), Arc::clone(&self.link))
    }
}

impl Telemetry for MqttTelemetry {
    fn publish(&mut self, topic: Topic, payload: &str) -> Result<(), TelemetryError> {
        if !self.link.connected.load(Ordering::SeqCst) {
            return Err(TelemetryError::NotConnected);
        }

        let mut client = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        // `enqueue` hands the message to the client task without waiting on the socket.
        client
            .enqueue(topic.path(), QoS::AtMostOnce, false, payload.as_bytes())
            .map(|_| ())
            .map_err(|e| TelemetryError::Publish {
                topic: topic.path(),
                reason: e.to_string(),
            })
    }
}

/// Subscribe to the control topic if the link came (back) up since the last call.
pub fn ensure_subscribed(client: &SharedClient, link: &LinkState) {
    if !link.connected.load(Ordering::SeqCst) || link.subscribed.load(Ordering::SeqCst) {
        return;
    }

    let mut client = client.lock().unwrap_or_else(PoisonError::into_inner);
    match client.subscribe(TOPIC_CONTROL, QoS::AtMostOnce) {
        Ok(_) => {
            link.subscribed.store(true, Ordering::SeqCst);
            log::info!("Subscribed to {}", TOPIC_CONTROL);
        }
        Err(e) => log::warn!("Subscribe to {} failed: {}", TOPIC_CONTROL, e),
    }
}
