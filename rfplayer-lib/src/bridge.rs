use anyhow::anyhow;
use log::{debug, info};
use std::sync::{Arc, Mutex};

use crate::protocol::Result;
use crate::status::ParrotDevice;

/// Anything able to transmit an RF signal for a device.
pub trait SignalEmitter: Send {
    fn emit_signal(&mut self, protocol: &str, id: u32, action: &str) -> Result<String>;
}

/// On/off switch backed by one learned parrot device.
///
/// Every state change becomes exactly one emitted signal. Switches sharing
/// an emitter take turns on it, so exchanges on the connection never overlap.
pub struct SwitchAccessory<E: SignalEmitter> {
    device: ParrotDevice,
    emitter: Arc<Mutex<E>>,
}

impl<E: SignalEmitter> SwitchAccessory<E> {
    pub fn new(device: ParrotDevice, emitter: Arc<Mutex<E>>) -> Self {
        SwitchAccessory { device, emitter }
    }

    pub fn device(&self) -> &ParrotDevice {
        &self.device
    }

    pub fn set_on(&self, on: bool) -> Result<()> {
        let action = if on { "ON" } else { "OFF" };
        info!("{} ({}): {}", self.device.name, self.device.id, action);

        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| anyhow!("signal emitter lock poisoned"))?;
        let response = emitter.emit_signal(&self.device.protocol, self.device.id, action)?;
        debug!("emit response {:?}", response);
        Ok(())
    }
}

/// One switch per learned device, all sharing `emitter`.
pub fn accessories<E: SignalEmitter>(
    devices: Vec<ParrotDevice>,
    emitter: Arc<Mutex<E>>,
) -> Vec<SwitchAccessory<E>> {
    devices
        .into_iter()
        .map(|device| SwitchAccessory::new(device, emitter.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::mock::MockTransport;
    use crate::protocol::RfPlayer;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, u32, String)>,
    }

    impl SignalEmitter for Recorder {
        fn emit_signal(&mut self, protocol: &str, id: u32, action: &str) -> Result<String> {
            self.calls
                .push((protocol.to_string(), id, action.to_string()));
            Ok(String::new())
        }
    }

    struct Failing;

    impl SignalEmitter for Failing {
        fn emit_signal(&mut self, _protocol: &str, _id: u32, _action: &str) -> Result<String> {
            Err(anyhow!("port gone"))
        }
    }

    fn lamp() -> ParrotDevice {
        ParrotDevice {
            id: 1,
            name: "Lamp".to_string(),
            protocol: "X10".to_string(),
        }
    }

    #[test]
    fn toggle_emits_on_off() {
        let emitter = Arc::new(Mutex::new(Recorder::default()));
        let switch = SwitchAccessory::new(lamp(), emitter.clone());

        switch.set_on(true).unwrap();
        switch.set_on(false).unwrap();

        assert_eq!(
            emitter.lock().unwrap().calls,
            vec![
                ("X10".to_string(), 1, "ON".to_string()),
                ("X10".to_string(), 1, "OFF".to_string())
            ]
        );
    }

    #[test]
    fn emitter_error_reported_once() {
        let switch = SwitchAccessory::new(lamp(), Arc::new(Mutex::new(Failing)));
        assert!(switch.set_on(true).is_err());
    }

    #[test]
    fn accessories_share_client() {
        let devices = vec![
            lamp(),
            ParrotDevice {
                id: 2,
                name: "Fan".to_string(),
                protocol: "VISONIC".to_string(),
            },
        ];
        let client = Arc::new(Mutex::new(RfPlayer::new(MockTransport::new())));
        let switches = accessories(devices, client.clone());

        assert_eq!(switches.len(), 2);
        switches[1].set_on(true).unwrap();
        switches[0].set_on(false).unwrap();

        assert_eq!(
            client.lock().unwrap().transport.sent_text(),
            vec!["ZIA++ON ID 2 VISONIC\r", "ZIA++OFF ID 1 X10\r"]
        );
    }
}
