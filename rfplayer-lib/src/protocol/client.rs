use anyhow::Context;
use log::debug;
use std::{fmt::Display, io};

use super::{
    encode_frame, id_to_x10, strip_reply_prefix, Command, FrequencyBand, ProtocolError, Result,
    StatusCategory, StatusFormat, Transport,
};
use crate::bridge::SignalEmitter;
use crate::port::{self, SerialConnection};
use crate::status::{extract_parrot_devices, ParrotDevice};

/// Command/response client for one RFPlayer connection.
///
/// The protocol carries no correlation ids, so every exchange must be
/// finished before the next one starts. All operations take `&mut self`.
pub struct RfPlayer<T: Transport = SerialConnection> {
    pub(crate) transport: T,
}

impl RfPlayer<SerialConnection> {
    pub fn open(port_name: &str, baudrate: u32, force: bool) -> Result<Self> {
        let connection = port::open_port(port_name, baudrate, force)
            .with_context(|| format!("failed to open serial port {:?}", port_name))?;
        Ok(Self::new(connection))
    }
}

fn transport_error(command: &str, source: io::Error) -> ProtocolError {
    ProtocolError::Transport {
        command: command.to_string(),
        source,
    }
}

fn expect_token(command: &Command, response: String, token: &str) -> Result<()> {
    if response.contains(token) {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedResponse {
            command: command.to_string(),
            response,
        }
        .into())
    }
}

impl<T: Transport> RfPlayer<T> {
    pub fn new(transport: T) -> Self {
        RfPlayer { transport }
    }

    /// Releases the connection.
    pub fn close(self) {
        debug!("closing rfplayer connection");
    }

    /// Sends one command and reads one reply line.
    ///
    /// A device that stays silent until the read timeout yields an empty
    /// string. Asynchronous commands (emit, learn, freq) normally do.
    pub fn send_command(&mut self, command: &Command) -> Result<String> {
        let text = command.to_string();

        self.transport
            .discard_input()
            .map_err(|e| transport_error(&text, e))?;

        debug!("send {:?}", text);
        self.transport
            .write_frame(&encode_frame(command))
            .map_err(|e| transport_error(&text, e))?;

        match self
            .transport
            .read_line()
            .map_err(|e| transport_error(&text, e))?
        {
            Some(line) => Ok(strip_reply_prefix(&String::from_utf8_lossy(&line)).to_string()),
            None => {
                debug!("no reply to {:?}", text);
                Ok(String::new())
            }
        }
    }

    pub fn ping(&mut self) -> Result<()> {
        let cmd = Command::new("PING");
        let response = self
            .send_command(&cmd)
            .context("failed to send PING command")?;
        expect_token(&cmd, response, "PONG")
    }

    pub fn hello(&mut self) -> Result<String> {
        self.send_command(&Command::new("HELLO"))
            .context("failed to send HELLO command")
    }

    /// Transmits `action` (usually ON or OFF) for device `id` of `protocol`.
    pub fn emit_signal(&mut self, protocol: &str, id: u32, action: &str) -> Result<String> {
        self.send_command(&Command::new(action).arg("ID").arg(id).arg(protocol))
    }

    /// Enters learning mode for parrot entry `id`.
    ///
    /// Returns as soon as the command is accepted; learning completes or is
    /// cancelled on the device itself.
    pub fn record_signal(&mut self, id: u32, action: &str, metadata: &str) -> Result<String> {
        self.send_command(
            &Command::new("PARROTLEARN")
                .arg("ID")
                .arg(id)
                .arg(action)
                .bracketed(metadata),
        )
    }

    pub fn set_frequency(&mut self, band: FrequencyBand, freq: i32) -> Result<String> {
        if freq < 0 {
            return Err(ProtocolError::NegativeFrequency(freq).into());
        }
        self.send_command(&Command::new("FREQ").arg(band).arg(freq))
    }

    pub fn enable_receiver<I>(&mut self, protocols: I) -> Result<String>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.send_command(&Command::new("RECEIVER").arg("+").args(protocols))
    }

    /// Selects the format of frames the device pushes on reception.
    pub fn set_format(&mut self, format: &str) -> Result<String> {
        self.send_command(&Command::new("FORMAT").arg(format))
    }

    pub fn get_status(
        &mut self,
        category: Option<StatusCategory>,
        format: Option<StatusFormat>,
    ) -> Result<String> {
        let cmd = Command::new("STATUS")
            .arg(category.unwrap_or_default())
            .arg(format.unwrap_or_default());
        self.send_command(&cmd).context("failed to get status")
    }

    /// Learned parrot entries, fetched as a JSON PARROT status.
    pub fn parrot_devices(&mut self) -> Result<Vec<ParrotDevice>> {
        let status = self
            .get_status(Some(StatusCategory::Parrot), Some(StatusFormat::Json))
            .context("failed to get parrot status")?;
        extract_parrot_devices(&status).context("failed to parse parrot status")
    }

    /// Remaps parrot entries to ON/OFF commands of `protocol`, starting at
    /// the X10 address of `start_id`.
    pub fn parrot_remapping(&mut self, protocol: &str, start_id: u32) -> Result<String> {
        let x10 = id_to_x10(start_id).ok_or(ProtocolError::InvalidX10Id(start_id))?;
        self.send_command(
            &Command::new("REMAPPING")
                .args(["PARROT", "ONOFF", protocol])
                .arg(x10),
        )
    }

    /// With `full`, learned entries and signal settings are cleared as well.
    pub fn factory_reset(&mut self, full: bool) -> Result<()> {
        let cmd = if full {
            Command::new("FACTORYRESET").arg("ALL")
        } else {
            Command::new("FACTORYRESET")
        };

        let response = self
            .send_command(&cmd)
            .context("failed to send factory reset command")?;
        expect_token(&cmd, response, "OK")
    }
}

impl<T: Transport> SignalEmitter for RfPlayer<T> {
    fn emit_signal(&mut self, protocol: &str, id: u32, action: &str) -> Result<String> {
        RfPlayer::emit_signal(self, protocol, id, action)
    }
}
