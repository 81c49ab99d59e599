mod client;
mod command;
mod listener;
#[cfg(test)]
pub(crate) mod mock;

use log::{debug, warn};
use std::io::{self, Read};
use thiserror::Error;

pub use anyhow::Result;
pub use client::RfPlayer;
pub use command::{
    id_to_x10, Command, FrequencyBand, ParseTagError, StatusCategory, StatusFormat, X10_MAX_ID,
};
pub use listener::{spawn_listener, Listener};

/// Prefix of every frame sent to the device.
pub const COMMAND_PREFIX: &str = "ZIA++";

/// Prefix the device puts in front of its replies. Some firmwares omit it.
pub const REPLY_PREFIX: &str = "ZIA--";

pub const TERMINATOR: u8 = b'\r';

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("transport failure on {command:?}")]
    Transport {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("unexpected response to {command}: {response:?}")]
    UnexpectedResponse { command: String, response: String },
    #[error("malformed status payload")]
    MalformedPayload(#[source] json::Error),
    #[error("invalid parrot status format")]
    InvalidFormat,
    #[error("freq must be non-negative, got {0}")]
    NegativeFrequency(i32),
    #[error("id {0} has no x10 equivalent")]
    InvalidX10Id(u32),
}

/// Line-oriented byte channel to the device.
///
/// `read_line` returns `Ok(None)` when nothing (more) is coming: the read
/// timed out or the stream ended. Only genuine failures are errors.
pub trait Transport: Send {
    fn discard_input(&mut self) -> io::Result<()>;
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()>;
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>>;
}

pub fn encode_frame(command: &Command) -> Vec<u8> {
    let mut frame = format!("{}{}", COMMAND_PREFIX, command).into_bytes();
    frame.push(TERMINATOR);
    frame
}

/// Strips one reply prefix, if any, and surrounding whitespace.
pub fn strip_reply_prefix(line: &str) -> &str {
    line.strip_prefix(REPLY_PREFIX).unwrap_or(line).trim()
}

/// Reads bytes up to the terminator, which is not included in the result.
pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) if byte[0] == TERMINATOR => {
                debug!("recv {:?}", String::from_utf8_lossy(&line));
                return Ok(Some(line));
            }
            Ok(_) => line.push(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                if !line.is_empty() {
                    warn!(
                        "discarding partial frame {:?}",
                        String::from_utf8_lossy(&line)
                    );
                }
                return Ok(None);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
