#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux::is_port_open;
#[cfg(target_os = "macos")]
use macos::is_port_open;
#[cfg(target_os = "windows")]
use windows::is_port_open;

pub use serialport::SerialPort;
pub use tokio_serial::SerialStream;

use anyhow::Result;
use core::time::Duration;
use log::debug;
use serialport::{self, ClearBuffer, SerialPortType};
use std::io::{self, Write};
use thiserror::Error;
use tokio_serial::SerialPortBuilderExt;

use crate::protocol::{read_frame, Transport};

/// Line speed of the RFPlayer USB-UART bridge.
pub const BAUDRATE: u32 = 115200;

/// Silence after which a pending read is reported as end of stream.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum OpenPortError {
    #[error("no rfplayer compatible ports found")]
    NoCompatiblePort,
    #[error("{port_name:?} busy")]
    PortBusy { port_name: String },
}

#[derive(PartialEq)]
struct UsbId(u16, u16);

static COMPATIBLE_IDS: &[UsbId] = &[
    UsbId(0x0403, 0x6001), // FTDI FT232R USB UART (RFP1000)
    UsbId(0x0403, 0x6015), // FTDI FT230X Basic UART
];

/// Blocking serial connection used for command/response exchanges.
///
/// The underlying handle is released when the connection is dropped.
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
}

impl Drop for SerialConnection {
    fn drop(&mut self) {
        debug!("close_port: {}", self.port.name().unwrap_or_default());
    }
}

impl Transport for SerialConnection {
    fn discard_input(&mut self) -> io::Result<()> {
        Ok(self.port.clear(ClearBuffer::Input)?)
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        read_frame(self.port.as_mut())
    }
}

fn resolve_port_name(port_name: &str, force: bool) -> Result<String> {
    let true_name: String = if port_name == "auto" {
        guess_port()?
    } else {
        port_name.to_string()
    };

    if !force && is_port_open(&true_name) {
        return Err(OpenPortError::PortBusy {
            port_name: true_name,
        }
        .into());
    }

    Ok(true_name)
}

pub fn open_port(port_name: &str, baudrate: u32, force: bool) -> Result<SerialConnection> {
    let true_name = resolve_port_name(port_name, force)?;

    let port = serialport::new(&true_name, baudrate)
        .timeout(READ_TIMEOUT)
        .open()?;

    debug!("open_port OK: {} @ {} baud", &true_name, baudrate);
    Ok(SerialConnection { port })
}

pub fn open_port_async(port_name: &str, baudrate: u32, force: bool) -> Result<SerialStream> {
    let true_name = resolve_port_name(port_name, force)?;

    let port = tokio_serial::new(&true_name, baudrate).open_native_async()?;

    debug!("open_port_async OK: {} @ {} baud", &true_name, baudrate);
    Ok(port)
}

fn guess_port() -> Result<String> {
    serialport::available_ports()?
        .into_iter()
        .filter(|info| match &info.port_type {
            SerialPortType::UsbPort(usb_info) => {
                COMPATIBLE_IDS.contains(&UsbId(usb_info.vid, usb_info.pid))
            }
            SerialPortType::Unknown | SerialPortType::PciPort | SerialPortType::BluetoothPort => {
                false
            }
        })
        .map(|info| info.port_name)
        .next()
        .ok_or_else(|| OpenPortError::NoCompatiblePort.into())
}
