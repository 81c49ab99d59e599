pub mod bridge;
pub mod port;
pub mod protocol;
pub mod status;

pub use bridge::{SignalEmitter, SwitchAccessory};
pub use protocol::{ProtocolError, RfPlayer};
pub use status::{decode_status, extract_parrot_devices, NormalizedStatus, ParrotDevice};
