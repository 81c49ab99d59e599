use clap::{Parser, Subcommand};
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp;
use std::ops::Deref;
use std::str::FromStr;
use thiserror::Error;

use rfplayer_lib::port::BAUDRATE;
use rfplayer_lib::protocol::{FrequencyBand, StatusCategory, StatusFormat};

#[derive(Error, Debug)]
pub enum RangeError {
    #[error("invalid range '{0}'")]
    BadRange(String),
}

/// Device ids given as a comma separated list of ids and ranges: `1-4,7`.
#[derive(Debug)]
pub struct IdRange(Vec<u32>);

impl Deref for IdRange {
    type Target = Vec<u32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for IdRange {
    type Err = RangeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^(\d+)(?:-(\d+))?$").unwrap();
        }

        let mut result: Vec<u32> = Vec::new();

        for s in input.split(',') {
            let c = RE
                .captures(s)
                .ok_or_else(|| RangeError::BadRange(s.to_string()))?;
            let bound = |i: usize| -> Result<Option<u32>, RangeError> {
                c.get(i)
                    .map(|m| m.as_str().parse::<u32>())
                    .transpose()
                    .map_err(|_| RangeError::BadRange(s.to_string()))
            };

            match (bound(1)?, bound(2)?) {
                (Some(val), None) => result.push(val),
                (Some(val1), Some(val2)) => {
                    result.extend(cmp::min(val1, val2)..=cmp::max(val1, val2))
                }
                _ => return Err(RangeError::BadRange(s.to_string())),
            }
        }

        result.sort_unstable();
        result.dedup();
        Ok(IdRange(result))
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Skip sanity checks
    #[clap(long, short)]
    pub force: bool,

    /// enable debug output
    #[clap(long, short)]
    pub debug: bool,

    /// Serial device or 'auto'
    #[clap(long, short, default_value = "auto")]
    pub port: String,

    /// UART baud rate
    #[clap(long, short, default_value_t = BAUDRATE)]
    pub baudrate: u32,

    /// Use json-formatted output
    #[clap(long, short)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the device answers
    Ping,

    /// Print the device greeting
    Hello,

    /// Emit a signal to one or more devices
    Emit {
        /// RF protocol, e.g. X10, CHACON, VISONIC
        protocol: String,
        ids: IdRange,
        /// Usually ON or OFF
        action: String,
    },

    /// Learn a remote control signal into parrot memory
    Learn {
        id: u32,
        action: String,
        /// Free text reminder stored with the entry
        metadata: String,
    },

    /// Set the frequency of a band (0 disables it)
    Freq {
        /// L (433 MHz) or H (868 MHz)
        band: FrequencyBand,
        #[clap(allow_hyphen_values = true)]
        freq: i32,
    },

    /// Enable reception of the given protocols
    Receiver {
        #[clap(required = true)]
        protocols: Vec<String>,
    },

    /// Set the format of received frames
    Format { format: String },

    /// Print a status report
    Status {
        /// SYSTEM, RADIO, TRANSCODER, PARROT or ALARM
        category: Option<StatusCategory>,
        /// TEXT, XML or JSON
        format: Option<StatusFormat>,
    },

    /// List learned parrot devices
    #[clap(visible_alias = "devices")]
    Parrot,

    /// Remap parrot entries to ON/OFF commands of a protocol
    Remap { protocol: String, start_id: u32 },

    /// Reset the device to factory settings
    FactoryReset {
        /// Also clear parrot memory and signal settings
        #[clap(long)]
        all: bool,
    },

    /// Print frames pushed by the device until interrupted
    Listen,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_ids() {
        let range: IdRange = "3,1".parse().unwrap();
        assert_eq!(*range, vec![1, 3]);
    }

    #[test]
    fn ranges() {
        let range: IdRange = "1-3,7,5-4".parse().unwrap();
        assert_eq!(*range, vec![1, 2, 3, 4, 5, 7]);
    }

    #[test]
    fn overlapping_ranges() {
        let range: IdRange = "1-3,2".parse().unwrap();
        assert_eq!(*range, vec![1, 2, 3]);
    }

    #[test]
    fn bad_ranges() {
        assert!("".parse::<IdRange>().is_err());
        assert!("1-".parse::<IdRange>().is_err());
        assert!("a".parse::<IdRange>().is_err());
        assert!("99999999999".parse::<IdRange>().is_err());
    }

    #[test]
    fn parse_commands() {
        let args = ["rfplayer-tool", "-p", "/dev/ttyUSB0", "freq", "H", "868950"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.port, "/dev/ttyUSB0");
        assert!(matches!(
            cli.command,
            Commands::Freq {
                band: FrequencyBand::High,
                freq: 868950
            }
        ));
    }

    #[test]
    fn status_arguments_optional() {
        let cli = Cli::try_parse_from(["rfplayer-tool", "status"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Status {
                category: None,
                format: None
            }
        ));
        assert_eq!(cli.baudrate, BAUDRATE);
    }
}
