use itertools::Itertools;
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// A verb followed by positional arguments, rendered space separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: String,
    args: Vec<String>,
}

impl Command {
    pub fn new(verb: impl Into<String>) -> Self {
        Command {
            verb: verb.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args<I>(self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        args.into_iter().fold(self, |cmd, arg| cmd.arg(arg))
    }

    /// Free text argument, wrapped in square brackets.
    pub fn bracketed(self, text: &str) -> Self {
        self.arg(format!("[{}]", text))
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            self.verb.fmt(f)
        } else {
            write!(f, "{} {}", self.verb, self.args.iter().join(" "))
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseTagError {
    #[error("invalid status category '{0}'")]
    BadCategory(String),
    #[error("invalid status format '{0}'")]
    BadFormat(String),
    #[error("invalid frequency band '{0}'")]
    BadBand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCategory {
    #[default]
    System,
    Radio,
    Transcoder,
    Parrot,
    Alarm,
}

impl Display for StatusCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusCategory::System => "SYSTEM".fmt(f),
            StatusCategory::Radio => "RADIO".fmt(f),
            StatusCategory::Transcoder => "TRANSCODER".fmt(f),
            StatusCategory::Parrot => "PARROT".fmt(f),
            StatusCategory::Alarm => "ALARM".fmt(f),
        }
    }
}

impl FromStr for StatusCategory {
    type Err = ParseTagError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_uppercase().as_str() {
            "SYSTEM" => Ok(StatusCategory::System),
            "RADIO" => Ok(StatusCategory::Radio),
            "TRANSCODER" => Ok(StatusCategory::Transcoder),
            "PARROT" => Ok(StatusCategory::Parrot),
            "ALARM" => Ok(StatusCategory::Alarm),
            _ => Err(ParseTagError::BadCategory(input.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFormat {
    #[default]
    Text,
    Xml,
    Json,
}

impl Display for StatusFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFormat::Text => "TEXT".fmt(f),
            StatusFormat::Xml => "XML".fmt(f),
            StatusFormat::Json => "JSON".fmt(f),
        }
    }
}

impl FromStr for StatusFormat {
    type Err = ParseTagError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(StatusFormat::Text),
            "XML" => Ok(StatusFormat::Xml),
            "JSON" => Ok(StatusFormat::Json),
            _ => Err(ParseTagError::BadFormat(input.to_string())),
        }
    }
}

/// Radio band selected by `FREQ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyBand {
    /// 433 MHz range
    Low,
    /// 868 MHz range
    High,
}

impl FrequencyBand {
    /// Frequencies (kHz) the band accepts. Zero disables the band.
    pub fn nominal_frequencies(&self) -> [i32; 3] {
        match self {
            FrequencyBand::Low => [0, 433420, 433920],
            FrequencyBand::High => [0, 868350, 868950],
        }
    }

    pub fn is_nominal(&self, freq: i32) -> bool {
        self.nominal_frequencies().contains(&freq)
    }
}

impl Display for FrequencyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrequencyBand::Low => "L".fmt(f),
            FrequencyBand::High => "H".fmt(f),
        }
    }
}

impl FromStr for FrequencyBand {
    type Err = ParseTagError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "L" | "l" => Ok(FrequencyBand::Low),
            "H" | "h" => Ok(FrequencyBand::High),
            _ => Err(ParseTagError::BadBand(input.to_string())),
        }
    }
}

/// Highest id addressable as X10: 26 house letters of 16 units each.
pub const X10_MAX_ID: u32 = 16 * 26;

/// Maps an id in `1..=X10_MAX_ID` to an X10 house/unit code, e.g. 17 -> "B1".
pub fn id_to_x10(id: u32) -> Option<String> {
    if !(1..=X10_MAX_ID).contains(&id) {
        return None;
    }

    let house = char::from(b'A' + ((id - 1) / 16) as u8);
    let unit = (id - 1) % 16 + 1;
    Some(format!("{}{}", house, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_without_args() {
        assert_eq!(Command::new("HELLO").to_string(), "HELLO");
    }

    #[test]
    fn command_single_spaces() {
        let cmd = Command::new("ON").arg("ID").arg(12).arg("X10");
        assert_eq!(cmd.to_string(), "ON ID 12 X10");
    }

    #[test]
    fn command_bracketed_metadata() {
        let cmd = Command::new("PARROTLEARN")
            .arg("ID")
            .arg(3)
            .arg("ON")
            .bracketed("living room lamp");
        assert_eq!(cmd.to_string(), "PARROTLEARN ID 3 ON [living room lamp]");
    }

    #[test]
    fn command_arg_list() {
        let cmd = Command::new("RECEIVER").arg("+").args(["X10", "RTS", "BLYSS"]);
        assert_eq!(cmd.to_string(), "RECEIVER + X10 RTS BLYSS");
    }

    #[test]
    fn x10_codes() {
        assert_eq!(id_to_x10(1).as_deref(), Some("A1"));
        assert_eq!(id_to_x10(16).as_deref(), Some("A16"));
        assert_eq!(id_to_x10(17).as_deref(), Some("B1"));
        assert_eq!(id_to_x10(X10_MAX_ID).as_deref(), Some("Z16"));
    }

    #[test]
    fn x10_out_of_range() {
        assert_eq!(id_to_x10(0), None);
        assert_eq!(id_to_x10(X10_MAX_ID + 1), None);
    }

    #[test]
    fn status_tags_case_insensitive() {
        assert_eq!("parrot".parse::<StatusCategory>().unwrap(), StatusCategory::Parrot);
        assert_eq!("Json".parse::<StatusFormat>().unwrap(), StatusFormat::Json);
        assert!("yaml".parse::<StatusFormat>().is_err());
    }

    #[test]
    fn status_defaults() {
        assert_eq!(StatusCategory::default().to_string(), "SYSTEM");
        assert_eq!(StatusFormat::default().to_string(), "TEXT");
    }

    #[test]
    fn band_frequencies() {
        assert!(FrequencyBand::Low.is_nominal(433920));
        assert!(FrequencyBand::High.is_nominal(0));
        assert!(!FrequencyBand::High.is_nominal(433920));
    }
}
