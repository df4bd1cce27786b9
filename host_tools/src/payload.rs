//! Payload parsing and formatting helpers.

use anyhow::{anyhow, bail, Context};
use inverter_lorawan_node::battery::StatusFlags;
use inverter_lorawan_node::commands::{Command, Response};
use inverter_lorawan_node::settings::TimeSource;

/// Parse an fPort given as decimal ("32") or hex ("0x20").
pub fn parse_port(s: &str) -> anyhow::Result<u8> {
    let s = s.trim();
    let port = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    }
    .with_context(|| format!("invalid port '{}'", s))?;

    if port == 0 {
        bail!("port 0 is reserved for MAC commands");
    }
    Ok(port)
}

/// Parse a hex payload, ignoring whitespace, ':' separators and a "0x" prefix.
pub fn parse_hex(s: &str) -> anyhow::Result<Vec<u8>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let digits: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|e| anyhow!("invalid hex payload '{}': {}", s, e))
}

/// Format a payload as space separated hex bytes.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn time_source_name(byte: u8) -> &'static str {
    match TimeSource::from_byte(byte) {
        Some(TimeSource::Gps) => "GPS",
        Some(TimeSource::Rtc) => "RTC",
        Some(TimeSource::Lora) => "LoRaWAN",
        Some(TimeSource::Unsynched) => "unsynched",
        Some(TimeSource::Set) => "set by downlink",
        None => "unknown",
    }
}

/// One-line description of a command.
pub fn describe_command(command: &Command) -> String {
    match command {
        Command::GetDateTime => "get date/time".to_string(),
        Command::SetDateTime { unix_time } => format!("set date/time to {}", unix_time),
        Command::SetSleepInterval { seconds } => format!("set sleep interval to {} s", seconds),
        Command::SetSleepIntervalLong { seconds } => {
            format!("set long sleep interval to {} s", seconds)
        }
        Command::GetLwConfig => "get sleep configuration".to_string(),
        Command::GetLwStatus => "get node status".to_string(),
        Command::GetStatusInterval => "get status interval".to_string(),
        Command::SetStatusInterval { frames: 0 } => "disable status uplinks".to_string(),
        Command::SetStatusInterval { frames } => {
            format!("set status interval to {} frames", frames)
        }
    }
}

/// Field lines for a decoded response.
pub fn describe_response(response: &Response) -> Vec<String> {
    match *response {
        Response::DateTime {
            unix_time,
            time_source,
        } => vec![
            format!("unix time:   {}", unix_time),
            format!(
                "time source: {} (0x{:02X})",
                time_source_name(time_source),
                time_source
            ),
        ],
        Response::LwConfig {
            sleep_interval,
            sleep_interval_long,
        } => vec![
            format!("sleep interval:      {} s", sleep_interval),
            format!("long sleep interval: {} s", sleep_interval_long),
        ],
        Response::LwStatus { battery_mv, flags } => {
            let flags = StatusFlags::from_bits(flags);
            vec![
                format!("battery:    {} mV", battery_mv),
                format!("long sleep: {}", flags.long_sleep()),
                format!("battery low: {}", flags.battery_low()),
            ]
        }
        Response::StatusInterval { frames: 0 } => vec!["status interval: disabled".to_string()],
        Response::StatusInterval { frames } => {
            vec![format!("status interval: {} frames", frames)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("32").unwrap(), 0x20);
        assert_eq!(parse_port("0x38").unwrap(), 0x38);
        assert_eq!(parse_port(" 0X41 ").unwrap(), 0x41);
        assert!(parse_port("0").is_err());
        assert!(parse_port("256").is_err());
        assert!(parse_port("0xZZ").is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("12345678").unwrap(), vec![0x12, 0x34, 0x56, 0x78]);
        assert_eq!(parse_hex("0x0258").unwrap(), vec![0x02, 0x58]);
        assert_eq!(parse_hex("0e 74 00").unwrap(), vec![0x0E, 0x74, 0x00]);
        assert_eq!(parse_hex("0E:74").unwrap(), vec![0x0E, 0x74]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert!(parse_hex("123").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x00, 0x01, 0x68]), "00 01 68");
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn test_time_source_name() {
        assert_eq!(time_source_name(0x01), "RTC");
        assert_eq!(time_source_name(0x08), "set by downlink");
        assert_eq!(time_source_name(0x03), "unknown");
    }

    #[test]
    fn test_describe_status() {
        let lines = describe_response(&Response::LwStatus {
            battery_mv: 3400,
            flags: 0x01,
        });
        assert_eq!(lines[0], "battery:    3400 mV");
        assert_eq!(lines[1], "long sleep: true");
        assert_eq!(lines[2], "battery low: false");
    }

    #[test]
    fn test_describe_command() {
        assert_eq!(
            describe_command(&Command::SetSleepInterval { seconds: 600 }),
            "set sleep interval to 600 s"
        );
        assert_eq!(
            describe_command(&Command::SetStatusInterval { frames: 0 }),
            "disable status uplinks"
        );
    }
}
