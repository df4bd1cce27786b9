//! Command-line helper for the inverter node's LoRaWAN command interface.
//!
//! Builds downlink payloads to schedule on the network server and decodes the
//! response uplinks the node sends back.

mod payload;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use colored::Colorize;

use inverter_lorawan_node::commands::{
    parse_response, serialise_command, Command, CommandParser, COMMAND_TABLE,
};
use payload::{describe_command, describe_response, format_hex, parse_hex, parse_port};

#[derive(Parser)]
#[command(name = "node-cmd")]
#[command(about = "Encode downlink commands and decode responses of the inverter LoRaWAN node")]
struct Args {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build a downlink command
    Encode {
        #[command(subcommand)]
        command: EncodeCommand,
    },

    /// Decode a response uplink
    Decode {
        /// Uplink fPort (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_port)]
        port: u8,

        /// Payload as hex
        payload: String,
    },

    /// Check a downlink the way the node parses it
    Check {
        /// Downlink fPort (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_port)]
        port: u8,

        /// Payload as hex
        payload: String,
    },

    /// List the supported commands
    Table,
}

#[derive(Subcommand)]
enum EncodeCommand {
    /// Request the node's date and time
    GetDatetime,

    /// Set the node clock (defaults to the current time)
    SetDatetime {
        /// Unix timestamp
        unix_time: Option<u32>,
    },

    /// Set the sleep interval
    SetSleep { seconds: u16 },

    /// Set the sleep interval used while the battery is weak
    SetSleepLong { seconds: u16 },

    /// Request the sleep interval configuration
    GetConfig,

    /// Request battery voltage and status flags
    GetStatus,

    /// Request the status uplink interval
    GetStatusInterval,

    /// Set the status uplink interval in frames (0 = off)
    SetStatusInterval { frames: u8 },
}

impl EncodeCommand {
    fn into_command(self) -> anyhow::Result<Command> {
        let command = match self {
            EncodeCommand::GetDatetime => Command::GetDateTime,
            EncodeCommand::SetDatetime { unix_time } => Command::SetDateTime {
                unix_time: match unix_time {
                    Some(t) => t,
                    None => current_unix_time()?,
                },
            },
            EncodeCommand::SetSleep { seconds } => Command::SetSleepInterval { seconds },
            EncodeCommand::SetSleepLong { seconds } => Command::SetSleepIntervalLong { seconds },
            EncodeCommand::GetConfig => Command::GetLwConfig,
            EncodeCommand::GetStatus => Command::GetLwStatus,
            EncodeCommand::GetStatusInterval => Command::GetStatusInterval,
            EncodeCommand::SetStatusInterval { frames } => Command::SetStatusInterval { frames },
        };
        Ok(command)
    }
}

fn current_unix_time() -> anyhow::Result<u32> {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    u32::try_from(secs).map_err(|_| anyhow!("current time does not fit in 32 bits"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.action {
        Action::Encode { command } => {
            let command = command.into_command()?;
            let frame = serialise_command(&command);

            println!("{}", describe_command(&command).bold());
            println!("fPort:   {} (0x{:02X})", frame.port, frame.port);
            println!("payload: {}", format_hex(&frame.payload).green());
        }
        Action::Decode { port, payload } => {
            let bytes = parse_hex(&payload)?;
            let response =
                parse_response(port, &bytes).map_err(|e| anyhow!("cannot decode: {:?}", e))?;

            println!("{} on port 0x{:02X}", "Response".bold(), port);
            for line in describe_response(&response) {
                println!("  {}", line);
            }
        }
        Action::Check { port, payload } => {
            let bytes = parse_hex(&payload)?;
            match CommandParser::new().parse(port, &bytes) {
                Ok(command) => {
                    println!("{} {}", "[OK]".green().bold(), describe_command(&command));
                    if let Some(request) = command.uplink_request() {
                        println!("  response expected on port 0x{:02X}", request.port());
                    }
                }
                Err(e) => {
                    println!("{} {:?}", "[REJECTED]".red().bold(), e);
                    std::process::exit(1);
                }
            }
        }
        Action::Table => {
            println!("{}", "Port  Command               Request  Response".bold());
            for d in COMMAND_TABLE.iter() {
                let response = if d.has_response() {
                    format!("{} B", d.response_len)
                } else {
                    "-".to_string()
                };
                println!(
                    "0x{:02X}  {:<20}  {:>5} B  {:>8}",
                    d.id.port(),
                    format!("{:?}", d.id),
                    d.request_len,
                    response
                );
            }
        }
    }

    Ok(())
}
