pub mod cli;

use std::fmt::Display;
use std::{io, process};

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells::Bash};
use json::{object, JsonValue};
use log::{error, info, warn};

use rfplayer_lib::port;
use rfplayer_lib::protocol::{spawn_listener, FrequencyBand, RfPlayer, StatusCategory, StatusFormat};
use rfplayer_lib::{decode_status, ParrotDevice};

use cli::{Cli, Commands};

enum OutputFormat {
    Plain,
    Json,
}

fn slice_to_column<T>(data: &[T]) -> String
where
    T: Display,
{
    data.iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join("\n")
}

fn device_to_json(device: &ParrotDevice) -> JsonValue {
    object! {
        id: device.id,
        name: device.name.as_str(),
        protocol: device.protocol.as_str()
    }
}

fn cmd_ping(rf: &mut RfPlayer) -> Result<String> {
    rf.ping()?;
    Ok("PONG".to_string())
}

fn cmd_emit(rf: &mut RfPlayer, protocol: &str, ids: &[u32], action: &str) -> Result<String> {
    let res = ids
        .iter()
        .map(|&id| {
            rf.emit_signal(protocol, id, action)
                .with_context(|| format!("Failed to emit {} to {} id {}", action, protocol, id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(slice_to_column(
        &res.into_iter()
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>(),
    ))
}

fn cmd_freq(rf: &mut RfPlayer, band: FrequencyBand, freq: i32) -> Result<String> {
    if freq >= 0 && !band.is_nominal(freq) {
        warn!(
            "{} is not a nominal frequency for band {} (expected one of {:?})",
            freq,
            band,
            band.nominal_frequencies()
        );
    }
    rf.set_frequency(band, freq)
}

fn cmd_status(
    rf: &mut RfPlayer,
    category: Option<StatusCategory>,
    format: Option<StatusFormat>,
) -> Result<String> {
    let raw = rf.get_status(category, format)?;
    Ok(decode_status(&raw, format.unwrap_or_default())?.to_string())
}

fn cmd_parrot(rf: &mut RfPlayer, fmt: OutputFormat) -> Result<String> {
    let mut devices = rf.parrot_devices()?;
    devices.sort_by_key(|device| device.id);

    Ok(match fmt {
        OutputFormat::Plain => slice_to_column(
            &devices
                .iter()
                .map(|d| format!("{:4} {:<10} {}", d.id, d.protocol, d.name))
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Json => {
            json::stringify(devices.iter().map(device_to_json).collect::<Vec<_>>())
        }
    })
}

fn cmd_factory_reset(rf: &mut RfPlayer, all: bool) -> Result<String> {
    rf.factory_reset(all)?;
    Ok("OK".to_string())
}

fn cmd_listen(port_name: &str, baudrate: u32, force: bool) -> Result<String> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let stream = port::open_port_async(port_name, baudrate, force)?;
        let listener = spawn_listener(stream, |frame| println!("{}", frame));

        info!("listening, press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        listener.close().await?;

        Ok::<_, anyhow::Error>(String::new())
    })
}

fn run_command(rf: &mut RfPlayer, command: Commands, fmt: OutputFormat) -> Result<String> {
    match command {
        Commands::Ping => cmd_ping(rf),
        Commands::Hello => rf.hello(),
        Commands::Emit {
            protocol,
            ids,
            action,
        } => cmd_emit(rf, &protocol, &ids, &action),
        Commands::Learn {
            id,
            action,
            metadata,
        } => rf.record_signal(id, &action, &metadata),
        Commands::Freq { band, freq } => cmd_freq(rf, band, freq),
        Commands::Receiver { protocols } => rf.enable_receiver(&protocols),
        Commands::Format { format } => rf.set_format(&format),
        Commands::Status { category, format } => cmd_status(rf, category, format),
        Commands::Parrot => cmd_parrot(rf, fmt),
        Commands::Remap { protocol, start_id } => rf.parrot_remapping(&protocol, start_id),
        Commands::FactoryReset { all } => cmd_factory_reset(rf, all),
        _ => Err(anyhow!("unexpected command (this is a bug!)")),
    }
}

fn do_main() -> Result<String> {
    if std::env::var("GENERATE_COMPLETION").is_ok() {
        generate(
            Bash,
            &mut cli::Cli::command(),
            "rfplayer-tool",
            &mut io::stdout(),
        );

        return Ok(String::default());
    }

    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if cli.debug {
        "debug"
    } else {
        "info"
    }))
    .format_timestamp(None)
    .format_target(false)
    .init();

    let fmt = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Plain
    };

    match cli.command {
        Commands::Listen => cmd_listen(&cli.port, cli.baudrate, cli.force),
        command => {
            let mut rf = RfPlayer::open(&cli.port, cli.baudrate, cli.force)?;
            let res = run_command(&mut rf, command, fmt);
            rf.close();
            res
        }
    }
}

fn main() {
    match do_main() {
        Ok(s) if s.is_empty() => (),
        Ok(s) => println!("{}", s),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}
