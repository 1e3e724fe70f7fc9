use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write as _};
use tracing::info;

use attr_catalog::{AttrShape, AttrValue, AttributeKind, ScalarKind, ScalarValue};
use mock_device::{AttrReading, MockDevice, COMMAND_NAMES};

#[derive(Parser, Debug)]
#[command(
    name = "mockdev",
    version,
    about = "Exercise the mock control-system device",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List catalogued attributes and device commands
    List,
    /// Read one attribute
    Read {
        /// Attribute name (case-sensitive)
        attr: String,
    },
    /// Write one attribute, then read it back
    Write {
        /// Attribute name (case-sensitive)
        attr: String,
        /// Scalar literal; spectra comma-separated; image rows ';'-separated
        value: String,
    },
    /// Invoke a device command
    Invoke {
        /// ChangeState, ChangeShortScalarROQuality or Reset
        command: String,
        /// Optional string argument
        arg: Option<String>,
    },
    /// Print device state and status
    State,
    /// Interactive session against one device instance
    Repl,
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let (device, _config) = MockDevice::with_in_memory_config();

    match cli.command {
        Commands::List => cmd_list(&device),
        Commands::Read { attr } => cmd_read(&device, &attr),
        Commands::Write { attr, value } => cmd_write(&device, &attr, &value),
        Commands::Invoke { command, arg } => cmd_invoke(&device, &command, arg.as_deref()),
        Commands::State => cmd_state(&device),
        Commands::Repl => repl(&device),
    }
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn cmd_list(device: &MockDevice) -> Result<()> {
    println!(
        "{:<20} {:<16} {:<8} {:<11} unit",
        "attribute", "shape", "type", "access"
    );
    for kind in device.catalog().iter() {
        let access = if kind.is_writable() { "read-write" } else { "read-only" };
        println!(
            "{:<20} {:<16} {:<8} {:<11} {:?}",
            kind.name(),
            kind.shape().to_string(),
            kind.value_type().to_string(),
            access,
            kind.unit()
        );
    }
    println!("\ncommands: {}", COMMAND_NAMES.join(", "));
    Ok(())
}

fn cmd_read(device: &MockDevice, attr: &str) -> Result<()> {
    let reading = device.read(attr)?;
    print_reading(attr, &reading)
}

fn cmd_write(device: &MockDevice, attr: &str, raw: &str) -> Result<()> {
    let kind = device
        .catalog()
        .lookup(attr)
        .ok_or_else(|| anyhow!("no such attribute: {attr}"))?;
    let value = parse_value(kind, raw)?;
    device.write(attr, value)?;
    let reading = device.read(attr)?;
    print_reading(attr, &reading)
}

fn cmd_invoke(device: &MockDevice, command: &str, arg: Option<&str>) -> Result<()> {
    device.invoke(command, arg)?;
    info!("invoked {command}");
    cmd_state(device)
}

fn cmd_state(device: &MockDevice) -> Result<()> {
    println!("{}", device.state());
    println!("{}", device.status());
    Ok(())
}

#[derive(Serialize)]
struct ReadingRecord<'a> {
    attribute: &'a str,
    value: &'a AttrValue,
    quality: String,
    timestamp: Option<String>,
}

fn print_reading(attr: &str, reading: &AttrReading) -> Result<()> {
    let record = ReadingRecord {
        attribute: attr,
        value: &reading.value,
        quality: reading.quality.to_string(),
        timestamp: reading.timestamp.to_rfc3339(),
    };
    println!("{}", serde_json::to_string(&record)?);
    Ok(())
}

/// Parse a raw literal into a value matching the attribute's declared kind
/// and shape. Spectra are comma-separated; images are ';'-separated rows of
/// comma-separated elements.
fn parse_value(kind: &AttributeKind, raw: &str) -> Result<AttrValue> {
    match kind.shape() {
        AttrShape::Scalar => Ok(AttrValue::Scalar(parse_scalar(
            kind.value_type(),
            raw.trim(),
        )?)),
        AttrShape::Spectrum { .. } => {
            Ok(AttrValue::Spectrum(parse_elements(kind.value_type(), raw)?))
        }
        AttrShape::Image { .. } => {
            let rows = raw
                .split(';')
                .map(|row| parse_elements(kind.value_type(), row))
                .collect::<Result<Vec<_>>>()?;
            Ok(AttrValue::Image(rows))
        }
    }
}

fn parse_elements(kind: ScalarKind, raw: &str) -> Result<Vec<ScalarValue>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|token| parse_scalar(kind, token.trim()))
        .collect()
}

fn parse_scalar(kind: ScalarKind, token: &str) -> Result<ScalarValue> {
    let value = match kind {
        ScalarKind::Bool => ScalarValue::Bool(
            token
                .parse()
                .with_context(|| format!("not a boolean: {token:?}"))?,
        ),
        ScalarKind::Short => ScalarValue::Short(
            token
                .parse()
                .with_context(|| format!("not a short: {token:?}"))?,
        ),
        ScalarKind::Float => ScalarValue::Float(
            token
                .parse()
                .with_context(|| format!("not a float: {token:?}"))?,
        ),
        ScalarKind::Double => ScalarValue::Double(
            token
                .parse()
                .with_context(|| format!("not a double: {token:?}"))?,
        ),
        ScalarKind::Str => ScalarValue::Str(token.to_string()),
        ScalarKind::UChar => ScalarValue::UChar(
            token
                .parse()
                .with_context(|| format!("not a uchar: {token:?}"))?,
        ),
    };
    Ok(value)
}

const REPL_HELP: &str = "\
commands:
  list                      show attributes and device commands
  read <attr>               read one attribute
  write <attr> <value>      write one attribute (value syntax as in 'mockdev write')
  invoke <command> [arg]    run a device command
  state                     show device state and status
  quit                      leave the session";

fn repl(device: &MockDevice) -> Result<()> {
    println!("mock device session; 'help' lists commands");
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("mockdev> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let (verb, rest) = match input.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (input, ""),
        };
        let outcome = match verb {
            "quit" | "exit" => break,
            "help" => {
                println!("{REPL_HELP}");
                Ok(())
            }
            "list" => cmd_list(device),
            "state" => cmd_state(device),
            "read" => cmd_read(device, rest),
            "write" => match rest.split_once(char::is_whitespace) {
                Some((attr, raw)) => cmd_write(device, attr, raw.trim()),
                None => Err(anyhow!("usage: write <attr> <value>")),
            },
            "invoke" => match rest.split_once(char::is_whitespace) {
                Some((command, arg)) => cmd_invoke(device, command, Some(arg.trim())),
                None if !rest.is_empty() => cmd_invoke(device, rest, None),
                None => Err(anyhow!("usage: invoke <command> [arg]")),
            },
            other => Err(anyhow!("unknown command: {other} (try 'help')")),
        };
        if let Err(err) = outcome {
            println!("error: {err:#}");
        }
    }
    Ok(())
}
