//! colwire CLI
//!
//! Encode and decode wire primitives by hand, and inspect captured
//! compressed block streams.

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colwire::io::{BlockHeader, SocketReader, SocketWriter};
use colwire::{BinaryDeserializer, BinaryReader, BinarySerializer};
use tracing_subscriber::{fmt, EnvFilter};

/// colwire CLI
#[derive(Parser, Debug)]
#[command(name = "colwire-cli")]
#[command(about = "Inspect the colwire binary encoding")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a value and print its bytes as hex
    Encode {
        /// Primitive type
        #[arg(value_enum)]
        kind: Kind,

        /// Value to encode
        value: String,
    },

    /// Decode hex bytes as a primitive
    Decode {
        /// Primitive type
        #[arg(value_enum)]
        kind: Kind,

        /// Encoded bytes, e.g. "ac02" or "ac 02"
        hex: String,
    },

    /// List the compressed blocks in a captured stream
    Blocks {
        /// File holding raw block bytes
        file: PathBuf,

        /// Receive buffer size in bytes
        #[arg(short, long, default_value = "65536")]
        buffer: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Varint,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,colwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    match args.command {
        Commands::Encode { kind, value } => {
            let bytes = encode(kind, &value)?;
            println!("{}", to_hex(&bytes));
        }
        Commands::Decode { kind, hex } => {
            let bytes = parse_hex(&hex)?;
            let (value, trailing) = decode(kind, &bytes)?;
            println!("{}", value);
            if trailing > 0 {
                tracing::warn!("{} trailing bytes not consumed", trailing);
            }
        }
        Commands::Blocks { file, buffer } => scan_blocks(&file, buffer)?,
    }
    Ok(())
}

fn encode(kind: Kind, value: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut ser = BinarySerializer::new(SocketWriter::new(Vec::new(), 64), false);
    match kind {
        Kind::Varint => ser.write_var_int(value.parse()?)?,
        Kind::Int16 => ser.write_short_le(value.parse()?)?,
        Kind::Int32 => ser.write_int_le(value.parse()?)?,
        Kind::Int64 => ser.write_long_le(value.parse()?)?,
        Kind::Float32 => ser.write_float_le(value.parse()?)?,
        Kind::Float64 => ser.write_double_le(value.parse()?)?,
        Kind::Bool => ser.write_boolean(value.parse()?)?,
        Kind::String => ser.write_utf8_binary(value)?,
    }
    ser.flush(true)?;
    Ok(ser.into_inner().into_inner())
}

/// Returns the decoded value and the number of bytes left over
fn decode(kind: Kind, bytes: &[u8]) -> Result<(String, usize), Box<dyn Error>> {
    let mut de = BinaryDeserializer::new(SocketReader::new(bytes, bytes.len()), false);
    let value = match kind {
        Kind::Varint => de.read_var_int()?.to_string(),
        Kind::Int16 => de.read_short_le()?.to_string(),
        Kind::Int32 => de.read_int_le()?.to_string(),
        Kind::Int64 => de.read_long_le()?.to_string(),
        Kind::Float32 => de.read_float_le()?.to_string(),
        Kind::Float64 => de.read_double_le()?.to_string(),
        Kind::Bool => de.read_boolean()?.to_string(),
        Kind::String => format!("{:?}", de.read_utf8_binary()?),
    };
    let reader = de.into_inner();
    let trailing = reader.buffered() + reader.get_ref().len();
    Ok((value, trailing))
}

fn scan_blocks(path: &Path, buffer: usize) -> Result<(), Box<dyn Error>> {
    let mut reader = SocketReader::new(File::open(path)?, buffer);
    let mut count = 0usize;
    let mut corrupt = 0usize;

    loop {
        let header = match BlockHeader::read_from(&mut reader) {
            Ok(header) => header,
            Err(e) if e.is_eof() => break,
            Err(e) => return Err(e.into()),
        };
        let mut payload = vec![0u8; header.payload_len()];
        reader.read_exact(&mut payload)?;

        let status = match header.decode_payload(&payload) {
            Ok(_) => "ok".to_string(),
            Err(e) => {
                corrupt += 1;
                e.to_string()
            }
        };
        println!(
            "block {}: method={:?} compressed={} uncompressed={} checksum={:08x} {}",
            count,
            header.method,
            header.compressed_size,
            header.uncompressed_size,
            header.checksum,
            status
        );
        count += 1;
    }

    println!("{} blocks, {} corrupt", count, corrupt);
    Ok(())
}

fn parse_hex(hex: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let digits: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_ascii() || digits.len() % 2 != 0 {
        return Err(format!("not a hex byte string: {:?}", hex).into());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| Box::new(e) as Box<dyn Error>)
        })
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
