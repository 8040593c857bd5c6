//! Fake generator binary - prints synthetic NALU events
//!
//! Usage:
//!   cargo run --bin nalu_fake_generator                         # Defaults
//!   cargo run --bin nalu_fake_generator -- -m 0x3 -w 4 --square # Bench scenario
//!   cargo run --bin nalu_fake_generator -- -n 10 --seed 1 --json

use clap::Parser;
use nalu_fake_rs::common::GeneratorArgs;
use nalu_fake_rs::generator::{Generator, SquareWave};
use nalu_fake_rs::Event;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Bytes dumped from the start of each event
const HEAD_DUMP_BYTES: usize = 252;
/// Bytes dumped from the end of each event
const TAIL_DUMP_BYTES: usize = 50;

/// Fake generator - prints synthetic NALU events
#[derive(Parser, Debug)]
#[command(name = "nalu_fake_generator", about = "NALU fake event generator")]
struct Args {
    #[command(flatten)]
    generator: GeneratorArgs,

    /// Number of events to generate
    #[arg(short = 'n', long, default_value = "3")]
    events: u32,

    /// Drive every active channel with a square wave instead of noise
    #[arg(long)]
    square: bool,

    /// Print one JSON object per event instead of hex dumps
    #[arg(long)]
    json: bool,
}

fn hex_dump(bytes: &[u8], base: usize) {
    for (row, chunk) in bytes.chunks(4).enumerate() {
        let line: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        println!("{:06x}: {}", base + row * 4, line.join(" "));
    }
}

fn print_event(event: &Event, bytes: &[u8]) {
    println!(
        "Event {}, Packets: {}, Size: {} bytes, Timestamp: {}",
        event.header.index,
        event.header.num_packets,
        bytes.len(),
        event.header.reference_time
    );

    let head = bytes.len().min(HEAD_DUMP_BYTES);
    println!("Serialized Event Buffer (First {head} bytes):");
    hex_dump(&bytes[..head], 0);

    let tail = bytes.len().min(TAIL_DUMP_BYTES);
    let tail_start = bytes.len() - tail;
    println!("Serialized Event Buffer (Last {tail} bytes):");
    hex_dump(&bytes[tail_start..], tail_start);
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nalu_fake_rs=info".parse()?))
        .init();

    let args = Args::parse();
    let config = args.generator.to_config();

    let mut generator = match args.generator.seed {
        Some(seed) => Generator::with_seed(config.clone(), seed),
        None => Generator::new(config.clone()),
    };

    if args.square {
        for channel in config.active_channels() {
            generator.set_generator(channel, SquareWave::default());
        }
    }

    info!(
        channels = ?config.active_channels(),
        num_windows = config.num_windows,
        events = args.events,
        "Generator ready"
    );

    for _ in 0..args.events {
        let event = generator.next_event();
        let mut buffer = vec![0u8; event.size()];
        let written = event.serialize_into(&mut buffer)?;
        let timing = generator.next_timing_snapshot();

        if args.json {
            let summary = serde_json::json!({
                "index": event.header.index,
                "num_packets": event.header.num_packets,
                "reference_time": event.header.reference_time,
                "size": written,
                "timing": timing,
            });
            println!("{summary}");
        } else {
            print_event(&event, &buffer[..written]);
            println!("\nTiming Data:\n{}\n", serde_json::to_string_pretty(&timing)?);
        }
    }

    Ok(())
}
