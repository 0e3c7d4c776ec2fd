//! Replays a canned microcontroller capture through the sensor hub.
//!
//! This example shows how to:
//! 1. Frame raw bytes into protocol lines
//! 2. Feed them through an `Ingestor`, auto-creating sensors
//! 3. Run the periodic processing pass
//! 4. List the registry and print ingestion statistics
//!
//! Run with: cargo run --example replay_demo

use std::io::Cursor;

use sensor_hub::{source::next_line, Ingestor, ValuePolicy};

/// What an Arduino sketch printing two sensors might send, CRLF and all.
const CAPTURE: &[u8] = b"T;T-001;25.6\r\n\
P;P-105;1013\r\n\
T;T-001;18.2\r\n\
T;T-002;22.0\r\n\
X;X-001;1\r\n\
\r\n\
T;T-001;26.1\r\n\
P;P-105;1009\r\n\
P;T-001;1000\r\n\
T;T-002;21.4\r\n";

fn main() {
    println!("Sensor Hub - Replay Demo");
    println!("========================");
    println!();

    let mut ingestor = Ingestor::new(ValuePolicy::Lenient, 5);
    let mut reader = Cursor::new(CAPTURE);
    let mut buf = Vec::new();

    while let Ok(Some(line)) = next_line(&mut reader, &mut buf) {
        if line.is_empty() {
            continue;
        }
        println!("[RX] {line}");

        match ingestor.handle_line(&line) {
            Ok(outcome) if outcome.created => println!(
                "     new {} sensor {}, reading {}",
                outcome.kind, outcome.id, outcome.value
            ),
            Ok(outcome) => println!("     reading {} for {}", outcome.value, outcome.id),
            Err(e) => println!("     skipped: {e}"),
        }

        if let Some(summaries) = ingestor.due_summaries() {
            println!();
            println!("--- Processing ---");
            for summary in &summaries {
                println!("  {summary}");
            }
            println!();
        }
    }

    println!();
    println!("--- Final processing ---");
    for summary in ingestor.process_all() {
        println!("  {summary}");
    }

    println!();
    println!("Registered sensors:");
    for description in ingestor.registry().list_all() {
        println!("  {description}");
    }

    println!();
    println!("{}", ingestor.log().summary());
}
