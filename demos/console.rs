//! Interactive console over an in-memory song
//!
//! Type messages such as `/live/track/get/name 0` or
//! `/live/track/start_listen/volume 0`, one per line. Replies and
//! notifications are printed as they arrive.

use live_osc_bridge::memory::{MemoryChain, MemoryDevice, MemorySong, MemoryTrack};
use live_osc_bridge::{BridgeConfig, LiveBridge, OscMessage, RoutingOption, RoutingSlot, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

fn demo_song() -> Arc<MemorySong> {
    let rack = MemoryDevice::rack("Drum Rack")
        .with_chain(MemoryChain::new("Kick").with_device(MemoryDevice::new("Saturator")))
        .with_chain(MemoryChain::new("Snare").with_device(MemoryDevice::new("Reverb")));

    MemorySong::new()
        .with_track(
            MemoryTrack::new("Drums")
                .with_device(rack)
                .with_sends(2)
                .with_clip_slot(Some("Groove"))
                .with_clip_slot(None::<&str>),
        )
        .with_track(
            MemoryTrack::new("Bass")
                .with_device(MemoryDevice::new("Operator"))
                .with_routings(
                    RoutingSlot::OutputType,
                    vec![RoutingOption::new("Master", 1), RoutingOption::new("Sends Only", 2)],
                ),
        )
        .into_arc()
}

fn parse_line(line: &str) -> Option<OscMessage> {
    let mut parts = line.split_whitespace();
    let address = parts.next()?;
    let args = parts
        .map(|token| {
            if token == "*" {
                Value::from(token)
            } else if let Ok(i) = token.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(f) = token.parse::<f64>() {
                Value::Float(f)
            } else {
                Value::from(token)
            }
        })
        .collect();
    Some(OscMessage::new(address).with_args(args))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (bridge, mut outbound) = LiveBridge::new(demo_song(), BridgeConfig::default());
    let bridge = Arc::new(bridge);
    println!("{} addresses registered", bridge.address_count());

    let (tx, rx) = mpsc::unbounded_channel();
    let server = {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.serve(rx).await })
    };

    tokio::spawn(async move {
        while let Ok(message) = outbound.recv().await {
            println!("<- {}", message);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "quit" {
            break;
        }
        if let Some(message) = parse_line(&line) {
            tx.send(message)?;
        }
    }

    drop(tx);
    server.await?;
    bridge.shutdown();
    Ok(())
}
