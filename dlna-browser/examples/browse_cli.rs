//! Discover media servers and browse the root folder of the first one
//!
//! Usage: cargo run -p dlna-sdk-browser --example browse_cli
//!
//! Set RUST_LOG=dlna_browser=debug to watch the engine work.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use dlna_browser::{BrowserCallbacks, BrowserConfig, DlnaBrowser};
use dlna_didl::{extract_didl, parse_listing};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut browser = DlnaBrowser::new(BrowserConfig::default()).expect("Failed to start engine");

    let (found_tx, found_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();
    browser.register_callbacks(
        BrowserCallbacks::new()
            .on_device_added(move |device| {
                println!("+ {} ({}) at {}", device.friendly_name, device.udn, device.location);
                found_tx.send(device.udn.clone()).ok();
            })
            .on_device_removed(|udn| println!("- {}", udn))
            .on_browse_completed(move |result| {
                if result.is_success() {
                    println!("Listing of {} on {}:", result.object_id, result.udn);
                    if let Some(entries) =
                        extract_didl(&result.document).and_then(|d| parse_listing(&d).ok())
                    {
                        for entry in entries {
                            let marker = if entry.is_directory() { "/" } else { "" };
                            println!("  {}{}  [{}]", entry.title, marker, entry.object_id);
                        }
                    }
                } else {
                    println!("Browse of {} on {} failed", result.object_id, result.udn);
                }
                done_tx.send(()).ok();
            }),
    );

    let mut browsed = false;
    let deadline = Instant::now() + Duration::from_secs(15);
    while Instant::now() < deadline {
        browser.drain();

        if !browsed {
            if let Ok(udn) = found_rx.try_recv() {
                println!("Browsing root folder of {}...", udn);
                browser.submit_browse(&udn, "0").expect("Submit failed");
                browsed = true;
            }
        }
        if browsed && done_rx.try_recv().is_ok() {
            break;
        }

        std::thread::sleep(Duration::from_millis(100));
    }

    browser.shutdown();
}
