//! Headless shell walkthrough.
//!
//! Demonstrates:
//! - Starting a shell over a temporary resource bundle
//! - Waiting for the bridge to become ready in the main window
//! - Sending each implemented operation as the page would
//! - Following a `SPAWN_WINDOW` into the new window
//!
//! Usage:
//!   cargo run --example headless_shell
//!   cargo run --example headless_shell -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::time::Duration;

use anyhow::Context;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use webview_bridge::{AppMetadata, HeadlessFactory, Response, Shell, SurfaceProbe};

// ============================================================================
// Constants
// ============================================================================

const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|arg| arg == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "webview_bridge=debug"
    } else {
        "webview_bridge=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

async fn run() -> anyhow::Result<()> {
    println!("=== Headless Shell ===\n");

    // ========================================================================
    // Bundle
    // ========================================================================

    let bundle = tempfile::tempdir().context("creating resource bundle")?;
    fs::write(bundle.path().join("index.html"), "<h1>Início</h1>")?;
    fs::write(bundle.path().join("about.html"), "<h1>Sobre</h1>")?;
    let notes = bundle.path().join("notes.txt");
    fs::write(&notes, "primeira linha\nsegunda linha\n")?;

    // ========================================================================
    // Shell
    // ========================================================================

    let factory = HeadlessFactory::new();
    let shell = Shell::builder()
        .resource_root(bundle.path())
        .surface_factory(factory.clone())
        .app_metadata(AppMetadata::new("Headless Demo", "0.1.0"))
        .build()
        .await?;

    let main = factory
        .probe(shell.main_window())
        .context("main window probe")?;
    main.wait_until_ready(WAIT).await?;
    println!("[Shell] Main window {} ready", main.id());

    // ========================================================================
    // Requests
    // ========================================================================

    let calls = [
        ("INIT_APP", Value::Null),
        ("READ_FILE", json!({"path": notes.display().to_string()})),
        ("LOAD_HTML", json!("about.html")),
        ("READ_FILE", json!({"path": "/definitely/missing/file.txt"})),
        ("GET_APP_INFO", json!({})),
        ("SPAWN_WINDOW", json!({"htmlPath": "about.html", "title": "Sobre"})),
    ];

    for (n, (operation, payload)) in calls.into_iter().enumerate() {
        let response = send(&main, &format!("req-{n}"), operation, payload).await?;
        println!("[{operation}] {}", summarize(&response));
    }

    // ========================================================================
    // Spawned Window
    // ========================================================================

    let probes = factory.wait_for_surfaces(2, WAIT).await?;
    let child = probes
        .into_iter()
        .find(|probe| probe.id() != main.id())
        .context("spawned window probe")?;
    child.wait_until_ready(WAIT).await?;
    println!(
        "\n[Shell] Window {} ready: \"{}\" {}x{}",
        child.id(),
        child.title(),
        child.options().width,
        child.options().height
    );

    let response = send(&child, "child-0", "INIT_APP", Value::Null).await?;
    println!("[INIT_APP @ child] {}", summarize(&response));

    println!("\n[Shell] Open windows: {}", shell.window_count().await?);
    shell.shutdown().await?;
    println!("[Shell] Shut down");

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Posts one Request and waits for its Response.
async fn send(
    probe: &SurfaceProbe,
    id: &str,
    operation: &str,
    payload: Value,
) -> anyhow::Result<Response> {
    let before = probe.responses().len();
    let request = json!({"protocol": "1.0", "id": id, "type": operation, "payload": payload});
    probe.post_message(request.to_string())?;

    let responses = probe.wait_for_responses(before + 1, WAIT).await?;
    responses
        .into_iter()
        .find(|response| response.id.as_str() == id)
        .with_context(|| format!("no response for {id}"))
}

fn summarize(response: &Response) -> String {
    match response.error_payload() {
        Some(error) => format!("ERROR {} - {}", error.code, error.message),
        None => format!("SUCCESS {}", response.payload),
    }
}
