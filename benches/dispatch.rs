//! Dispatcher benchmark suite.
//!
//! Measures one full Request round trip (decode, route, execute, encode,
//! deliver) for an inline and an offloaded operation, and a burst of
//! concurrent file reads.
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::fs;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use webview_bridge::{
    AppMetadata, BundledResources, Delivery, Dispatcher, LocalFiles, Services, WindowService,
};

// ============================================================================
// Configuration
// ============================================================================

const BURST_SIZES: &[usize] = &[1, 8, 32];

/// Window service for a dispatcher running without a shell.
struct NoWindows;

impl WindowService for NoWindows {
    fn spawn_window(
        &self,
        _payload: &serde_json::Value,
    ) -> webview_bridge::Result<webview_bridge::SpawnedWindow> {
        Err(webview_bridge::Error::internal("windows are not available here"))
    }
}

struct Bench {
    dispatcher: Dispatcher,
    responses: mpsc::UnboundedReceiver<String>,
    read_request: String,
    _dir: tempfile::TempDir,
}

fn setup(rt: &Runtime) -> Bench {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = dir.path().join("data.txt");
    fs::write(&file, "x".repeat(4096)).expect("write");

    let services = Services::new(
        Arc::new(AppMetadata::new("bench", "0.0.0")),
        Arc::new(LocalFiles::new()),
        Arc::new(BundledResources::new(dir.path())),
        Arc::new(NoWindows),
    );

    let (tx, responses) = mpsc::unbounded_channel();
    let delivery: Arc<dyn Delivery> = Arc::new(move |text: String| {
        let _ = tx.send(text);
    });

    let read_request = json!({
        "protocol": "1.0",
        "id": "read",
        "type": "READ_FILE",
        "payload": {"path": file.display().to_string()}
    })
    .to_string();

    Bench {
        dispatcher: Dispatcher::new(services, delivery, rt.handle().clone()),
        responses,
        read_request,
        _dir: dir,
    }
}

// ============================================================================
// Benchmark: Inline Operation
// ============================================================================

fn bench_init_app(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut bench = setup(&rt);
    let request = r#"{"protocol":"1.0","id":"init","type":"INIT_APP","payload":null}"#;

    c.bench_function("init_app_round_trip", |b| {
        b.iter(|| {
            bench.dispatcher.post_message(request);
            bench.responses.try_recv().expect("inline response")
        });
    });
}

// ============================================================================
// Benchmark: Offloaded Reads
// ============================================================================

fn bench_read_file(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let bench = setup(&rt);
    let bench = Arc::new(tokio::sync::Mutex::new(bench));

    let mut group = c.benchmark_group("read_file_burst");

    for &size in BURST_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &burst| {
            b.to_async(&rt).iter(|| {
                let bench = Arc::clone(&bench);
                async move {
                    let mut bench = bench.lock().await;
                    for _ in 0..burst {
                        bench.dispatcher.post_message(&bench.read_request);
                    }
                    for _ in 0..burst {
                        bench.responses.recv().await.expect("response");
                    }
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Decode Failure
// ============================================================================

fn bench_decode_failure(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut bench = setup(&rt);

    c.bench_function("malformed_round_trip", |b| {
        b.iter(|| {
            bench.dispatcher.post_message("{not json");
            bench.responses.try_recv().expect("inline response")
        });
    });
}

// ============================================================================
// Main
// ============================================================================

criterion_group!(benches, bench_init_app, bench_read_file, bench_decode_failure);
criterion_main!(benches);

