// Boots one flight server per test binary and hands out its base URL.
use flight_server::ServerConfig;
use flight_server::frameworks::config;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

// Set once the server has bound its ephemeral port.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// Guards the bootstrap so concurrent tests start a single server.
static SERVER_READY: OnceLock<()> = OnceLock::new();

pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);

        // The server gets its own OS thread and runtime so it outlives the
        // per-test runtimes created by `#[tokio::test]`.
        std::thread::spawn(move || {
            // Dropping the temp dir would delete it, so it lives on this thread.
            let data_dir = tempfile::tempdir().expect("test data dir");
            let config = test_config(data_dir.path());
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{addr}"));
                flight_server::run(listener, config).await.expect("server failed");
            });
        });

        wait_until_accepting(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Shipped demo fleet, paused at boot so each test decides when time moves.
fn test_config(data_dir: &Path) -> ServerConfig {
    let mut simulation = config::simulation_settings();
    simulation.autostart = false;
    simulation.speed_multiplier = 1.0;
    ServerConfig {
        flight_plan_path: concat!(env!("CARGO_MANIFEST_DIR"), "/flights.toml").into(),
        snapshot_path: data_dir.join("snapshot.json"),
        report_dir: data_dir.join("reports"),
        simulation,
    }
}

fn wait_until_accepting(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
