use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use pricefeed_core::domain::snapshot::Stage;
use pricefeed_core::infrastructure::{SnapshotMeta, SnapshotStore};
use serde_json::json;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

// Port 9 is closed on test hosts: every HTTP call is refused quickly
const OFFLINE_CONFIG: &str = r#"
source-url: "http://127.0.0.1:9/products"
rate-url: "http://127.0.0.1:9/latest"
http-timeout-secs: 2
database-path: data/products.duckdb
"#;

/// A throwaway project directory with an offline pricefeed.yaml.
struct PricefeedTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl PricefeedTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        std::fs::write(root.join("pricefeed.yaml"), OFFLINE_CONFIG)?;
        Ok(Self { _tmp: tmp, root })
    }

    fn seed_raw(&self) -> Result<String> {
        let store = SnapshotStore::new(self.root.join("data/raw"), Stage::Raw);
        let feed = vec![
            json!({ "id": 1, "title": "Fjallraven Backpack", "price": 109.95, "description": "Everyday pack", "category": "men's clothing", "image": "https://img.test/1.jpg", "rating": { "rate": 3.9, "count": 120 } }),
            json!({ "id": 5, "title": "Chain Bracelet", "price": 58.0, "description": "Silver", "category": "jewelery", "image": "https://img.test/5.jpg" }),
            json!({ "id": 9, "title": "Portable Drive", "price": 64.0, "description": "2TB", "category": "electronics", "image": "https://img.test/9.jpg" }),
        ];
        Ok(store.write(&feed, SnapshotMeta::default())?.id)
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn pricefeed(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pricefeed"));
        cmd.env_remove("PRICEFEED_DATABASE")
            .env_remove("PRICEFEED_RAW_STORE")
            .env_remove("PRICEFEED_CLEAN_STORE")
            .env_remove("PRICEFEED_FALLBACK_RATE");
        cmd
    }

    fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.pricefeed()
            .args(args)
            .arg("--project-dir")
            .arg(&self.root)
            .assert()
    }
}

/// A running `pricefeed serve` child, killed when dropped.
struct ServeProcess {
    child: Child,
    addr: SocketAddr,
}

impl ServeProcess {
    fn start(env: &PricefeedTestEnv) -> Result<Self> {
        // Reserve a free port, then hand it to the child
        let addr = TcpListener::bind("127.0.0.1:0")?.local_addr()?;
        let child = env
            .pricefeed()
            .args(["serve", "--addr", &addr.to_string(), "--project-dir"])
            .arg(&env.root)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let server = Self { child, addr };

        let deadline = Instant::now() + Duration::from_secs(30);
        while TcpStream::connect(server.addr).is_err() {
            anyhow::ensure!(Instant::now() < deadline, "pricefeed serve never started listening");
            std::thread::sleep(Duration::from_millis(50));
        }
        Ok(server)
    }

    fn get(&self, path: &str) -> Result<String> {
        let mut stream = TcpStream::connect(self.addr)?;
        stream.set_read_timeout(Some(Duration::from_secs(30)))?;
        write!(
            stream,
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, self.addr
        )?;
        let mut response = String::new();
        stream.read_to_string(&mut response)?;
        Ok(response)
    }
}

impl Drop for ServeProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn is_empty_dir_or_missing(path: &Path) -> bool {
    std::fs::read_dir(path).map(|mut d| d.next().is_none()).unwrap_or(true)
}

#[test]
fn load_without_clean_snapshot_fails() -> Result<()> {
    let env = PricefeedTestEnv::new()?;

    env.run(&["load"])
        .failure()
        .stderr(predicate::str::contains("load stage failed"))
        .stderr(predicate::str::contains("No clean snapshot found"));
    Ok(())
}

#[test]
fn transform_without_raw_snapshot_fails() -> Result<()> {
    let env = PricefeedTestEnv::new()?;

    env.run(&["transform"])
        .failure()
        .stderr(predicate::str::contains("No raw snapshot found"));
    assert!(is_empty_dir_or_missing(&env.path("data/clean")));
    Ok(())
}

#[test]
fn fetch_with_unreachable_feed_writes_nothing() -> Result<()> {
    let env = PricefeedTestEnv::new()?;

    env.run(&["fetch"])
        .failure()
        .stderr(predicate::str::contains("fetch stage failed"))
        .stderr(predicate::str::contains("product-feed"));
    assert!(is_empty_dir_or_missing(&env.path("data/raw")));
    Ok(())
}

#[test]
fn transform_then_load_with_fallback_rate() -> Result<()> {
    let env = PricefeedTestEnv::new()?;
    let raw_id = env.seed_raw()?;

    env.run(&["transform"])
        .success()
        .stdout(predicate::str::contains("fallback 0.85"))
        .stdout(predicate::str::contains(raw_id.as_str()));

    env.run(&["load"])
        .success()
        .stdout(predicate::str::contains("3 inserted, 0 updated"));

    // Re-running the same snapshot updates in place
    env.run(&["load"])
        .success()
        .stdout(predicate::str::contains("0 inserted, 3 updated"));

    // 109.95 * 0.85 = 93.46 tops the table
    env.run(&["top", "--limit", "1"])
        .success()
        .stdout(predicate::str::contains("Fjallraven Backpack"))
        .stdout(predicate::str::contains("93.46"))
        .stdout(predicate::str::contains("Chain Bracelet").not());

    // 58.00 * 0.85 = 49.30, 64.00 * 0.85 = 54.40
    env.run(&["search", "--min", "49.3", "--max", "54.4"])
        .success()
        .stdout(predicate::str::contains("2 products"))
        .stdout(predicate::str::contains("Portable Drive"));

    env.run(&["snapshots", "--stage", "clean"])
        .success()
        .stdout(predicate::str::contains(raw_id.as_str()))
        .stdout(predicate::str::contains("fallback"));
    Ok(())
}

#[test]
fn load_succeeds_while_server_is_running() -> Result<()> {
    let env = PricefeedTestEnv::new()?;
    env.seed_raw()?;
    env.run(&["transform"]).success();

    let server = ServeProcess::start(&env)?;
    let before = server.get("/health")?;
    assert!(before.starts_with("HTTP/1.1 200"), "{}", before);
    assert!(before.contains(r#""products":0"#), "{}", before);

    // A second process writes the same database file the server reads
    env.run(&["load"])
        .success()
        .stdout(predicate::str::contains("3 inserted, 0 updated"));

    let top = server.get("/top5")?;
    assert!(top.starts_with("HTTP/1.1 200"), "{}", top);
    assert!(top.contains("Fjallraven Backpack"), "{}", top);

    env.run(&["load"])
        .success()
        .stdout(predicate::str::contains("0 inserted, 3 updated"));
    assert!(server.get("/health")?.contains(r#""products":3"#));
    Ok(())
}

#[test]
fn search_rejects_inverted_range() -> Result<()> {
    let env = PricefeedTestEnv::new()?;

    env.run(&["search", "--min", "50", "--max", "10"])
        .failure()
        .stderr(predicate::str::contains("Invalid price range"));
    Ok(())
}

#[test]
fn snapshots_on_empty_store() -> Result<()> {
    let env = PricefeedTestEnv::new()?;

    env.run(&["snapshots", "--stage", "raw"])
        .success()
        .stdout(predicate::str::contains("No raw snapshots"));
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<()> {
    let env = PricefeedTestEnv::new()?;
    std::fs::write(env.path("pricefeed.yaml"), "fallback-rate: -1\n")?;

    env.run(&["load"])
        .failure()
        .stderr(predicate::str::contains("Failed to load pipeline configuration"));
    Ok(())
}
