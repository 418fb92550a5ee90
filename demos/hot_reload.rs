//! Example demonstrating automatic hot-reload of a JSON file.
//!
//! This example shows how to:
//! - Validate the configuration with a rule-schema
//! - Reload automatically when the file changes
//! - Subscribe to reload notifications
//!
//! Run with: cargo run --example hot_reload
//!
//! While running, edit demos/config/hot_reload.json to see automatic reloads.

use hotswap_json::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const SCHEMA: &[u8] = br#"{
    "server": {
        "port": {"required": true, "type": "uint32", "regexp": "^[0-9]{2,5}$"},
        "host": {"required": true, "type": "string"}
    },
    "database": {
        "max_connections": {"required": false, "type": "uint32", "handler": "pool"}
    }
}"#;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Hot Reload Example ===\n");

    let config_path = "demos/config/hot_reload.json";
    if !std::path::Path::new(config_path).exists() {
        std::fs::create_dir_all("demos/config")?;
        std::fs::write(
            config_path,
            r#"{
    "server": {"port": 8080, "host": "localhost"},
    "database": {"url": "postgres://localhost/mydb", "max_connections": 10}
}
"#,
        )?;
        println!("Created {}", config_path);
    }

    let handlers = Handlers::new().with("pool", |value: &Value| match value.to_u32() {
        Some(1..=100) => Ok(()),
        _ => Err(ValidationError::invalid_field(
            "max_connections",
            "must be between 1 and 100",
        )),
    });
    let checker = Checker::new(SCHEMA, &handlers)?;

    let logger = CallbackLogger::new()
        .on_info(|msg| println!("[info] {}", msg))
        .on_warn(|msg| println!("[warn] {}", msg))
        .on_error(|msg| println!("[error] {}", msg));

    let store = ConfigStore::builder()
        .with_file(config_path)
        .with_checker(checker)
        .with_logger(logger)
        .with_file_watch(true)
        .with_watch_debounce(Duration::from_millis(500))
        .build()
        .await?;

    println!("Watching: {}\n", store.path().display());

    let reload_count = Arc::new(AtomicUsize::new(0));
    let reload_count_clone = Arc::clone(&reload_count);
    let _subscription = store.subscribe(move || {
        let count = reload_count_clone.fetch_add(1, Ordering::SeqCst) + 1;
        println!("\n[Event] Configuration reloaded (reload #{})", count);
    });

    print_config(&store);

    println!(
        "\n===> Try editing {} to see automatic reloads! <===",
        config_path
    );
    println!("     Example changes:");
    println!("     - Change port: 8080 -> 9090");
    println!("     - Change max_connections: 10 -> 500 (rejected, old values kept)");
    println!("     - Break the JSON (rejected, old values kept)");
    println!("\nPress Ctrl+C to exit\n");

    loop {
        tokio::time::sleep(Duration::from_secs(5)).await;

        println!(
            "[Status] version {} (reloads: {}):",
            store.snapshot().version(),
            reload_count.load(Ordering::SeqCst)
        );
        print_config(&store);
    }
}

fn print_config(store: &ConfigStore) {
    println!(
        "  Server: {}:{}",
        store.string("server.host"),
        store.uint32("server.port")
    );
    println!(
        "  Database: {} (max connections: {})",
        store.string_or("database.url", "<unset>".to_string()),
        store.uint32_or("database.max_connections", 10)
    );
}
