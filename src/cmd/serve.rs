//! Server lifecycle commands — `barcode-intake serve` and `barcode-intake init`.

use std::time::Duration;

use anyhow::Result;

use barcode_intake::config::AppConfig;
use barcode_intake::intake::db::IntakeDb;

pub async fn cmd_serve(config: AppConfig) -> Result<()> {
    barcode_intake::intake::server::start_server(config).await
}

pub fn cmd_init(config: &AppConfig, demo: bool) -> Result<()> {
    let db_path = &config.database.path;
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let db = IntakeDb::new(db_path, Duration::from_millis(config.database.busy_timeout_ms))?;
    println!("Intake database initialized at {}", db_path.display());

    if demo {
        if db.get_order_detail(109565)?.is_some() {
            println!("Demo order already present");
        } else {
            let order_id = db.seed_demo()?;
            println!("Seeded demo order 19561 (order id {})", order_id);
            println!("  try: barcode-intake scan 1109565");
        }
    }
    Ok(())
}
