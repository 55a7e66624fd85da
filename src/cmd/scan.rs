//! Scanner-side commands — `decode`, `scan` and `health`.

use anyhow::Result;

use barcode_intake::barcode::DecodedBarcode;
use barcode_intake::intake::client::{IntakeClient, ScanOutcome};
use barcode_intake::intake::models::ProductInfo;

pub fn cmd_decode(code: &str) -> Result<()> {
    let decoded: DecodedBarcode = code.parse()?;
    println!("item_index: {}", decoded.item_index);
    println!("order_detail_id: {}", decoded.order_detail_id);
    println!("canonical: {}", decoded);
    Ok(())
}

pub async fn cmd_scan(url: &str, code: &str) -> Result<()> {
    let client = IntakeClient::new(url);
    match client.scan(code).await? {
        ScanOutcome::Confirmed(result) => {
            if result.already_completed {
                println!(
                    "✓ {} (already received {})",
                    result.message,
                    result.completed_at.format("%d.%m.%Y %H:%M")
                );
            } else {
                println!("✓ {}", result.message);
            }
            println!("  {}", result.voice_message);
            print_product(&result.product_info);
            Ok(())
        }
        ScanOutcome::Rejected { status, failure } => {
            println!("✗ {}", failure.message);
            println!("  {}", failure.voice_message);
            anyhow::bail!("Scan rejected with HTTP {}", status)
        }
    }
}

fn print_product(info: &ProductInfo) {
    println!("  element:  {}", info.element_name);
    println!("  order:    {} (construction {})", info.order_number, info.construction_number);
    println!("  item:     {} of {}", info.item_number, info.qty);
    if let (Some(w), Some(h)) = (info.width, info.height) {
        println!("  size:     {} x {}", w, h);
    }
    println!(
        "  progress: {}/{} units received",
        info.approved_items_in_order, info.total_items_in_order
    );
}

pub async fn cmd_health(url: &str) -> Result<()> {
    let client = IntakeClient::new(url);
    let health = client.health().await?;
    println!("status: {}", health.status);
    println!("database_connected: {}", health.database_connected);
    println!("api_version: {}", health.api_version);
    if !health.database_connected {
        anyhow::bail!("Intake API cannot reach its database");
    }
    Ok(())
}
