//! Barcode intake — HTTP back-end for marking order units as received.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │ Scanner  │ ───────> │  server.rs  (axum Router, CORS, tracing)         │
//! │ client   │ <─────── │    └─ api.rs  (route handlers, ApiError)         │
//! └──────────┘          │         │                                        │
//!                       │         │ CompletionService::process_barcode()   │
//!                       │         v                                        │
//!                       │  service.rs  (decode → check → mark → confirm)   │
//!                       │         │                                        │
//!                       │         │ OrderStore trait                       │
//!                       │         v                                        │
//!                       │  store.rs → db.rs  (SqliteStore over DbHandle)   │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! | Module     | Responsibility                                          |
//! |------------|---------------------------------------------------------|
//! | `models`   | `OrderDetail`, `CompletionRecord`, wire payloads        |
//! | `messages` | Localized display and spoken wording                    |
//! | `client`   | HTTP client used by the `scan` and `health` commands    |
//!
//! ## Request Flow
//!
//! 1. `POST /api/process-barcode` → `api::process_barcode()`
//! 2. `barcode::decode()` splits the scan into item index and order-detail id.
//! 3. The service loads the order detail, checks the item index against its
//!    quantity and marks the unit with a guarded insert. A unit that is
//!    already marked is confirmed again without a second write.
//! 4. The response carries the display message, the spoken message and the
//!    product info for the operator's screen.

pub mod api;
pub mod client;
pub mod db;
pub mod messages;
pub mod models;
pub mod server;
pub mod service;
pub mod store;
