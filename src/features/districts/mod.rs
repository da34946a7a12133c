//! Chinese administrative divisions synchronized from Tencent Map.
//!
//! | Method | Path           | Description                          |
//! |--------|----------------|--------------------------------------|
//! | GET    | `/`            | Status page with download link       |
//! | GET    | `/api/data`    | Download the stored district tree    |
//! | POST   | `/api/trigger` | Run one synchronization now          |
//! | GET    | `/api/status`  | Stored object and last run details   |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod workers;

pub use services::{DistrictSyncService, SyncSettings, TencentMapClient};
pub use workers::SyncScheduler;
