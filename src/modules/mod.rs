//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the object storage seam and its MinIO/S3 adapter.

pub mod storage;
