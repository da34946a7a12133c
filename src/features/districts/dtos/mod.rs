mod district_dto;

pub use district_dto::{LastRunDto, SyncReportDto, SyncStatusDto};
