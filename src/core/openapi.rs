use utoipa::{Modify, OpenApi};

use crate::features::districts::{dtos as districts_dtos, handlers as districts_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Districts (public)
        districts_handlers::status_page,
        districts_handlers::download_districts,
        districts_handlers::trigger_sync,
        districts_handlers::get_status,
    ),
    components(
        schemas(
            districts_dtos::SyncReportDto,
            districts_dtos::SyncStatusDto,
            districts_dtos::LastRunDto,
            ApiResponse<districts_dtos::SyncReportDto>,
            ApiResponse<districts_dtos::SyncStatusDto>,
        )
    ),
    tags(
        (name = "districts", description = "Chinese administrative divisions (province, city, district)"),
    ),
    info(
        title = "District Sync API",
        version = "0.1.0",
        description = "API documentation for District Sync",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_district_paths() {
        let mut openapi = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Districts".to_string(),
            version: "9.9.9".to_string(),
            description: "test".to_string(),
        }
        .modify(&mut openapi);

        for path in ["/", "/api/data", "/api/trigger", "/api/status"] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }
        assert_eq!(openapi.info.title, "Districts");
        assert_eq!(openapi.info.version, "9.9.9");
    }
}
