//! OpenAPI Documentation

use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// Bible Verse API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bible Verse API",
        description = "Recommends a Bible verse with context, meaning and a prayer for a described life situation.",
        version = "0.1.0",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    paths(
        handlers::health::health_check,
        handlers::situations::list_situations,
        handlers::verse::get_verse,
    ),
    components(
        schemas(
            dto::GetVerseRequest,
            dto::SituationsResponse,
            dto::HealthResponse,
            bibleverse_types::VerseResult,
            bibleverse_types::Situation,
            bibleverse_types::SituationId,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Verse", description = "Verse recommendation")
    )
)]
pub struct ApiDoc;
