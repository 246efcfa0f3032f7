//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::{analysis, error, health, sources};
use crate::model;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedClaim Intel API",
        description = "Health claim analysis: extraction, evidence matching and corrective responses"
    ),
    paths(
        analysis::create_analysis,
        analysis::get_analysis,
        analysis::add_feedback,
        sources::list_sources,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        analysis::SubmittedAnalysis,
        analysis::FeedbackRequest,
        sources::SourceListResponse,
        sources::SourceSummary,
        health::HealthStatus,
        health::ReadinessStatus,
        health::DependencyHealth,
        error::ErrorResponse,
        model::AnalysisRequest,
        model::AnalysisReport,
        model::Analysis,
        model::AnalysisStatus,
        model::InputType,
        model::PipelineStep,
        model::Severity,
        model::Claim,
        model::ClaimType,
        model::UrgencyHint,
        model::Stance,
        model::Citation,
        model::ClaimWithCitations,
        model::GeneratedOutput,
        model::OutputFormat,
        model::OutputLength,
        model::Region,
        model::Tone,
        model::Audience,
        model::Platform,
        model::Feedback,
    )),
    tags(
        (name = "analyses", description = "Claim analysis pipeline"),
        (name = "sources", description = "Evidence Corpus"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/v1/analyses",
            "/v1/analyses/{id}",
            "/v1/analyses/{id}/feedback",
            "/v1/sources",
            "/health/live",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(doc.to_yaml().is_ok());
    }
}
