//! REST API endpoints for the Evidence Corpus

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::SourceDocument;
use crate::service::AnalysisPipeline;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for listing sources
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSourcesParams {
    /// Page number (1-indexed, default: 1)
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100)
    pub page_size: Option<u32>,
    /// Filter by topic category (e.g. antibiotics, vaccines)
    pub category: Option<String>,
    /// Filter by publishing organization (e.g. CDC, WHO)
    pub organization: Option<String>,
}

/// Paginated response for sources
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SourceListResponse {
    pub sources: Vec<SourceSummary>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: i64,
    pub total_pages: u32,
}

/// Summary of a source document for list response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SourceSummary {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub url: Option<String>,
    pub category: String,
}

impl From<SourceDocument> for SourceSummary {
    fn from(doc: SourceDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            organization: doc.organization,
            url: doc.url,
            category: doc.category,
        }
    }
}

fn matches(value: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| value.eq_ignore_ascii_case(f.trim()))
}

/// List Evidence Corpus documents with pagination and filters
#[utoipa::path(
    get,
    path = "/v1/sources",
    params(ListSourcesParams),
    responses(
        (status = 200, description = "Sources retrieved successfully", body = SourceListResponse),
        (status = 500, description = "Evidence corpus unavailable", body = ErrorResponse)
    ),
    tag = "sources"
)]
#[get("/v1/sources")]
pub async fn list_sources(
    pipeline: web::Data<AnalysisPipeline>,
    query: web::Query<ListSourcesParams>,
) -> Result<HttpResponse, ApiError> {
    let corpus = pipeline.matcher().corpus();
    let documents = corpus.documents().await.map_err(|e| {
        tracing::error!(corpus = corpus.name(), error = %e, "Failed to list sources");
        ApiError::Internal(e.to_string())
    })?;

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let mut filtered: Vec<SourceDocument> = documents
        .into_iter()
        .filter(|doc| matches(&doc.category, query.category.as_deref()))
        .filter(|doc| matches(&doc.organization, query.organization.as_deref()))
        .collect();
    filtered.sort_by(|a, b| a.id.cmp(&b.id));

    let total_count = filtered.len() as i64;
    let total_pages = filtered.len().div_ceil(page_size as usize) as u32;
    let offset = (page - 1).saturating_mul(page_size) as usize;

    let sources = filtered
        .into_iter()
        .skip(offset)
        .take(page_size as usize)
        .map(SourceSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(SourceListResponse {
        sources,
        page,
        page_size,
        total_count,
        total_pages,
    }))
}

/// Configure source routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_sources);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{App, test};

    use crate::app::AppState;
    use crate::db::MemoryAnalysisStore;
    use crate::model::Config;
    use crate::service::claims::HeuristicClaimExtractor;
    use crate::service::evidence::StaticCorpus;

    fn pipeline() -> web::Data<AnalysisPipeline> {
        let state = AppState::with_components(
            Config::default(),
            Arc::new(MemoryAnalysisStore::new()),
            Arc::new(StaticCorpus::builtin().unwrap()),
            Arc::new(HeuristicClaimExtractor::new()),
            None,
        );
        web::Data::from(state.pipeline)
    }

    #[actix_web::test]
    async fn test_list_sources_paginates() {
        let app = test::init_service(App::new().app_data(pipeline()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/v1/sources?page_size=2")
            .to_request();
        let body: SourceListResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.page, 1);
        assert_eq!(body.sources.len(), 2);
        assert!(body.total_count > 2);
        assert_eq!(body.total_pages as i64, (body.total_count + 1) / 2);
    }

    #[actix_web::test]
    async fn test_list_sources_filters_by_organization() {
        let app = test::init_service(App::new().app_data(pipeline()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/v1/sources?organization=cdc&page_size=100")
            .to_request();
        let body: SourceListResponse = test::call_and_read_body_json(&app, req).await;

        assert!(!body.sources.is_empty());
        assert!(body.sources.iter().all(|s| s.organization == "CDC"));
    }

    #[actix_web::test]
    async fn test_page_past_the_end_is_empty() {
        let app = test::init_service(App::new().app_data(pipeline()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/v1/sources?page=999")
            .to_request();
        let body: SourceListResponse = test::call_and_read_body_json(&app, req).await;

        assert!(body.sources.is_empty());
        assert_eq!(body.page, 999);
    }
}
