//! REST API endpoints for claim analyses

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{AnalysisReport, AnalysisRequest, AnalysisStatus, Feedback};
use crate::service::AnalysisPipeline;

/// Accepted submission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmittedAnalysis {
    pub id: Uuid,
    pub status: AnalysisStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    /// 1-5
    pub rating: u8,
    pub comment: Option<String>,
}

/// Submit text or a URL for analysis
///
/// Returns immediately; poll `GET /v1/analyses/{id}` until the status is
/// `done` or `error`.
#[utoipa::path(
    post,
    path = "/v1/analyses",
    request_body = AnalysisRequest,
    responses(
        (status = 202, description = "Analysis accepted", body = SubmittedAnalysis),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "analyses"
)]
#[post("/v1/analyses")]
pub async fn create_analysis(
    pipeline: web::Data<AnalysisPipeline>,
    body: web::Json<AnalysisRequest>,
) -> Result<HttpResponse, ApiError> {
    let pipeline = pipeline.into_inner();
    let id = pipeline.submit(body.into_inner()).await?;

    Ok(HttpResponse::Accepted().json(SubmittedAnalysis {
        id,
        status: AnalysisStatus::Pending,
    }))
}

/// Get an analysis with its claims, citations and generated outputs
#[utoipa::path(
    get,
    path = "/v1/analyses/{id}",
    params(
        ("id" = Uuid, Path, description = "Analysis ID")
    ),
    responses(
        (status = 200, description = "Current analysis state", body = AnalysisReport),
        (status = 404, description = "Analysis not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "analyses"
)]
#[get("/v1/analyses/{id}")]
pub async fn get_analysis(
    pipeline: web::Data<AnalysisPipeline>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let report = pipeline.get_status(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Leave feedback on an analysis
#[utoipa::path(
    post,
    path = "/v1/analyses/{id}/feedback",
    params(
        ("id" = Uuid, Path, description = "Analysis ID")
    ),
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = Feedback),
        (status = 400, description = "Rating out of range", body = ErrorResponse),
        (status = 404, description = "Analysis not found", body = ErrorResponse)
    ),
    tag = "analyses"
)]
#[post("/v1/analyses/{id}/feedback")]
pub async fn add_feedback(
    pipeline: web::Data<AnalysisPipeline>,
    path: web::Path<Uuid>,
    body: web::Json<FeedbackRequest>,
) -> Result<HttpResponse, ApiError> {
    let analysis_id = path.into_inner();
    let request = body.into_inner();

    if !(1..=5).contains(&request.rating) {
        return Err(ApiError::BadRequest(format!(
            "rating must be between 1 and 5, got {}",
            request.rating
        )));
    }

    let feedback = Feedback {
        id: Uuid::new_v4(),
        analysis_id,
        rating: request.rating,
        comment: request
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        created_at: Utc::now(),
    };

    pipeline
        .store()
        .add_feedback(&feedback)
        .await
        .map_err(|e| match e {
            crate::db::DbError::NotFound(_) => ApiError::AnalysisNotFound(analysis_id),
            other => ApiError::from(other),
        })?;

    tracing::info!(analysis_id = %analysis_id, rating = feedback.rating, "Feedback received");
    Ok(HttpResponse::Created().json(feedback))
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_analysis)
        .service(get_analysis)
        .service(add_feedback);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{App, http::StatusCode, test};

    use crate::app::AppState;
    use crate::db::MemoryAnalysisStore;
    use crate::model::Config;
    use crate::service::claims::HeuristicClaimExtractor;
    use crate::service::evidence::StaticCorpus;

    fn pipeline_over(store: Arc<MemoryAnalysisStore>) -> web::Data<AnalysisPipeline> {
        let state = AppState::with_components(
            Config::default(),
            store,
            Arc::new(StaticCorpus::builtin().unwrap()),
            Arc::new(HeuristicClaimExtractor::new()),
            None,
        );
        web::Data::from(state.pipeline)
    }

    fn pipeline() -> web::Data<AnalysisPipeline> {
        pipeline_over(Arc::new(MemoryAnalysisStore::new()))
    }

    #[actix_web::test]
    async fn test_submit_and_poll() {
        let app = test::init_service(App::new().app_data(pipeline()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/v1/analyses")
            .set_json(serde_json::json!({
                "input_type": "text",
                "input_text": "Antibiotics cure colds",
                "region": "US",
                "tone": "empathetic"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let submitted: SubmittedAnalysis = test::read_body_json(resp).await;
        assert_eq!(submitted.status, AnalysisStatus::Pending);

        let mut body = serde_json::Value::Null;
        for _ in 0..200 {
            let req = test::TestRequest::get()
                .uri(&format!("/v1/analyses/{}", submitted.id))
                .to_request();
            body = test::call_and_read_body_json(&app, req).await;
            if body["status"] == "done" || body["status"] == "error" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }

        assert_eq!(body["status"], "done");
        assert_eq!(body["outputs"].as_array().unwrap().len(), 9);
        assert_eq!(body["claims"][0]["stance"], "contradicted");
    }

    #[actix_web::test]
    async fn test_empty_text_is_bad_request() {
        let app = test::init_service(App::new().app_data(pipeline()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/v1/analyses")
            .set_json(serde_json::json!({ "input_type": "text", "input_text": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "bad_request");
        assert!(body["request_id"].is_string());
    }

    #[actix_web::test]
    async fn test_unknown_analysis_is_not_found() {
        let app = test::init_service(App::new().app_data(pipeline()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri(&format!("/v1/analyses/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_feedback_validation() {
        let store = Arc::new(MemoryAnalysisStore::new());
        let data = pipeline_over(store.clone());
        let id = data
            .clone()
            .into_inner()
            .submit(AnalysisRequest::text("Antibiotics cure colds"))
            .await
            .unwrap();
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/v1/analyses/{}/feedback", id))
            .set_json(serde_json::json!({ "rating": 9 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/v1/analyses/{}/feedback", id))
            .set_json(serde_json::json!({ "rating": 5, "comment": "  Clear and helpful " }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let stored = store.feedback_for(id).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rating, 5);
        assert_eq!(stored[0].comment.as_deref(), Some("Clear and helpful"));

        let req = test::TestRequest::post()
            .uri(&format!("/v1/analyses/{}/feedback", Uuid::new_v4()))
            .set_json(serde_json::json!({ "rating": 3 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
