//! Pipeline orchestrator
//!
//! One background task per analysis walks `ingest → claims → risk → response`.
//! Each step writes its output to the store before the step is marked
//! complete, so a polled analysis always reflects durable state. A failing
//! step moves the analysis to `error` and leaves earlier outputs in place.

use std::sync::Arc;
use std::time::Instant;

use futures::{StreamExt, stream};
use uuid::Uuid;

use crate::db::{AnalysisStore, DbError};
use crate::model::{
    Analysis, AnalysisReport, AnalysisRequest, AnalysisStatus, Claim, ClaimWithCitations,
    PipelineConfig, PipelineStep, TransitionError,
};
use crate::service::claims::ClaimExtractionService;
use crate::service::evidence::{EvidenceMatcher, summarize_risk};
use crate::service::ingest::Ingestor;
use crate::service::response::ResponseGenerator;

mod error;

pub use error::{PipelineError, StageError};

/// Why a step did not complete
enum StepFailure {
    /// The step's own work failed
    Stage(StageError),
    /// Persisting or validating a step transition failed
    Internal(PipelineError),
}

impl From<TransitionError> for StepFailure {
    fn from(e: TransitionError) -> Self {
        StepFailure::Internal(e.into())
    }
}

impl From<DbError> for StepFailure {
    fn from(e: DbError) -> Self {
        StepFailure::Internal(e.into())
    }
}

fn internal_message(step: PipelineStep, error: &PipelineError) -> String {
    match error {
        PipelineError::Store(_) => format!("{step}: internal storage error"),
        _ => format!("{step}: internal error"),
    }
}

pub struct AnalysisPipeline {
    store: Arc<dyn AnalysisStore>,
    ingestor: Ingestor,
    claims: ClaimExtractionService,
    matcher: EvidenceMatcher,
    generator: ResponseGenerator,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(
        store: Arc<dyn AnalysisStore>,
        ingestor: Ingestor,
        claims: ClaimExtractionService,
        matcher: EvidenceMatcher,
        config: PipelineConfig,
    ) -> Self {
        tracing::info!(
            extractor = %claims.extractor_id(),
            corpus = %matcher.corpus().name(),
            top_k = config.top_k,
            risk_concurrency = config.risk_concurrency,
            "Analysis pipeline initialized"
        );
        Self {
            store,
            ingestor,
            claims,
            matcher,
            generator: ResponseGenerator::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn AnalysisStore> {
        &self.store
    }

    pub fn matcher(&self) -> &EvidenceMatcher {
        &self.matcher
    }

    /// Validate and persist a pending analysis, then run it in the background
    pub async fn submit(self: &Arc<Self>, request: AnalysisRequest) -> Result<Uuid, PipelineError> {
        let analysis = request.into_analysis()?;
        let id = analysis.id;
        self.store.create_analysis(&analysis).await?;

        tracing::info!(
            analysis_id = %id,
            input_type = %analysis.input_type.as_str(),
            region = %analysis.region.as_str(),
            "Analysis submitted"
        );

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = pipeline.run(id).await {
                tracing::error!(analysis_id = %id, error = %e, "Analysis run aborted");
            }
        });

        Ok(id)
    }

    /// Current persisted state of an analysis
    pub async fn get_status(&self, id: Uuid) -> Result<AnalysisReport, PipelineError> {
        self.store
            .get_report(id)
            .await?
            .ok_or(PipelineError::NotFound(id))
    }

    /// Run a pending analysis to a terminal state.
    ///
    /// Every failure after the run has started is recorded on the analysis
    /// before returning. Step failures come back as `Ok(Error)`; `Err` means
    /// the run could not start or the store itself failed.
    pub async fn run(&self, id: Uuid) -> Result<AnalysisStatus, PipelineError> {
        if !self.store.try_start(id).await? {
            return match self.store.get_analysis(id).await? {
                Some(_) => Err(PipelineError::AlreadyStarted(id)),
                None => Err(PipelineError::NotFound(id)),
            };
        }

        let mut analysis = self
            .store
            .get_analysis(id)
            .await?
            .ok_or(PipelineError::NotFound(id))?;
        let started = Instant::now();

        for step in PipelineStep::ORDER {
            if let Err(failure) = self.advance(step, &mut analysis).await {
                return self.abort(&mut analysis, step, failure).await;
            }
        }

        let mut done = analysis.clone();
        let finished = match done.finish() {
            Ok(()) => self.store.save_analysis(&done).await.map_err(PipelineError::from),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = finished {
            return self
                .abort(&mut analysis, PipelineStep::Response, StepFailure::Internal(e))
                .await;
        }
        analysis = done;

        tracing::info!(
            analysis_id = %id,
            overall_severity = ?analysis.overall_severity,
            red_flags_detected = analysis.red_flags_detected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis completed"
        );

        Ok(analysis.status)
    }

    /// Begin, run and complete one step, persisting each transition
    async fn advance(&self, step: PipelineStep, analysis: &mut Analysis) -> Result<(), StepFailure> {
        analysis.begin_step(step)?;
        self.store.save_analysis(analysis).await?;

        let step_started = Instant::now();
        self.run_step(step, analysis)
            .await
            .map_err(StepFailure::Stage)?;

        let mut completed = analysis.clone();
        completed.complete_step(step)?;
        self.store.save_analysis(&completed).await?;
        *analysis = completed;

        tracing::info!(
            analysis_id = %analysis.id,
            step = %step,
            elapsed_ms = step_started.elapsed().as_millis() as u64,
            "Analysis step completed"
        );
        Ok(())
    }

    /// Move the analysis to `error` and persist it, best effort
    async fn abort(
        &self,
        analysis: &mut Analysis,
        step: PipelineStep,
        failure: StepFailure,
    ) -> Result<AnalysisStatus, PipelineError> {
        let (failed_at, message, internal) = match failure {
            StepFailure::Stage(e) => {
                let failed_at = e.step(step);
                tracing::error!(
                    analysis_id = %analysis.id,
                    step = %failed_at,
                    error = %e,
                    "Analysis step failed"
                );
                (failed_at, e.user_message(), None)
            }
            StepFailure::Internal(e) => {
                tracing::error!(
                    analysis_id = %analysis.id,
                    step = %step,
                    error = %e,
                    "Analysis bookkeeping failed"
                );
                (step, internal_message(step, &e), Some(e))
            }
        };

        analysis.fail(failed_at, message);
        let recorded = self.store.save_analysis(analysis).await;

        match (internal, recorded) {
            (None, Ok(())) => Ok(analysis.status),
            (None, Err(e)) => Err(e.into()),
            (Some(e), Ok(())) => Err(e),
            (Some(e), Err(save_err)) => {
                tracing::error!(
                    analysis_id = %analysis.id,
                    error = %save_err,
                    "Could not record analysis failure"
                );
                Err(e)
            }
        }
    }

    async fn run_step(&self, step: PipelineStep, analysis: &mut Analysis) -> Result<(), StageError> {
        match step {
            PipelineStep::Ingest => self.ingest(analysis).await,
            PipelineStep::Claims => self.extract_claims(analysis).await,
            PipelineStep::Risk => self.classify_claims(analysis).await,
            PipelineStep::Response => self.generate_response(analysis).await,
        }
    }

    async fn ingest(&self, analysis: &mut Analysis) -> Result<(), StageError> {
        let canonical = self.ingestor.ingest(analysis).await?;
        tracing::debug!(
            analysis_id = %analysis.id,
            canonical_chars = canonical.chars().count(),
            "Input ingested"
        );
        analysis.canonical_text = Some(canonical);
        self.save(PipelineStep::Ingest, analysis).await
    }

    async fn extract_claims(&self, analysis: &mut Analysis) -> Result<(), StageError> {
        let canonical = analysis.canonical_text.as_deref().unwrap_or_default();
        let drafts = self.claims.extract_claims(canonical).await?;

        let claims: Vec<Claim> = drafts
            .into_iter()
            .enumerate()
            .map(|(position, draft)| Claim::from_draft(analysis.id, position as i32, draft))
            .collect();

        tracing::info!(
            analysis_id = %analysis.id,
            claim_count = claims.len(),
            "Claims extracted"
        );

        self.store
            .replace_claims(analysis.id, &claims)
            .await
            .map_err(|source| StageError::Store {
                step: PipelineStep::Claims,
                source,
            })
    }

    /// Classify every claim, persisting each result as soon as it is known.
    /// The first failure aborts the step; claims classified before it stay stored.
    async fn classify_claims(&self, analysis: &mut Analysis) -> Result<(), StageError> {
        let claims: Vec<Claim> = self
            .load_claims(analysis.id, PipelineStep::Risk)
            .await?
            .into_iter()
            .map(|c| c.claim)
            .collect();

        let matcher = &self.matcher;
        let mut assessments = stream::iter(claims.into_iter().map(|claim| async move {
            let assessment = matcher.assess(&claim).await;
            (claim, assessment)
        }))
        .buffered(self.config.risk_concurrency.max(1));

        let mut classified = Vec::new();
        while let Some((mut claim, assessment)) = assessments.next().await {
            let citations = assessment?.apply_to(&mut claim);
            self.store
                .save_classification(&claim, &citations)
                .await
                .map_err(|source| StageError::Store {
                    step: PipelineStep::Risk,
                    source,
                })?;
            classified.push(claim);
        }

        let risk = summarize_risk(&classified);
        analysis.overall_severity = risk.overall_severity;
        analysis.red_flags_detected = risk.red_flags_detected;
        analysis.red_flags = risk.red_flags;
        analysis.topics = risk.topics;

        tracing::info!(
            analysis_id = %analysis.id,
            claim_count = classified.len(),
            overall_severity = ?analysis.overall_severity,
            red_flags_detected = analysis.red_flags_detected,
            "Claims classified"
        );

        self.save(PipelineStep::Risk, analysis).await
    }

    async fn generate_response(&self, analysis: &mut Analysis) -> Result<(), StageError> {
        let claims = self.load_claims(analysis.id, PipelineStep::Response).await?;
        let response = self.generator.generate(analysis, &claims)?;

        self.store
            .replace_outputs(analysis.id, &response.outputs)
            .await
            .map_err(|source| StageError::Store {
                step: PipelineStep::Response,
                source,
            })?;
        response.summary.apply_to(analysis);
        self.save(PipelineStep::Response, analysis).await
    }

    async fn load_claims(
        &self,
        id: Uuid,
        step: PipelineStep,
    ) -> Result<Vec<ClaimWithCitations>, StageError> {
        let report = self
            .store
            .get_report(id)
            .await
            .map_err(|source| StageError::Store { step, source })?;
        Ok(report.map(|r| r.claims).unwrap_or_default())
    }

    async fn save(&self, step: PipelineStep, analysis: &Analysis) -> Result<(), StageError> {
        self.store
            .save_analysis(analysis)
            .await
            .map_err(|source| StageError::Store { step, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::db::MemoryAnalysisStore;
    use crate::model::{
        OutputFormat, OutputLength, RetrieverConfig, Severity, SourceDocument, Stance,
    };
    use crate::retriever::{RetrieverDispatcher, WebPageRetriever};
    use crate::service::claims::{ClaimExtractionError, ClaimExtractor, HeuristicClaimExtractor};
    use crate::service::evidence::{EvidenceCorpus, EvidenceError, StaticCorpus};

    /// Healthy for the first `healthy_calls` queries, unavailable afterwards
    struct FailAfter {
        inner: StaticCorpus,
        healthy_calls: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl EvidenceCorpus for FailAfter {
        fn name(&self) -> &str {
            "fail-after"
        }

        async fn documents(&self) -> Result<Vec<SourceDocument>, EvidenceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.healthy_calls {
                self.inner.documents().await
            } else {
                Err(EvidenceError::CorpusUnavailable("connection refused".to_string()))
            }
        }
    }

    /// Delegates to the in-memory store; the `fail_on`-th `save_analysis` call fails
    struct FlakySaves {
        inner: MemoryAnalysisStore,
        fail_on: u32,
        saves: AtomicU32,
    }

    #[async_trait]
    impl AnalysisStore for FlakySaves {
        async fn create_analysis(&self, analysis: &Analysis) -> Result<(), DbError> {
            self.inner.create_analysis(analysis).await
        }

        async fn get_analysis(&self, id: Uuid) -> Result<Option<Analysis>, DbError> {
            self.inner.get_analysis(id).await
        }

        async fn try_start(&self, id: Uuid) -> Result<bool, DbError> {
            self.inner.try_start(id).await
        }

        async fn save_analysis(&self, analysis: &Analysis) -> Result<(), DbError> {
            if self.saves.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(DbError::Serialization("connection reset".to_string()));
            }
            self.inner.save_analysis(analysis).await
        }

        async fn replace_claims(&self, analysis_id: Uuid, claims: &[Claim]) -> Result<(), DbError> {
            self.inner.replace_claims(analysis_id, claims).await
        }

        async fn save_classification(
            &self,
            claim: &Claim,
            citations: &[crate::model::Citation],
        ) -> Result<(), DbError> {
            self.inner.save_classification(claim, citations).await
        }

        async fn replace_outputs(
            &self,
            analysis_id: Uuid,
            outputs: &[crate::model::GeneratedOutput],
        ) -> Result<(), DbError> {
            self.inner.replace_outputs(analysis_id, outputs).await
        }

        async fn get_report(&self, id: Uuid) -> Result<Option<AnalysisReport>, DbError> {
            self.inner.get_report(id).await
        }

        async fn add_feedback(&self, feedback: &crate::model::Feedback) -> Result<(), DbError> {
            self.inner.add_feedback(feedback).await
        }

        async fn ping(&self) -> Result<(), DbError> {
            self.inner.ping().await
        }
    }

    struct UnavailableExtractor;

    #[async_trait]
    impl ClaimExtractor for UnavailableExtractor {
        fn id(&self) -> &str {
            "unavailable"
        }

        async fn extract(&self, _text: &str) -> Result<Vec<crate::model::ClaimDraft>, ClaimExtractionError> {
            Err(ClaimExtractionError::ExtractionFailed("upstream timeout".to_string()))
        }
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            corpus_retry_delay_ms: 1,
            fetch_timeout_secs: 2,
            ..PipelineConfig::default()
        }
    }

    fn build(
        corpus: Arc<dyn EvidenceCorpus>,
        extractor: Arc<dyn ClaimExtractor>,
        config: PipelineConfig,
    ) -> (Arc<AnalysisPipeline>, Arc<MemoryAnalysisStore>) {
        let store = Arc::new(MemoryAnalysisStore::new());
        let retriever = RetrieverDispatcher::new(
            RetrieverConfig::default(),
            WebPageRetriever::new(config.fetch_timeout()),
        );
        let pipeline = AnalysisPipeline::new(
            store.clone(),
            Ingestor::new(Arc::new(retriever), config.max_input_chars),
            ClaimExtractionService::new(extractor, None),
            EvidenceMatcher::new(corpus, config.clone()),
            config,
        );
        (Arc::new(pipeline), store)
    }

    fn pipeline_with_store(store: Arc<dyn AnalysisStore>) -> AnalysisPipeline {
        let config = test_config();
        let retriever = RetrieverDispatcher::new(
            RetrieverConfig::default(),
            WebPageRetriever::new(config.fetch_timeout()),
        );
        AnalysisPipeline::new(
            store,
            Ingestor::new(Arc::new(retriever), config.max_input_chars),
            ClaimExtractionService::new(Arc::new(HeuristicClaimExtractor::new()), None),
            EvidenceMatcher::new(Arc::new(StaticCorpus::builtin().unwrap()), config.clone()),
            config,
        )
    }

    /// Runs "Antibiotics cure colds" against a store whose `fail_on`-th save fails
    async fn run_with_failing_save(fail_on: u32) -> (Result<AnalysisStatus, PipelineError>, Analysis) {
        let store = Arc::new(FlakySaves {
            inner: MemoryAnalysisStore::new(),
            fail_on,
            saves: AtomicU32::new(0),
        });
        let analysis = AnalysisRequest::text("Antibiotics cure colds")
            .into_analysis()
            .unwrap();
        store.create_analysis(&analysis).await.unwrap();

        let pipeline = pipeline_with_store(store.clone());
        let outcome = pipeline.run(analysis.id).await;
        let stored = store.get_analysis(analysis.id).await.unwrap().unwrap();
        (outcome, stored)
    }

    fn default_pipeline() -> (Arc<AnalysisPipeline>, Arc<MemoryAnalysisStore>) {
        build(
            Arc::new(StaticCorpus::builtin().unwrap()),
            Arc::new(HeuristicClaimExtractor::new()),
            test_config(),
        )
    }

    async fn create(store: &MemoryAnalysisStore, request: AnalysisRequest) -> Uuid {
        let analysis = request.into_analysis().unwrap();
        store.create_analysis(&analysis).await.unwrap();
        analysis.id
    }

    async fn wait_terminal(pipeline: &AnalysisPipeline, id: Uuid) -> AnalysisReport {
        for _ in 0..200 {
            let report = pipeline.get_status(id).await.unwrap();
            if report.analysis.is_terminal() {
                return report;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("analysis {id} did not finish");
    }

    #[tokio::test]
    async fn test_antibiotics_scenario() {
        let (pipeline, store) = default_pipeline();
        let id = create(&store, AnalysisRequest::text("Antibiotics cure colds")).await;

        assert_eq!(pipeline.run(id).await.unwrap(), AnalysisStatus::Done);
        let report = pipeline.get_status(id).await.unwrap();

        assert!(!report.claims.is_empty());
        let first = &report.claims[0];
        assert_eq!(first.claim.topic, "antibiotics");
        assert_eq!(first.claim.stance, Some(Stance::Contradicted));
        assert!(first.claim.severity >= Some(Severity::High));
        assert!(
            first
                .citations
                .iter()
                .any(|c| c.source_org == "CDC" || c.source_org == "WHO")
        );
        assert!(report.analysis.when_to_seek_care.is_some());
        assert!(report.analysis.red_flags_detected);
        assert_eq!(report.analysis.overall_severity, first.claim.severity);
        assert_eq!(report.analysis.completed_steps, PipelineStep::ORDER.to_vec());
        assert!(report.analysis.disclaimer.is_some());
        assert_eq!(report.outputs.len(), 9);
    }

    #[tokio::test]
    async fn test_no_claims_still_completes() {
        let (pipeline, store) = default_pipeline();
        let id = create(&store, AnalysisRequest::text("I feel tired today")).await;

        assert_eq!(pipeline.run(id).await.unwrap(), AnalysisStatus::Done);
        let report = pipeline.get_status(id).await.unwrap();

        assert!(report.claims.is_empty());
        assert!(!report.analysis.red_flags_detected);
        assert!(report.analysis.topics.is_empty());
        assert_eq!(report.analysis.overall_severity, None);
        assert_eq!(report.outputs.len(), 9);
        let cells: std::collections::HashSet<(OutputFormat, OutputLength)> =
            report.outputs.iter().map(|o| (o.format, o.length)).collect();
        assert_eq!(cells.len(), 9);
        assert!(report.analysis.disclaimer.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_url_fails_at_ingest() {
        let (pipeline, store) = default_pipeline();
        let id = create(&store, AnalysisRequest::url("http://127.0.0.1:1/post")).await;

        assert_eq!(pipeline.run(id).await.unwrap(), AnalysisStatus::Error);
        let report = pipeline.get_status(id).await.unwrap();

        assert_eq!(report.analysis.current_step, Some(PipelineStep::Ingest));
        assert!(report.analysis.completed_steps.is_empty());
        assert!(
            report
                .analysis
                .error_message
                .as_deref()
                .unwrap()
                .starts_with("ingest")
        );
        assert!(report.claims.is_empty());
        assert!(report.outputs.is_empty());
    }

    #[tokio::test]
    async fn test_corpus_failure_mid_risk_keeps_classified_claims() {
        let config = PipelineConfig {
            risk_concurrency: 1,
            corpus_max_attempts: 1,
            ..test_config()
        };
        let corpus = Arc::new(FailAfter {
            inner: StaticCorpus::builtin().unwrap(),
            healthy_calls: 2,
            calls: AtomicU32::new(0),
        });
        let (pipeline, store) = build(corpus, Arc::new(HeuristicClaimExtractor::new()), config);
        let id = create(
            &store,
            AnalysisRequest::text(
                "Antibiotics cure colds. Vaccines cause autism. Herbal tea cures cancer.",
            ),
        )
        .await;

        assert_eq!(pipeline.run(id).await.unwrap(), AnalysisStatus::Error);
        let report = pipeline.get_status(id).await.unwrap();

        assert_eq!(report.analysis.current_step, Some(PipelineStep::Risk));
        assert_eq!(
            report.analysis.completed_steps,
            vec![PipelineStep::Ingest, PipelineStep::Claims]
        );
        assert!(report.analysis.error_message.as_deref().unwrap().starts_with("risk"));
        assert_eq!(report.analysis.overall_severity, None);

        assert_eq!(report.claims.len(), 3);
        for classified in &report.claims[..2] {
            assert!(classified.claim.is_classified());
            assert!(!classified.citations.is_empty());
        }
        assert!(!report.claims[2].claim.is_classified());
        assert!(report.outputs.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_fails_at_claims() {
        let (pipeline, store) = build(
            Arc::new(StaticCorpus::builtin().unwrap()),
            Arc::new(UnavailableExtractor),
            test_config(),
        );
        let id = create(&store, AnalysisRequest::text("Antibiotics cure colds")).await;

        assert_eq!(pipeline.run(id).await.unwrap(), AnalysisStatus::Error);
        let analysis = pipeline.get_status(id).await.unwrap().analysis;
        assert_eq!(analysis.current_step, Some(PipelineStep::Claims));
        assert_eq!(analysis.completed_steps, vec![PipelineStep::Ingest]);
        assert!(analysis.canonical_text.is_some());
        assert!(!analysis.error_message.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_failed_step_completion_write_ends_in_error() {
        // saves: begin ingest, ingest output, complete ingest, begin claims, complete claims
        let (outcome, stored) = run_with_failing_save(5).await;

        assert!(matches!(outcome, Err(PipelineError::Store(_))));
        assert_eq!(stored.status, AnalysisStatus::Error);
        assert_eq!(stored.current_step, Some(PipelineStep::Claims));
        assert_eq!(stored.completed_steps, vec![PipelineStep::Ingest]);
        assert_eq!(
            stored.error_message.as_deref(),
            Some("claims: internal storage error")
        );
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_begin_write_ends_in_error() {
        let (outcome, stored) = run_with_failing_save(1).await;

        assert!(outcome.is_err());
        assert_eq!(stored.status, AnalysisStatus::Error);
        assert_eq!(stored.current_step, Some(PipelineStep::Ingest));
        assert!(stored.completed_steps.is_empty());
    }

    #[tokio::test]
    async fn test_failed_final_write_ends_in_error() {
        // three saves per step except claims, which has no own save, then the final one
        let (outcome, stored) = run_with_failing_save(12).await;

        assert!(outcome.is_err());
        assert_eq!(stored.status, AnalysisStatus::Error);
        assert_eq!(stored.current_step, Some(PipelineStep::Response));
        assert!(
            stored
                .error_message
                .as_deref()
                .unwrap()
                .starts_with("response")
        );
    }

    #[tokio::test]
    async fn test_submit_runs_in_background() {
        let (pipeline, _store) = default_pipeline();
        let id = pipeline
            .submit(AnalysisRequest::text("Vaccines cause autism."))
            .await
            .unwrap();

        let report = wait_terminal(&pipeline, id).await;
        assert_eq!(report.analysis.status, AnalysisStatus::Done);
        assert!(report.analysis.red_flags.contains(&"vaccine_misinformation".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_submission_creates_nothing() {
        let (pipeline, _store) = default_pipeline();
        let err = pipeline
            .submit(AnalysisRequest::text("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Input(_)));
    }

    #[tokio::test]
    async fn test_terminal_analysis_cannot_be_rerun() {
        let (pipeline, store) = default_pipeline();
        let id = create(&store, AnalysisRequest::text("Antibiotics cure colds")).await;
        pipeline.run(id).await.unwrap();

        assert!(matches!(
            pipeline.run(id).await,
            Err(PipelineError::AlreadyStarted(_))
        ));
        assert!(matches!(
            pipeline.run(Uuid::new_v4()).await,
            Err(PipelineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_polling_terminal_analysis_is_idempotent() {
        let (pipeline, store) = default_pipeline();
        let id = create(&store, AnalysisRequest::text("Antibiotics cure colds")).await;
        pipeline.run(id).await.unwrap();

        let first = serde_json::to_string(&pipeline.get_status(id).await.unwrap()).unwrap();
        let second = serde_json::to_string(&pipeline.get_status(id).await.unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_severity_unset_before_risk() {
        let (pipeline, store) = default_pipeline();
        let id = create(&store, AnalysisRequest::text("Antibiotics cure colds")).await;
        let before = pipeline.get_status(id).await.unwrap().analysis;
        assert_eq!(before.status, AnalysisStatus::Pending);
        assert_eq!(before.overall_severity, None);
        assert!(before.completed_steps.is_empty());
    }
}
