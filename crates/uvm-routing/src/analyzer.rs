//! Analyzer - binds a config repository to the matching engine
//!
//! Each query loads a fresh snapshot (source config plus the configs in scope)
//! and runs the synchronous engine over it. Repository calls are bounded by the
//! analyzer's deadline.

use std::future::Future;
use std::time::Duration;

use uvm_core::{
    AbTestingAnalysis, AbTestingGroup, ConfigRepository, JourneyRules, JourneyTemplate,
    LenderConfig, UvmError, UvmResult,
};

use crate::journey::JourneySynthesizer;
use crate::resolver::{find_related, RelationReport};
use crate::variant::find_all_groups;

/// Point-in-time inputs of one query
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub source: LenderConfig,
    pub corpus: Vec<LenderConfig>,
}

/// Every result document for one source config
#[derive(Debug, Clone)]
pub struct CompleteAnalysis {
    pub source: LenderConfig,
    pub report: RelationReport,
    pub ab_analysis: AbTestingAnalysis,
    pub template: JourneyTemplate,
}

/// Query front end over a config repository
pub struct Analyzer<R: ConfigRepository> {
    repository: R,
    synthesizer: JourneySynthesizer,
    deadline: Duration,
}

impl<R: ConfigRepository> Analyzer<R> {
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(300);

    pub fn new(repository: R) -> Self {
        Self {
            repository,
            synthesizer: JourneySynthesizer::default(),
            deadline: Self::DEFAULT_DEADLINE,
        }
    }

    pub fn with_rules(mut self, rules: JourneyRules) -> Self {
        self.synthesizer = JourneySynthesizer::new(rules);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn synthesizer(&self) -> &JourneySynthesizer {
        &self.synthesizer
    }

    async fn bounded<T, F>(&self, operation: String, call: F) -> UvmResult<T>
    where
        F: Future<Output = UvmResult<T>>,
    {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(UvmError::Timeout {
                operation,
                elapsed: self.deadline,
            }),
        }
    }

    /// Configs in `scope`
    pub async fn load_scope(&self, scope: &str) -> UvmResult<Vec<LenderConfig>> {
        self.bounded(
            format!("loading scope '{}'", scope),
            self.repository.load_configs(scope),
        )
        .await
    }

    /// Source config plus the configs in `scope`
    pub async fn snapshot(&self, id: i64, scope: &str) -> UvmResult<Snapshot> {
        let source = self
            .bounded(
                format!("loading config {}", id),
                self.repository.load_config(id),
            )
            .await?;
        let corpus = self.load_scope(scope).await?;

        tracing::debug!("Snapshot for config {}: {} configs in scope", id, corpus.len());
        Ok(Snapshot { source, corpus })
    }

    pub async fn search_related(
        &self,
        id: i64,
        lead_source: Option<&str>,
        scope: &str,
    ) -> UvmResult<RelationReport> {
        let snapshot = self.snapshot(id, scope).await?;
        Ok(find_related(&snapshot.source, lead_source, &snapshot.corpus))
    }

    /// Every A/B group in `scope`
    pub async fn ab_groups(&self, scope: &str) -> UvmResult<Vec<AbTestingGroup>> {
        let corpus = self.load_scope(scope).await?;
        Ok(find_all_groups(&corpus))
    }

    /// All groups in scope plus the routing targets of `id`
    pub async fn ab_analysis(
        &self,
        id: i64,
        lead_source: Option<&str>,
        scope: &str,
    ) -> UvmResult<AbTestingAnalysis> {
        let snapshot = self.snapshot(id, scope).await?;
        let report = find_related(&snapshot.source, lead_source, &snapshot.corpus);
        Ok(AbTestingAnalysis::new(
            id,
            find_all_groups(&snapshot.corpus),
            &report.related,
        ))
    }

    pub async fn journey_template(
        &self,
        id: i64,
        lead_source: Option<&str>,
        scope: &str,
    ) -> UvmResult<JourneyTemplate> {
        let snapshot = self.snapshot(id, scope).await?;
        let report = find_related(&snapshot.source, lead_source, &snapshot.corpus);
        Ok(self
            .synthesizer
            .build_template(&snapshot.source, &report, &snapshot.corpus))
    }

    /// Relations, A/B analysis and journeys computed over one snapshot
    pub async fn analyze(
        &self,
        id: i64,
        lead_source: Option<&str>,
        scope: &str,
    ) -> UvmResult<CompleteAnalysis> {
        let Snapshot { source, corpus } = self.snapshot(id, scope).await?;

        let report = find_related(&source, lead_source, &corpus);
        let ab_analysis = AbTestingAnalysis::new(id, find_all_groups(&corpus), &report.related);
        let template = self.synthesizer.build_template(&source, &report, &corpus);

        tracing::info!(
            "Analysis of config {}: {} A/B groups, {} journeys",
            id,
            ab_analysis.ab_testing_groups.len(),
            template.journeys.len()
        );

        Ok(CompleteAnalysis {
            source,
            report,
            ab_analysis,
            template,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use uvm_core::InMemoryRepository;

    /// Repository that never answers within a test deadline
    struct SlowRepository;

    #[async_trait]
    impl ConfigRepository for SlowRepository {
        async fn load_configs(&self, _scope: &str) -> UvmResult<Vec<LenderConfig>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        async fn load_config(&self, id: i64) -> UvmResult<LenderConfig> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(LenderConfig::new(id, "slow"))
        }
    }

    fn corpus() -> Vec<LenderConfig> {
        vec![
            LenderConfig::new(1, "collect")
                .with_tags([("product_code", "P1"), ("flow_type", "normal")])
                .with_ui_version("v1")
                .with_ui_flow(["otp", "a"])
                .with_weight(1),
            LenderConfig::new(2, "collect")
                .with_tags([("product_code", "P1"), ("flow_type", "normal")])
                .with_ui_version("v1")
                .with_ui_flow(["otp", "b"])
                .with_weight(1),
            LenderConfig::new(3, "auto")
                .with_tags([("product_code", "P1"), ("flow_type", "auto_pcb")])
                .with_ui_version("v2")
                .with_weight(1),
        ]
    }

    #[tokio::test]
    async fn test_analyze_in_memory() {
        let analyzer = Analyzer::new(InMemoryRepository::new(corpus()));
        let analysis = analyzer.analyze(1, None, "").await.unwrap();

        assert_eq!(analysis.report.related.len(), 2);
        assert_eq!(analysis.ab_analysis.ab_testing_groups.len(), 1);
        assert_eq!(analysis.ab_analysis.normal_results.len(), 1);
        assert_eq!(analysis.ab_analysis.total_results, 2);

        assert_eq!(analysis.template.related_config_ids, vec![3]);
        assert_eq!(analysis.template.journeys.len(), 2);
        assert_eq!(analysis.template.journeys[1].flow_type, "normal_to_auto_pcb");
        assert_eq!(analysis.template.journeys[1].steps.len(), 20);
    }

    #[tokio::test]
    async fn test_missing_source_is_not_found() {
        let analyzer = Analyzer::new(InMemoryRepository::new(corpus()));
        let err = analyzer.search_related(42, None, "").await.unwrap_err();
        assert!(matches!(err, UvmError::NotFound { id: 42 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let analyzer = Analyzer::new(SlowRepository).with_deadline(Duration::from_secs(5));

        let err = analyzer.ab_groups("evo").await.unwrap_err();
        match err {
            UvmError::Timeout { operation, elapsed } => {
                assert!(operation.contains("evo"));
                assert_eq!(elapsed, Duration::from_secs(5));
            }
            other => panic!("expected timeout, got {other}"),
        }
    }
}
