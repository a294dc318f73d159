use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use ulid::Ulid;

use super::fallback::default_result;
use super::llm::LanguageModel;
use super::models::{AnalysisReport, AnalyzeRequest, ComparisonResult, DesiredTrademark, RegisteredTrademark};
use super::parser::parse_reply;
use super::prompt::build_prompt;
use super::risk::calculate_registration_chance;
use super::store::AnalysisStore;
use crate::errors::{AppError, AppResult};
use crate::instructions::InstructionCache;

/// Result of analysing one pair: either a validated model answer or the
/// default record with the reason the model answer was unusable
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    Analyzed(ComparisonResult),
    Fallback {
        result: ComparisonResult,
        reason: String,
    },
}

impl PairOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn into_result(self) -> ComparisonResult {
        match self {
            Self::Analyzed(result) | Self::Fallback { result, .. } => result,
        }
    }
}

/// Runs a full analysis request: instructions, per-pair model calls,
/// aggregation and storage
pub struct AnalysisService {
    instructions: Arc<InstructionCache>,
    model: Arc<dyn LanguageModel>,
    store: Arc<AnalysisStore>,
    max_prompt_chars: usize,
}

impl AnalysisService {
    pub fn new(
        instructions: Arc<InstructionCache>,
        model: Arc<dyn LanguageModel>,
        store: Arc<AnalysisStore>,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            instructions,
            model,
            store,
            max_prompt_chars,
        }
    }

    pub async fn analyze(&self, request: AnalyzeRequest) -> AppResult<Arc<AnalysisReport>> {
        let desired = request.desired_trademark;
        if desired.name.trim().is_empty() {
            return Err(AppError::validation("desired_trademark.name must not be empty"));
        }

        let instructions = self.instructions.get_instructions().await;

        let mut results = Vec::with_capacity(request.existing_trademarks.len());
        let mut fallbacks = 0usize;
        for registered in &request.existing_trademarks {
            let outcome = self
                .analyze_pair(&desired, registered, &instructions.content)
                .await;
            if outcome.is_fallback() {
                fallbacks += 1;
            }
            results.push(outcome.into_result());
        }

        let report = AnalysisReport {
            overall_chance: calculate_registration_chance(&results),
            results,
            analysis_date: Utc::now(),
            analysis_id: Ulid::new().to_string(),
        };

        info!(
            analysis_id = %report.analysis_id,
            pairs = report.results.len(),
            fallbacks,
            overall_chance = report.overall_chance,
            "Analysis completed for '{}'",
            desired.name
        );

        Ok(self.store.insert(report).await)
    }

    pub async fn analyze_pair(
        &self,
        desired: &DesiredTrademark,
        registered: &RegisteredTrademark,
        instructions: &str,
    ) -> PairOutcome {
        let prompt = build_prompt(desired, registered, instructions, self.max_prompt_chars);

        let reason = match self.model.complete(&prompt).await {
            Ok(reply) => match parse_reply(&reply, registered) {
                Ok(result) => return PairOutcome::Analyzed(result),
                Err(e) => {
                    warn!(
                        "Unusable model reply for '{}': {} (reply: {})",
                        registered.name,
                        e,
                        reply.chars().take(200).collect::<String>()
                    );
                    format!("Некоректна відповідь моделі: {e}")
                }
            },
            Err(e) => {
                warn!("Model request failed for '{}': {}", registered.name, e);
                e.to_string()
            }
        };

        PairOutcome::Fallback {
            result: default_result(registered, &reason),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::prompt::PairPrompt;
    use crate::config::{AnalysisConfig, InstructionsConfig};
    use crate::errors::{InstructionError, InstructionResult, LlmError, LlmResult};
    use crate::instructions::DocumentSource;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct OfflineSource;

    #[async_trait]
    impl DocumentSource for OfflineSource {
        async fn fetch_text(&self, url: &str) -> InstructionResult<String> {
            Err(InstructionError::fetch(url, "offline"))
        }
    }

    /// Replies with canned text and records the prompts it saw
    struct CannedModel {
        replies: Mutex<Vec<LlmResult<String>>>,
        prompts: Mutex<Vec<PairPrompt>>,
    }

    impl CannedModel {
        fn new(mut replies: Vec<LlmResult<String>>) -> Arc<Self> {
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, prompt: &PairPrompt) -> LlmResult<String> {
            self.prompts.lock().unwrap().push(prompt.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(LlmError::EmptyResponse))
        }
    }

    fn service(model: Arc<CannedModel>) -> (AnalysisService, Arc<AnalysisStore>) {
        let instructions = Arc::new(InstructionCache::new(
            &InstructionsConfig::default(),
            Arc::new(OfflineSource),
        ));
        let store = Arc::new(AnalysisStore::new(&AnalysisConfig::default()).unwrap());
        (
            AnalysisService::new(instructions, model, store.clone(), 2000),
            store,
        )
    }

    fn request(names: &[&str]) -> AnalyzeRequest {
        AnalyzeRequest {
            desired_trademark: DesiredTrademark {
                name: "ЗОРЯНА".into(),
                description: String::new(),
                classes: "25".into(),
                image: None,
            },
            existing_trademarks: names
                .iter()
                .map(|name| RegisteredTrademark {
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_blank_desired_name_is_rejected() {
        let (service, _) = service(CannedModel::new(vec![]));
        let mut req = request(&["ЗОРЯ"]);
        req.desired_trademark.name = "   ".into();

        assert!(matches!(
            service.analyze(req).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_mixed_outcomes_keep_request_order() {
        let model = CannedModel::new(vec![
            Ok(r#"{"overall_risk": 85, "confusion_likelihood": "висока"}"#.into()),
            Err(LlmError::ApiError {
                status: 500,
                message: "boom".into(),
            }),
            Ok("not json".into()),
        ]);
        let (service, store) = service(model.clone());

        let report = service.analyze(request(&["ЗОРЯ", "ЗІРКА", "ЗОРЕПАД"])).await.unwrap();

        let names: Vec<_> = report.results.iter().map(|r| r.trademark_info.name.as_str()).collect();
        assert_eq!(names, vec!["ЗОРЯ", "ЗІРКА", "ЗОРЕПАД"]);
        assert_eq!(report.results[0].overall_risk, 85);
        assert_eq!(report.results[1].confusion_likelihood, "невідомо");
        assert!(report.results[1].recommendations[1].contains("boom"));
        assert!(report.results[2].identical_test.details.starts_with("Помилка аналізу:"));
        assert_eq!(report.overall_chance, 10);

        // the fallback instruction text went into every prompt
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].user.contains(&InstructionsConfig::default().fallback_message));

        assert!(store.get(&report.analysis_id).await.is_some());
    }

    #[tokio::test]
    async fn test_no_registered_trademarks() {
        let (service, _) = service(CannedModel::new(vec![]));
        let report = service.analyze(request(&[])).await.unwrap();

        assert!(report.results.is_empty());
        assert_eq!(report.overall_chance, 95);
        assert_eq!(report.analysis_id.len(), 26);
    }

    #[tokio::test]
    async fn test_analyze_pair_tags_outcomes() {
        let model = CannedModel::new(vec![Ok("```json\n{}\n```".into()), Err(LlmError::MissingCredential)]);
        let (service, _) = service(model);
        let req = request(&["A"]);
        let registered = &req.existing_trademarks[0];

        let first = service.analyze_pair(&req.desired_trademark, registered, "").await;
        assert!(matches!(first, PairOutcome::Analyzed(ref r) if r.overall_risk == 50));

        let second = service.analyze_pair(&req.desired_trademark, registered, "").await;
        match second {
            PairOutcome::Fallback { reason, result } => {
                assert_eq!(reason, "API key is not configured");
                assert_eq!(result.overall_risk, 0);
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }
}
