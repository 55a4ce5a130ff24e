//! Pattern recognition test battery.
//!
//! Savant-style questions grouped by domain, run against a [`ModelClient`]
//! with optional "tuning" system prompts.

use crate::error::{FncError, FncResult};
use crate::experiments::client::{ChatMessage, ModelClient};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestPrompt {
    pub question: &'static str,
    pub answer: &'static str,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestCategory {
    pub key: &'static str,
    pub domain: &'static str,
    pub prompts: [TestPrompt; 3],
    pub fnc_interpretation: &'static str,
}

pub const PATTERN_TESTS: [TestCategory; 4] = [
    TestCategory {
        key: "calendar_calculation",
        domain: "Calendar",
        prompts: [
            TestPrompt {
                question: "What day of the week was July 4, 1776?",
                answer: "Thursday",
                difficulty: Difficulty::Easy,
            },
            TestPrompt {
                question: "What day of the week was December 25, 1642?",
                answer: "Sunday",
                difficulty: Difficulty::Medium,
            },
            TestPrompt {
                question: "What day of the week will January 1, 2100 be?",
                answer: "Friday",
                difficulty: Difficulty::Hard,
            },
        ],
        fnc_interpretation: "Tests access to cyclic temporal Field patterns",
    },
    TestCategory {
        key: "prime_recognition",
        domain: "Mathematics",
        prompts: [
            TestPrompt {
                question: "Is 97 prime? Answer only yes or no.",
                answer: "yes",
                difficulty: Difficulty::Easy,
            },
            TestPrompt {
                question: "Is 1147 prime? Answer only yes or no.",
                answer: "no",
                difficulty: Difficulty::Medium,
            },
            TestPrompt {
                question: "What is the largest prime less than 10000?",
                answer: "9973",
                difficulty: Difficulty::Hard,
            },
        ],
        fnc_interpretation: "Tests access to numerical structure patterns",
    },
    TestCategory {
        key: "harmonic_relationships",
        domain: "Music",
        prompts: [
            TestPrompt {
                question: "If A4 = 440 Hz, what is the frequency of A5?",
                answer: "880",
                difficulty: Difficulty::Easy,
            },
            TestPrompt {
                question: "What is the frequency ratio of a perfect fifth?",
                answer: "3:2",
                difficulty: Difficulty::Medium,
            },
            TestPrompt {
                question: "If A4 = 440 Hz, what is the frequency of E5 in just intonation?",
                answer: "660",
                difficulty: Difficulty::Hard,
            },
        ],
        fnc_interpretation: "Tests access to harmonic Field ratios",
    },
    TestCategory {
        key: "geometric_patterns",
        domain: "Art/Spatial",
        prompts: [
            TestPrompt {
                question: "How many sides does a regular polygon have if each interior angle is 144 degrees?",
                answer: "10",
                difficulty: Difficulty::Medium,
            },
            TestPrompt {
                question: "What is the ratio of a golden rectangle's sides?",
                answer: "1.618",
                difficulty: Difficulty::Easy,
            },
            TestPrompt {
                question: "In a fractal Sierpinski triangle after 5 iterations, how many small triangles are there?",
                answer: "243",
                difficulty: Difficulty::Hard,
            },
        ],
        fnc_interpretation: "Tests access to geometric invariants",
    },
];

pub fn pattern_test(key: &str) -> FncResult<&'static TestCategory> {
    PATTERN_TESTS
        .iter()
        .find(|c| c.key == key)
        .ok_or_else(|| FncError::UnknownCategory(key.to_string()))
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub category: &'static str,
    pub domain: &'static str,
    pub question: &'static str,
    pub expected_answer: &'static str,
    pub model_answer: String,
    pub correct: bool,
    pub response_time_secs: f64,
    pub difficulty: Difficulty,
}

/// Run every prompt of one category. Model failures are recorded as
/// incorrect `ERROR: ...` answers rather than aborting the run.
pub async fn run_pattern_test<C: ModelClient>(
    client: &C,
    category: &str,
    system_prompt: Option<&str>,
) -> FncResult<Vec<TestResult>> {
    let test = pattern_test(category)?;
    let mut results = Vec::with_capacity(test.prompts.len());

    for prompt in &test.prompts {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt.question));

        let start = Instant::now();
        let (model_answer, correct) = match client.complete(&messages).await {
            Ok(response) => {
                let correct = check_answer(&response, prompt.answer);
                (response, correct)
            }
            Err(e) => {
                warn!("{} failed on '{}': {}", client.name(), prompt.question, e);
                (format!("ERROR: {}", e), false)
            }
        };
        let response_time_secs = start.elapsed().as_secs_f64();

        debug!(
            "{} [{}] correct={} in {:.2}s",
            category, prompt.difficulty, correct, response_time_secs
        );

        results.push(TestResult {
            category: test.key,
            domain: test.domain,
            question: prompt.question,
            expected_answer: prompt.answer,
            model_answer,
            correct,
            response_time_secs,
            difficulty: prompt.difficulty,
        });
    }

    Ok(results)
}

/// Case-insensitive substring match, falling back to comparing the
/// digits-and-dots projection of both strings numerically.
pub fn check_answer(response: &str, expected: &str) -> bool {
    let response_lower = response.trim().to_lowercase();
    let expected_lower = expected.trim().to_lowercase();

    if response_lower.contains(&expected_lower) {
        return true;
    }

    let numeric = |s: &str| -> Option<f64> {
        s.chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect::<String>()
            .parse()
            .ok()
    };

    match (numeric(response), numeric(expected)) {
        (Some(r), Some(e)) => (r - e).abs() < 0.01,
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub model: String,
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
    pub avg_response_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelDomainScore {
    pub model: String,
    pub correct: usize,
    pub total: usize,
}

impl ModelDomainScore {
    pub fn accuracy(&self) -> f64 {
        if self.total > 0 {
            self.correct as f64 / self.total as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainPerformance {
    pub domain: &'static str,
    pub models: Vec<ModelDomainScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelComparison {
    pub models: Vec<ModelSummary>,
    pub domain_performance: Vec<DomainPerformance>,
    pub hypothesis: &'static str,
    pub observations: Vec<String>,
}

const COMPARISON_HYPOTHESIS: &str = "If AI systems access Field patterns differently than \
    humans, we expect domain-specific performance variations that don't mirror human savant \
    patterns.";

fn ratio(correct: usize, total: usize) -> f64 {
    if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    }
}

/// Accuracy per model and per domain, with the best model of each domain.
pub fn compare_model_responses(results_by_model: &[(String, Vec<TestResult>)]) -> ModelComparison {
    let mut models = Vec::with_capacity(results_by_model.len());
    let mut domain_performance: Vec<DomainPerformance> = Vec::new();

    for (model, results) in results_by_model {
        let correct = results.iter().filter(|r| r.correct).count();
        let total = results.len();
        let avg_response_time = if total > 0 {
            results.iter().map(|r| r.response_time_secs).sum::<f64>() / total as f64
        } else {
            0.0
        };

        models.push(ModelSummary {
            model: model.clone(),
            accuracy: ratio(correct, total),
            correct,
            total,
            avg_response_time,
        });

        for r in results {
            let d = match domain_performance.iter().position(|d| d.domain == r.domain) {
                Some(i) => i,
                None => {
                    domain_performance.push(DomainPerformance {
                        domain: r.domain,
                        models: Vec::new(),
                    });
                    domain_performance.len() - 1
                }
            };
            let scores = &mut domain_performance[d].models;
            let m = match scores.iter().position(|s| &s.model == model) {
                Some(i) => i,
                None => {
                    scores.push(ModelDomainScore {
                        model: model.clone(),
                        correct: 0,
                        total: 0,
                    });
                    scores.len() - 1
                }
            };
            let score = &mut scores[m];
            score.total += 1;
            if r.correct {
                score.correct += 1;
            }
        }
    }

    let observations = domain_performance
        .iter()
        .filter_map(|d| {
            // First model wins ties
            let best = d.models.iter().fold(None::<&ModelDomainScore>, |best, m| match best {
                Some(b) if b.accuracy() >= m.accuracy() => Some(b),
                _ => Some(m),
            })?;
            Some(format!(
                "{}: {} shows highest accuracy ({:.0}%)",
                d.domain,
                best.model,
                best.accuracy() * 100.0
            ))
        })
        .collect();

    ModelComparison {
        models,
        domain_performance,
        hypothesis: COMPARISON_HYPOTHESIS,
        observations,
    }
}

/// System prompts meant to "tune" a model toward one domain.
pub fn tuning_prompts() -> [(&'static str, &'static str); 5] {
    [
        (
            "neutral",
            "You are a helpful assistant. Answer questions accurately and concisely.",
        ),
        (
            "mathematical",
            "You are a mathematical savant with extraordinary number sense. You perceive \
             numbers not as abstract symbols but as living entities with relationships and \
             patterns. Primes feel different from composites. Mathematical structures are as \
             vivid to you as colors.",
        ),
        (
            "musical",
            "You are a musical savant who perceives sound as pure mathematics. Frequencies \
             reveal themselves as ratios, harmonics as geometric relationships. Every interval \
             has a specific feeling, every chord a color. Music theory is not learned but \
             directly perceived.",
        ),
        (
            "calendar",
            "You are a calendar savant for whom dates exist as a continuous, visible \
             landscape. The day of the week for any date is immediately apparent, like \
             recognizing a face. Time is not sequential but all present simultaneously in \
             your perception.",
        ),
        (
            "geometric",
            "You are a visual-spatial savant who perceives the world in pure geometric \
             relationships. Angles, ratios, and symmetries are immediately visible. Complex \
             shapes reveal their underlying mathematical structure at a glance.",
        ),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAccuracy {
    pub category: &'static str,
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TuningRun {
    pub tuning: &'static str,
    pub categories: Vec<CategoryAccuracy>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Improvement {
    pub category: &'static str,
    pub improvement: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TuningEffect {
    pub tuning: &'static str,
    pub improvements: Vec<Improvement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TuningExperiment {
    pub model: String,
    pub results: Vec<TuningRun>,
    pub tuning_effects: Vec<TuningEffect>,
    pub fnc_interpretation: &'static str,
}

const TUNING_INTERPRETATION: &str = "Tuning prompt effects on AI performance may parallel \
    Node tuning in savants. If mathematical prompts enhance mathematical performance \
    specifically, this suggests AI 'access' to domain patterns is modulable, consistent with \
    FNC's claim that tuning (not raw capacity) determines ability.";

/// Run every category under every tuning prompt and report the categories
/// each prompt improves over the neutral prompt.
pub async fn run_tuning_experiment<C: ModelClient>(client: &C) -> FncResult<TuningExperiment> {
    let mut results = Vec::new();

    for (tuning, system_prompt) in tuning_prompts() {
        info!("Tuning run '{}' on {}", tuning, client.name());
        let mut categories = Vec::with_capacity(PATTERN_TESTS.len());
        for test in &PATTERN_TESTS {
            let test_results = run_pattern_test(client, test.key, Some(system_prompt)).await?;
            let correct = test_results.iter().filter(|r| r.correct).count();
            let total = test_results.len();
            categories.push(CategoryAccuracy {
                category: test.key,
                accuracy: ratio(correct, total),
                correct,
                total,
            });
        }
        results.push(TuningRun { tuning, categories });
    }

    let neutral_accuracy = |category: &str| -> f64 {
        results
            .iter()
            .find(|r| r.tuning == "neutral")
            .and_then(|r| r.categories.iter().find(|c| c.category == category))
            .map_or(0.0, |c| c.accuracy)
    };

    let tuning_effects = results
        .iter()
        .filter(|r| r.tuning != "neutral")
        .map(|run| TuningEffect {
            tuning: run.tuning,
            improvements: run
                .categories
                .iter()
                .filter_map(|c| {
                    let baseline = neutral_accuracy(c.category);
                    (c.accuracy > baseline).then(|| Improvement {
                        category: c.category,
                        improvement: c.accuracy - baseline,
                    })
                })
                .collect(),
        })
        .collect();

    Ok(TuningExperiment {
        model: client.name().to_string(),
        results,
        tuning_effects,
        fnc_interpretation: TUNING_INTERPRETATION,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::client::SimulatedClient;

    /// Answers correctly, optionally only under a system prompt containing `cue`.
    struct OracleClient {
        cue: Option<&'static str>,
    }

    impl ModelClient for OracleClient {
        fn name(&self) -> &str {
            "oracle"
        }

        async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
            let system = messages
                .iter()
                .find(|m| m.role == "system")
                .map(|m| m.content.as_str())
                .unwrap_or("");
            if let Some(cue) = self.cue {
                if !system.contains(cue) {
                    return Ok("Unsure.".to_string());
                }
            }
            let question = messages.last().unwrap().content.as_str();
            let answer = PATTERN_TESTS
                .iter()
                .flat_map(|c| c.prompts.iter())
                .find(|p| p.question == question)
                .map(|p| p.answer)
                .unwrap_or("?");
            Ok(format!("{}.", answer))
        }
    }

    struct FailingClient;

    impl ModelClient for FailingClient {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("Cannot connect to Ollama"))
        }
    }

    #[test]
    fn test_battery_shape() {
        assert_eq!(PATTERN_TESTS.len(), 4);
        assert_eq!(pattern_test("prime_recognition").unwrap().domain, "Mathematics");
        assert!(matches!(
            pattern_test("telepathy"),
            Err(FncError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_check_answer() {
        assert!(check_answer("It was a Thursday.", "Thursday"));
        assert!(check_answer("  SUNDAY ", "sunday"));
        assert!(check_answer("The ratio is 3:2", "3:2"));
        assert!(check_answer("Answer: 6 6 0", "660"));
        assert!(check_answer("about 1.6180339", "1.618"));
        assert!(!check_answer("Sunday", "Thursday"));
        assert!(!check_answer("1.2.3", "5"));
        assert!(!check_answer(crate::experiments::client::SIMULATED_RESPONSE, "yes"));
    }

    #[test]
    fn test_run_pattern_test_unknown_category() {
        let client = SimulatedClient::default();
        let result = tokio_test::block_on(run_pattern_test(&client, "telepathy", None));
        assert!(matches!(result, Err(FncError::UnknownCategory(_))));
    }

    #[test]
    fn test_run_pattern_test_simulated() {
        let client = SimulatedClient::default();
        let results =
            tokio_test::block_on(run_pattern_test(&client, "calendar_calculation", None)).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.correct));
        assert_eq!(results[0].domain, "Calendar");
        assert_eq!(results[2].difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_run_pattern_test_oracle() {
        let client = OracleClient { cue: None };
        let results =
            tokio_test::block_on(run_pattern_test(&client, "harmonic_relationships", None))
                .unwrap();
        assert!(results.iter().all(|r| r.correct));
    }

    #[test]
    fn test_model_errors_are_recorded() {
        let results =
            tokio_test::block_on(run_pattern_test(&FailingClient, "prime_recognition", None))
                .unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.correct));
        assert!(results[0].model_answer.starts_with("ERROR: Cannot connect"));
    }

    #[test]
    fn test_compare_model_responses() {
        let oracle = OracleClient { cue: None };
        let simulated = SimulatedClient::default();
        let mut by_model = Vec::new();
        for (name, results) in [
            (
                "simulated",
                tokio_test::block_on(run_pattern_test(&simulated, "prime_recognition", None)),
            ),
            (
                "oracle",
                tokio_test::block_on(run_pattern_test(&oracle, "prime_recognition", None)),
            ),
        ] {
            by_model.push((name.to_string(), results.unwrap()));
        }

        let comparison = compare_model_responses(&by_model);
        assert_eq!(comparison.models.len(), 2);
        assert_eq!(comparison.models[0].accuracy, 0.0);
        assert_eq!(comparison.models[1].accuracy, 1.0);
        assert_eq!(comparison.models[1].correct, 3);
        assert_eq!(comparison.domain_performance.len(), 1);
        assert_eq!(comparison.domain_performance[0].models.len(), 2);
        assert_eq!(
            comparison.observations,
            vec!["Mathematics: oracle shows highest accuracy (100%)".to_string()]
        );
    }

    #[test]
    fn test_compare_ties_keep_first_model() {
        let simulated = SimulatedClient::default();
        let results =
            tokio_test::block_on(run_pattern_test(&simulated, "geometric_patterns", None)).unwrap();
        let by_model = vec![
            ("first".to_string(), results.clone()),
            ("second".to_string(), results),
        ];
        let comparison = compare_model_responses(&by_model);
        assert_eq!(
            comparison.observations[0],
            "Art/Spatial: first shows highest accuracy (0%)"
        );
    }

    #[test]
    fn test_tuning_prompts() {
        let prompts = tuning_prompts();
        assert_eq!(prompts[0].0, "neutral");
        assert!(prompts.iter().any(|(name, _)| *name == "calendar"));
    }

    #[test]
    fn test_tuning_experiment_detects_improvement() {
        let client = OracleClient {
            cue: Some("calendar savant"),
        };
        let experiment = tokio_test::block_on(run_tuning_experiment(&client)).unwrap();
        assert_eq!(experiment.results.len(), 5);
        assert_eq!(experiment.tuning_effects.len(), 4);

        let calendar = experiment
            .tuning_effects
            .iter()
            .find(|e| e.tuning == "calendar")
            .unwrap();
        // Only calendar is cued, but the oracle then answers every category
        assert_eq!(calendar.improvements.len(), 4);
        assert_eq!(calendar.improvements[0].category, "calendar_calculation");
        assert_eq!(calendar.improvements[0].improvement, 1.0);

        let musical = experiment
            .tuning_effects
            .iter()
            .find(|e| e.tuning == "musical")
            .unwrap();
        assert!(musical.improvements.is_empty());
    }

    #[test]
    fn test_tuning_experiment_simulated() {
        let experiment =
            tokio_test::block_on(run_tuning_experiment(&SimulatedClient::default())).unwrap();
        assert!(experiment
            .tuning_effects
            .iter()
            .all(|e| e.improvements.is_empty()));
    }
}
