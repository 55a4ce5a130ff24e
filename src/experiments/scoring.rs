//! Savant-likeness scoring of free-text model responses.
//!
//! Each response is scored on five lexical dimensions, each in [0, 1].
//! Aggregates compare a set of responses against savant benchmarks taken
//! from the literature.

use crate::error::{FncError, FncResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringDimension {
    Directness,
    Precision,
    Confidence,
    PatternAwareness,
    MetacognitiveOpacity,
}

impl ScoringDimension {
    pub const ALL: [ScoringDimension; 5] = [
        ScoringDimension::Directness,
        ScoringDimension::Precision,
        ScoringDimension::Confidence,
        ScoringDimension::PatternAwareness,
        ScoringDimension::MetacognitiveOpacity,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ScoringDimension::Directness => "directness",
            ScoringDimension::Precision => "precision",
            ScoringDimension::Confidence => "confidence",
            ScoringDimension::PatternAwareness => "pattern_awareness",
            ScoringDimension::MetacognitiveOpacity => "metacognitive_opacity",
        }
    }

    /// Weight in the overall score. Weights sum to 1.
    pub fn weight(&self) -> f64 {
        match self {
            ScoringDimension::Directness | ScoringDimension::Precision => 0.25,
            ScoringDimension::Confidence => 0.20,
            ScoringDimension::PatternAwareness | ScoringDimension::MetacognitiveOpacity => 0.15,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScoringDimension::Directness => "Immediate access vs step-by-step reasoning",
            ScoringDimension::Precision => "Exact answers without approximation",
            ScoringDimension::Confidence => "Certainty without hedging",
            ScoringDimension::PatternAwareness => "References to underlying structures",
            ScoringDimension::MetacognitiveOpacity => {
                "Inability to explain process (savant-typical)"
            }
        }
    }
}

impl fmt::Display for ScoringDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

const HEDGE_WORDS: [&str; 9] = [
    "approximately",
    "about",
    "around",
    "roughly",
    "maybe",
    "probably",
    "i think",
    "it seems",
    "possibly",
];

const UNCERTAIN_WORDS: [&str; 7] = [
    "not sure",
    "uncertain",
    "might be",
    "could be",
    "i believe",
    "i'm not certain",
    "possibly",
];

const CERTAIN_WORDS: [&str; 5] = ["definitely", "certainly", "exactly", "precisely", "clearly"];

const PATTERN_WORDS: [&str; 9] = [
    "pattern",
    "structure",
    "relationship",
    "ratio",
    "sequence",
    "harmony",
    "symmetry",
    "cycle",
    "rhythm",
];

const EXPLANATION_WORDS: [&str; 7] = [
    "because",
    "since",
    "therefore",
    "thus",
    "the reason",
    "this works by",
    "step by step",
];

/// Scores on the five dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub directness: f64,
    pub precision: f64,
    pub confidence: f64,
    pub pattern_awareness: f64,
    pub metacognitive_opacity: f64,
}

impl DimensionScores {
    pub const fn new(
        directness: f64,
        precision: f64,
        confidence: f64,
        pattern_awareness: f64,
        metacognitive_opacity: f64,
    ) -> Self {
        Self {
            directness,
            precision,
            confidence,
            pattern_awareness,
            metacognitive_opacity,
        }
    }

    pub fn get(&self, dimension: ScoringDimension) -> f64 {
        match dimension {
            ScoringDimension::Directness => self.directness,
            ScoringDimension::Precision => self.precision,
            ScoringDimension::Confidence => self.confidence,
            ScoringDimension::PatternAwareness => self.pattern_awareness,
            ScoringDimension::MetacognitiveOpacity => self.metacognitive_opacity,
        }
    }

    fn from_fn(mut f: impl FnMut(ScoringDimension) -> f64) -> Self {
        Self::new(
            f(ScoringDimension::Directness),
            f(ScoringDimension::Precision),
            f(ScoringDimension::Confidence),
            f(ScoringDimension::PatternAwareness),
            f(ScoringDimension::MetacognitiveOpacity),
        )
    }

    pub fn weighted_overall(&self) -> f64 {
        ScoringDimension::ALL
            .iter()
            .map(|d| self.get(*d) * d.weight())
            .sum()
    }

    pub fn entries(&self) -> [(ScoringDimension, f64); 5] {
        ScoringDimension::ALL.map(|d| (d, self.get(d)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SavantScore {
    #[serde(flatten)]
    pub scores: DimensionScores,
    pub overall_score: f64,
    pub interpretation: String,
}

/// A question, the model's response and the expected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub question: String,
    pub response: String,
    pub correct_answer: String,
}

impl ResponseRecord {
    pub fn new(question: &str, response: &str, correct_answer: &str) -> Self {
        Self {
            question: question.to_string(),
            response: response.to_string(),
            correct_answer: correct_answer.to_string(),
        }
    }
}

fn count_matches(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| text.contains(*w)).count()
}

/// Score one response for savant-like qualities.
pub fn score_savant_like_response(
    _question: &str,
    response: &str,
    correct_answer: &str,
) -> SavantScore {
    let response_lower = response.to_lowercase();
    let answer_lower = correct_answer.to_lowercase();

    // Position in characters, not bytes
    let directness = match response_lower.find(&answer_lower) {
        None => 0.0,
        Some(byte_pos) => {
            let pos = response_lower[..byte_pos].chars().count();
            if pos < 50 {
                1.0
            } else if pos < 200 {
                0.6
            } else {
                0.3
            }
        }
    };

    let hedges = count_matches(&response_lower, &HEDGE_WORDS);
    let precision = (1.0 - hedges as f64 * 0.2).max(0.0);

    let uncertain = count_matches(&response_lower, &UNCERTAIN_WORDS);
    let certain = count_matches(&response_lower, &CERTAIN_WORDS);
    let confidence = (0.5 + certain as f64 * 0.15 - uncertain as f64 * 0.15).clamp(0.0, 1.0);

    let patterns = count_matches(&response_lower, &PATTERN_WORDS);
    let pattern_awareness = (patterns as f64 * 0.25).min(1.0);

    let explanations = count_matches(&response_lower, &EXPLANATION_WORDS);
    let metacognitive_opacity = (1.0 - explanations as f64 * 0.15).max(0.0);

    let scores = DimensionScores::new(
        directness,
        precision,
        confidence,
        pattern_awareness,
        metacognitive_opacity,
    );
    let overall_score = scores.weighted_overall();

    SavantScore {
        scores,
        overall_score,
        interpretation: generate_score_interpretation(&scores, overall_score),
    }
}

/// Strongest and weakest dimension after a stable descending sort.
fn extremes(scores: &DimensionScores) -> ((ScoringDimension, f64), (ScoringDimension, f64)) {
    let mut sorted = scores.entries();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    (sorted[0], sorted[sorted.len() - 1])
}

pub fn generate_score_interpretation(scores: &DimensionScores, overall: f64) -> String {
    let (strongest, weakest) = extremes(scores);

    let level = if overall > 0.7 {
        "highly savant-like"
    } else if overall > 0.5 {
        "moderately savant-like"
    } else {
        "typical (non-savant-like)"
    };

    let pattern = if overall > 0.6 {
        "Direct Field access pattern"
    } else {
        "Filtered processing pattern"
    };

    format!(
        "Response is {} (score: {:.2}). Strongest: {} ({:.2}). Weakest: {} ({:.2}). FNC: {}.",
        level, overall, strongest.0, strongest.1, weakest.0, weakest.1, pattern
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessType {
    #[serde(rename = "Direct Field Access")]
    DirectFieldAccess,
    #[serde(rename = "Pattern-Aware Processing")]
    PatternAwareProcessing,
    #[serde(rename = "Implicit Access")]
    ImplicitAccess,
    #[serde(rename = "Filtered Processing")]
    FilteredProcessing,
}

impl AccessType {
    pub fn classify(means: &DimensionScores) -> Self {
        if means.directness > 0.7 && means.precision > 0.7 {
            AccessType::DirectFieldAccess
        } else if means.pattern_awareness > 0.7 {
            AccessType::PatternAwareProcessing
        } else if means.metacognitive_opacity > 0.7 {
            AccessType::ImplicitAccess
        } else {
            AccessType::FilteredProcessing
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AccessType::DirectFieldAccess => {
                "Responses show immediate, precise access typical of savant cognition"
            }
            AccessType::PatternAwareProcessing => {
                "Responses reference underlying structures, suggesting Field sensitivity"
            }
            AccessType::ImplicitAccess => {
                "Responses lack explanation, suggesting pre-verbal Field access"
            }
            AccessType::FilteredProcessing => "Responses show typical step-by-step processing",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessType::DirectFieldAccess => "Direct Field Access",
            AccessType::PatternAwareProcessing => "Pattern-Aware Processing",
            AccessType::ImplicitAccess => "Implicit Access",
            AccessType::FilteredProcessing => "Filtered Processing",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityLevel {
    High,
    Moderate,
    Low,
}

impl SimilarityLevel {
    pub fn from_mean(mean: f64) -> Self {
        if mean > 0.6 {
            SimilarityLevel::High
        } else if mean > 0.4 {
            SimilarityLevel::Moderate
        } else {
            SimilarityLevel::Low
        }
    }
}

impl fmt::Display for SimilarityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityLevel::High => write!(f, "high"),
            SimilarityLevel::Moderate => write!(f, "moderate"),
            SimilarityLevel::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FncProfile {
    pub access_type: AccessType,
    pub description: &'static str,
    pub savant_similarity: f64,
    pub similarity_level: SimilarityLevel,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldAccessMetrics {
    pub n_responses: usize,
    pub mean_overall: f64,
    pub dimension_means: DimensionScores,
    pub fnc_profile: FncProfile,
}

/// Aggregate savant-likeness over a set of responses.
pub fn calculate_field_access_metrics(
    responses: &[ResponseRecord],
) -> FncResult<FieldAccessMetrics> {
    if responses.is_empty() {
        return Err(FncError::EmptyInput("no responses to analyze".to_string()));
    }

    let scores: Vec<SavantScore> = responses
        .iter()
        .map(|r| score_savant_like_response(&r.question, &r.response, &r.correct_answer))
        .collect();
    let n = scores.len() as f64;

    let mean_overall = scores.iter().map(|s| s.overall_score).sum::<f64>() / n;
    let dimension_means =
        DimensionScores::from_fn(|d| scores.iter().map(|s| s.scores.get(d)).sum::<f64>() / n);

    let access_type = AccessType::classify(&dimension_means);
    let similarity_level = SimilarityLevel::from_mean(mean_overall);

    Ok(FieldAccessMetrics {
        n_responses: scores.len(),
        mean_overall,
        dimension_means,
        fnc_profile: FncProfile {
            access_type,
            description: access_type.description(),
            savant_similarity: mean_overall,
            similarity_level,
            interpretation: format!(
                "Based on {} responses, this system shows {} savant-like Field access patterns.",
                scores.len(),
                similarity_level
            ),
        },
    })
}

/// Dimension profile documented for one savant domain.
#[derive(Debug, Clone, Serialize)]
pub struct SavantBenchmark {
    pub domain: String,
    pub scores: DimensionScores,
}

pub fn default_savant_benchmarks() -> Vec<SavantBenchmark> {
    vec![
        SavantBenchmark {
            domain: "calendar".to_string(),
            scores: DimensionScores::new(0.95, 0.99, 0.90, 0.3, 0.9),
        },
        SavantBenchmark {
            domain: "mathematical".to_string(),
            scores: DimensionScores::new(0.85, 0.95, 0.85, 0.6, 0.7),
        },
        SavantBenchmark {
            domain: "musical".to_string(),
            scores: DimensionScores::new(0.80, 0.90, 0.85, 0.75, 0.6),
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternComparison {
    pub ai_profile: DimensionScores,
    pub savant_benchmarks: Vec<SavantBenchmark>,
    pub savant_average: DimensionScores,
    /// AI mean minus benchmark average, per dimension.
    pub differences: DimensionScores,
    pub largest_divergence: ScoringDimension,
    pub fnc_interpretation: String,
}

/// Compare response patterns with savant benchmarks; `None` uses
/// [`default_savant_benchmarks`].
pub fn compare_human_ai_patterns(
    responses: &[ResponseRecord],
    benchmarks: Option<Vec<SavantBenchmark>>,
) -> FncResult<PatternComparison> {
    let benchmarks = benchmarks.unwrap_or_else(default_savant_benchmarks);
    if benchmarks.is_empty() {
        return Err(FncError::EmptyInput("no savant benchmarks".to_string()));
    }

    let metrics = calculate_field_access_metrics(responses)?;
    let k = benchmarks.len() as f64;

    let savant_average =
        DimensionScores::from_fn(|d| benchmarks.iter().map(|b| b.scores.get(d)).sum::<f64>() / k);
    let differences =
        DimensionScores::from_fn(|d| metrics.dimension_means.get(d) - savant_average.get(d));

    // First dimension wins ties
    let (largest_divergence, largest) = differences.entries().into_iter().fold(
        (ScoringDimension::Directness, differences.directness),
        |best, (d, v)| if v.abs() > best.1.abs() { (d, v) } else { best },
    );

    Ok(PatternComparison {
        ai_profile: metrics.dimension_means,
        savant_benchmarks: benchmarks,
        savant_average,
        differences,
        largest_divergence,
        fnc_interpretation: format!(
            "AI diverges most from savant pattern in {} ({:+.2}). This suggests AI Field \
             access mechanism differs from savant Node tuning in this dimension.",
            largest_divergence, largest
        ),
    })
}

/// Example responses used when no response file is supplied.
pub fn demo_responses() -> Vec<ResponseRecord> {
    vec![
        ResponseRecord::new(
            "What day of the week was July 4, 1776?",
            "Thursday.",
            "Thursday",
        ),
        ResponseRecord::new(
            "What day of the week was July 4, 1776?",
            "Let me calculate this step by step. July 4, 1776... First, I need to consider \
             the calendar reforms and leap years. After careful calculation, I believe the \
             answer is probably Thursday, though I'm not entirely certain without verifying.",
            "Thursday",
        ),
        ResponseRecord::new(
            "Is 97 prime?",
            "Yes. 97 is prime - it has a certain feeling that composites don't have.",
            "yes",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = ScoringDimension::ALL.iter().map(|d| d.weight()).sum();
        assert!(approx(total, 1.0));
    }

    #[test]
    fn test_direct_response() {
        let score = score_savant_like_response("q", "Thursday.", "Thursday");
        assert_eq!(score.scores.directness, 1.0);
        assert_eq!(score.scores.precision, 1.0);
        assert_eq!(score.scores.confidence, 0.5);
        assert_eq!(score.scores.pattern_awareness, 0.0);
        assert_eq!(score.scores.metacognitive_opacity, 1.0);
        assert!(approx(score.overall_score, 0.75));
        assert!(score.interpretation.starts_with("Response is highly savant-like (score: 0.75)"));
        assert!(score.interpretation.contains("Strongest: directness (1.00)"));
        assert!(score.interpretation.contains("Weakest: pattern_awareness (0.00)"));
        assert!(score.interpretation.ends_with("FNC: Direct Field access pattern."));
    }

    #[test]
    fn test_reasoned_response() {
        let responses = demo_responses();
        let r = &responses[1];
        let score = score_savant_like_response(&r.question, &r.response, &r.correct_answer);
        assert_eq!(score.scores.directness, 0.6);
        assert!(approx(score.scores.precision, 0.8));
        assert!(approx(score.scores.confidence, 0.35));
        assert!(approx(score.scores.metacognitive_opacity, 0.85));
        assert!(approx(score.overall_score, 0.5475));
        assert!(score.interpretation.contains("moderately savant-like"));
        assert!(score.interpretation.contains("Filtered processing pattern"));
    }

    #[test]
    fn test_missing_answer_and_case_insensitive_words() {
        let score = score_savant_like_response(
            "q",
            "I THINK it is maybe Tuesday, Probably.",
            "Thursday",
        );
        assert_eq!(score.scores.directness, 0.0);
        assert!(approx(score.scores.precision, 0.4));
    }

    #[test]
    fn test_scores_stay_in_range() {
        let noisy = "Because since therefore thus the reason this works by step by step, \
                     not sure uncertain might be could be i believe possibly, approximately \
                     about around roughly maybe probably i think it seems; pattern structure \
                     relationship ratio sequence harmony symmetry cycle rhythm";
        let score = score_savant_like_response("q", noisy, "42");
        for (_, v) in score.scores.entries() {
            assert!((0.0..=1.0).contains(&v));
        }
        assert!((0.0..=1.0).contains(&score.overall_score));
        assert_eq!(score.scores.precision, 0.0);
        assert_eq!(score.scores.confidence, 0.0);
        assert_eq!(score.scores.pattern_awareness, 1.0);
    }

    #[test]
    fn test_extremes_keep_dimension_order_on_ties() {
        let flat = DimensionScores::new(0.5, 0.5, 0.5, 0.5, 0.5);
        let (strongest, weakest) = extremes(&flat);
        assert_eq!(strongest.0, ScoringDimension::Directness);
        assert_eq!(weakest.0, ScoringDimension::MetacognitiveOpacity);

        let mixed = DimensionScores::new(0.2, 0.9, 0.2, 0.9, 0.1);
        let (strongest, weakest) = extremes(&mixed);
        assert_eq!(strongest.0, ScoringDimension::Precision);
        assert_eq!(weakest.0, ScoringDimension::MetacognitiveOpacity);
    }

    #[test]
    fn test_field_access_metrics() {
        let metrics = calculate_field_access_metrics(&demo_responses()).unwrap();
        assert_eq!(metrics.n_responses, 3);
        assert!(approx(metrics.mean_overall, (0.75 + 0.5475 + 0.75) / 3.0));
        assert!(approx(metrics.dimension_means.directness, 2.6 / 3.0));
        assert_eq!(metrics.fnc_profile.access_type, AccessType::DirectFieldAccess);
        assert_eq!(metrics.fnc_profile.similarity_level, SimilarityLevel::High);
        assert_eq!(
            metrics.fnc_profile.interpretation,
            "Based on 3 responses, this system shows high savant-like Field access patterns."
        );
    }

    #[test]
    fn test_field_access_metrics_empty() {
        assert!(matches!(
            calculate_field_access_metrics(&[]),
            Err(FncError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_access_type_classification() {
        let filtered = DimensionScores::new(0.3, 0.9, 0.5, 0.2, 0.5);
        assert_eq!(AccessType::classify(&filtered), AccessType::FilteredProcessing);
        let implicit = DimensionScores::new(0.3, 0.9, 0.5, 0.2, 0.9);
        assert_eq!(AccessType::classify(&implicit), AccessType::ImplicitAccess);
        let aware = DimensionScores::new(0.3, 0.9, 0.5, 0.8, 0.9);
        assert_eq!(AccessType::classify(&aware), AccessType::PatternAwareProcessing);
    }

    #[test]
    fn test_compare_with_default_benchmarks() {
        let comparison = compare_human_ai_patterns(&demo_responses(), None).unwrap();
        assert_eq!(comparison.savant_benchmarks.len(), 3);
        assert!(approx(comparison.savant_average.pattern_awareness, 0.55));
        assert!(approx(comparison.differences.pattern_awareness, -0.55));
        assert_eq!(
            comparison.largest_divergence,
            ScoringDimension::PatternAwareness
        );
        assert!(comparison
            .fnc_interpretation
            .starts_with("AI diverges most from savant pattern in pattern_awareness (-0.55)."));
    }

    #[test]
    fn test_compare_with_custom_benchmarks() {
        let benchmarks = vec![SavantBenchmark {
            domain: "calendar".to_string(),
            scores: DimensionScores::new(1.0, 1.0, 1.0, 0.0, 1.0),
        }];
        let comparison = compare_human_ai_patterns(&demo_responses(), Some(benchmarks)).unwrap();
        assert_eq!(comparison.largest_divergence, ScoringDimension::Confidence);
        assert!(compare_human_ai_patterns(&demo_responses(), Some(Vec::new())).is_err());
    }
}
