//! Dream readings
//!
//! The remote text-analysis service is an external collaborator behind
//! [`TextAnalyzer`]. Its replies are validated here, and any failure falls back
//! to [`LocalInterpreter`], a keyword table. Readings feed the same score tally
//! as the mini-games but never touch a round.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::tally::{ScoreSink, ScoreSource};

pub const MIN_SCORE: i32 = -10;
pub const MAX_SCORE: i32 = 10;

/// Keywords reported by the local heuristic
const MAX_LOCAL_KEYWORDS: usize = 3;

/// Keyword weights for the local heuristic, in match order
const KEYWORD_SCORES: &[(&str, i32)] = &[
    ("dragon", 8),
    ("snake", -3),
    ("death", -7),
    ("water", 5),
    ("flying", 7),
    ("money", 6),
    ("fish", 4),
    ("fire", -2),
    ("exam", 3),
    ("wedding", 9),
    ("illness", -5),
    ("losing teeth", -4),
    ("tea restaurant", 5),
    ("victoria harbour", 8),
    ("the peak", 6),
    ("tram", 0),
    ("hong kong dollar", 7),
    ("mooncake", 5),
    ("mahjong", 0),
    ("pineapple bun", 0),
    ("typhoon", -6),
    ("red packet", 8),
    ("lion dance", 7),
    ("guanyin", 9),
    ("wong tai sin", 8),
    ("cantonese", 4),
];

/// A dream reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreamAnalysis {
    /// Omen from -10 (very unlucky) to 10 (very lucky)
    pub score: i32,
    pub meanings: Vec<String>,
    pub keywords: Vec<String>,
    pub advice: String,
    pub cultural_context: String,
}

/// Collaborator that turns free text into a reading
pub trait TextAnalyzer {
    fn analyze(&mut self, dream: &str) -> Result<DreamAnalysis, AnalysisError>;
}

#[derive(Deserialize)]
struct RawAnalysis {
    score: f64,
    meanings: Vec<String>,
    keywords: Vec<String>,
    #[serde(default)]
    advice: String,
    #[serde(default)]
    cultural_context: String,
}

/// Parse and validate a collaborator reply, clamping the score into range
pub fn parse_analysis(json: &str) -> Result<DreamAnalysis, AnalysisError> {
    let raw: RawAnalysis = serde_json::from_str(json.trim())?;
    if !raw.score.is_finite() {
        return Err(AnalysisError::Malformed(format!("score {}", raw.score)));
    }
    let score = raw.score.round().clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as i32;
    Ok(DreamAnalysis {
        score,
        meanings: raw.meanings,
        keywords: raw.keywords,
        advice: raw.advice,
        cultural_context: raw.cultural_context,
    })
}

/// Keyword-table heuristic used when the remote service is unavailable
#[derive(Debug, Clone)]
pub struct LocalInterpreter {
    rng: Pcg32,
}

impl LocalInterpreter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Known keywords present in the text, in table order
    pub fn extract_keywords(dream: &str) -> Vec<&'static str> {
        let text = dream.to_lowercase();
        KEYWORD_SCORES
            .iter()
            .filter(|(word, _)| text.contains(word))
            .map(|(word, _)| *word)
            .collect()
    }

    fn score(&mut self, keywords: &[&str]) -> i32 {
        if keywords.is_empty() {
            return self.rng.random_range(MIN_SCORE..=MAX_SCORE);
        }
        let total: i32 = keywords
            .iter()
            .filter_map(|k| KEYWORD_SCORES.iter().find(|(word, _)| word == k))
            .map(|(_, s)| *s)
            .sum();
        total.clamp(MIN_SCORE, MAX_SCORE)
    }
}

impl TextAnalyzer for LocalInterpreter {
    fn analyze(&mut self, dream: &str) -> Result<DreamAnalysis, AnalysisError> {
        if dream.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let keywords = Self::extract_keywords(dream);
        let score = self.score(&keywords);
        let advice = if score >= 0 {
            "Keep a positive outlook, good luck is on its way"
        } else {
            "Mind the small details of daily life to avoid minor troubles"
        };

        Ok(DreamAnalysis {
            score,
            meanings: vec![
                "A dream rich in symbolism".to_string(),
                "It reflects thoughts and feelings deep within".to_string(),
                "Pay attention to the details and how the dream felt".to_string(),
            ],
            keywords: keywords
                .iter()
                .take(MAX_LOCAL_KEYWORDS)
                .map(|k| k.to_string())
                .collect(),
            advice: advice.to_string(),
            cultural_context: "Read through the traditional Duke of Zhou dream book".to_string(),
        })
    }
}

/// Where a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingSource {
    Remote,
    Fallback,
}

/// A reading plus an informational notice when the fallback was used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub analysis: DreamAnalysis,
    pub source: ReadingSource,
    pub notice: Option<String>,
}

impl Reading {
    /// Add this reading's score to a tally
    pub fn credit(&self, sink: &mut dyn ScoreSink) {
        sink.on_score_delta(self.analysis.score, ScoreSource::Interpretation);
    }
}

/// Ask the remote analyzer (if configured), falling back to the local heuristic.
///
/// Only empty input is an error; remote failures become a notice on the reading.
pub fn interpret_or_fallback(
    remote: Option<&mut dyn TextAnalyzer>,
    fallback: &mut LocalInterpreter,
    dream: &str,
) -> Result<Reading, AnalysisError> {
    if dream.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let notice = match remote {
        Some(analyzer) => match analyzer.analyze(dream) {
            Ok(mut analysis) => {
                analysis.score = analysis.score.clamp(MIN_SCORE, MAX_SCORE);
                return Ok(Reading {
                    analysis,
                    source: ReadingSource::Remote,
                    notice: None,
                });
            }
            Err(err) => {
                log::warn!("Remote dream reading failed, using local reading: {}", err);
                format!("Remote reading unavailable ({err}); showing a local reading")
            }
        },
        None => "No remote reader configured; showing a local reading".to_string(),
    };

    Ok(Reading {
        analysis: fallback.analyze(dream)?,
        source: ReadingSource::Fallback,
        notice: Some(notice),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::ScoreTally;

    struct CannedAnalyzer(Result<String, ()>);

    impl TextAnalyzer for CannedAnalyzer {
        fn analyze(&mut self, _dream: &str) -> Result<DreamAnalysis, AnalysisError> {
            match &self.0 {
                Ok(json) => parse_analysis(json),
                Err(()) => Err(AnalysisError::Unavailable("HTTP 429".to_string())),
            }
        }
    }

    #[test]
    fn test_parse_clamps_score() {
        let a = parse_analysis(
            r#"{"score": 14.2, "meanings": ["a"], "keywords": ["dragon"], "advice": "go", "cultural_context": "hk"}"#,
        )
        .unwrap();
        assert_eq!(a.score, 10);
        assert_eq!(a.keywords, vec!["dragon".to_string()]);
    }

    #[test]
    fn test_parse_rejects_bad_shape() {
        assert!(matches!(
            parse_analysis(r#"{"score": "high", "meanings": [], "keywords": []}"#),
            Err(AnalysisError::Malformed(_))
        ));
        assert!(matches!(
            parse_analysis(r#"{"score": 3, "keywords": []}"#),
            Err(AnalysisError::Malformed(_))
        ));
        assert!(matches!(parse_analysis("not json"), Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn test_local_keyword_scoring() {
        let mut local = LocalInterpreter::new(1);
        let a = local
            .analyze("A dragon flying over Victoria Harbour during a typhoon")
            .unwrap();
        // 8 + 7 + 8 - 6 = 17, clamped
        assert_eq!(a.score, 10);
        assert_eq!(a.keywords, vec!["dragon", "flying", "victoria harbour"]);

        let a = local.analyze("Illness and death").unwrap();
        assert_eq!(a.score, -10);
    }

    #[test]
    fn test_local_without_keywords_stays_in_range() {
        let mut local = LocalInterpreter::new(99);
        for _ in 0..50 {
            let a = local.analyze("walking somewhere grey").unwrap();
            assert!((MIN_SCORE..=MAX_SCORE).contains(&a.score));
            assert!(a.keywords.is_empty());
        }
    }

    #[test]
    fn test_fallback_on_remote_failure() {
        let mut remote = CannedAnalyzer(Err(()));
        let mut local = LocalInterpreter::new(5);
        let reading =
            interpret_or_fallback(Some(&mut remote), &mut local, "a fish in water").unwrap();
        assert_eq!(reading.source, ReadingSource::Fallback);
        assert!(reading.notice.is_some());
        assert_eq!(reading.analysis.score, 9);
    }

    #[test]
    fn test_remote_reading_credits_tally() {
        let mut remote = CannedAnalyzer(Ok(
            r#"{"score": -3, "meanings": ["x"], "keywords": [], "advice": "", "cultural_context": ""}"#
                .to_string(),
        ));
        let mut local = LocalInterpreter::new(5);
        let reading = interpret_or_fallback(Some(&mut remote), &mut local, "snake").unwrap();
        assert_eq!(reading.source, ReadingSource::Remote);

        let mut tally = ScoreTally::new();
        reading.credit(&mut tally);
        assert_eq!(tally.total, -3);
    }

    #[test]
    fn test_empty_dream_rejected() {
        let mut local = LocalInterpreter::new(5);
        assert!(matches!(
            interpret_or_fallback(None, &mut local, "   "),
            Err(AnalysisError::EmptyInput)
        ));
    }
}
