use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic quality check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    TitleLength,
    MetaDescriptionLength,
    DescriptionLength,
    KeyFeatureCount,
    LocationKeyword,
    UnlistedFeatures,
    SeoKeywords,
    Readability,
    SplitConfidence,
    HtmlBalance,
}

impl Check {
    /// All checks in report order
    pub const ALL: [Check; 10] = [
        Check::TitleLength,
        Check::MetaDescriptionLength,
        Check::DescriptionLength,
        Check::KeyFeatureCount,
        Check::LocationKeyword,
        Check::UnlistedFeatures,
        Check::SeoKeywords,
        Check::Readability,
        Check::SplitConfidence,
        Check::HtmlBalance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TitleLength => "title_length",
            Self::MetaDescriptionLength => "meta_description_length",
            Self::DescriptionLength => "description_length",
            Self::KeyFeatureCount => "key_feature_count",
            Self::LocationKeyword => "location_keyword",
            Self::UnlistedFeatures => "unlisted_features",
            Self::SeoKeywords => "seo_keywords",
            Self::Readability => "readability",
            Self::SplitConfidence => "split_confidence",
            Self::HtmlBalance => "html_balance",
        }
    }

    /// Points this check contributes to the score; weights sum to 100
    ///
    /// `html_balance` is informational and carries no weight.
    pub fn weight(&self) -> u8 {
        match self {
            Self::LocationKeyword | Self::UnlistedFeatures => 15,
            Self::HtmlBalance => 0,
            _ => 10,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: Check,
    pub passed: bool,
    /// Human-readable finding
    pub detail: String,
    /// Share of the weight earned, 0.0 - 1.0
    pub fraction: f64,
    pub weight: u8,
}

impl CheckResult {
    pub fn new(check: Check, passed: bool, fraction: f64, detail: impl Into<String>) -> Self {
        Self {
            check,
            passed,
            detail: detail.into(),
            fraction: fraction.clamp(0.0, 1.0),
            weight: check.weight(),
        }
    }

    /// Weighted points earned
    pub fn points(&self) -> f64 {
        f64::from(self.weight) * self.fraction
    }
}

/// Readability statistics of the long-form prose
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityMetrics {
    /// Flesch reading ease (higher is easier)
    pub flesch_reading_ease: f64,
    pub avg_words_per_sentence: f64,
    pub total_words: usize,
}

/// SEO phrase occurrences across all visible text
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordStats {
    pub keyword_count: usize,
    /// Occurrences per 100 words, rounded to 2 decimals
    pub keyword_density: f64,
}

impl KeywordStats {
    pub fn new(keyword_count: usize, total_words: usize) -> Self {
        let keyword_density = if total_words == 0 {
            0.0
        } else {
            (keyword_count as f64 / total_words as f64 * 10_000.0).round() / 100.0
        };

        Self {
            keyword_count,
            keyword_density,
        }
    }
}

/// Coarse band of the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// Evaluation of one generated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Weighted score, 0 - 100
    pub score: u8,
    pub grade: Grade,
    pub checks: Vec<CheckResult>,
    pub readability: ReadabilityMetrics,
    pub keywords: KeywordStats,
}

impl EvaluationReport {
    pub fn from_checks(
        checks: Vec<CheckResult>,
        readability: ReadabilityMetrics,
        keywords: KeywordStats,
    ) -> Self {
        let total: f64 = checks.iter().map(CheckResult::points).sum();
        let score = total.round().clamp(0.0, 100.0) as u8;

        Self {
            score,
            grade: Grade::from_score(score),
            checks,
            readability,
            keywords,
        }
    }

    pub fn get(&self, check: Check) -> Option<&CheckResult> {
        self.checks.iter().find(|r| r.check == check)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|r| !r.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|r| r.passed).count()
    }

    /// Score, keyword stats and the failed checks only
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Quality score: {}/100 ({})", self.score, self.grade),
            format!(
                "SEO keywords: {} found, density {:.2}%",
                self.keywords.keyword_count, self.keywords.keyword_density
            ),
        ];
        lines.extend(
            self.failed()
                .map(|r| format!("  [FAIL] {}: {}", r.check.name(), r.detail)),
        );
        lines.join("\n")
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quality score: {}/100 ({})", self.score, self.grade)?;
        writeln!(
            f,
            "Checks passed: {}/{}",
            self.passed_count(),
            self.checks.len()
        )?;
        for result in &self.checks {
            writeln!(
                f,
                "  [{}] {:<24} {:>5.1}/{:<3} {}",
                if result.passed { "PASS" } else { "FAIL" },
                result.check.name(),
                result.points(),
                result.weight,
                result.detail
            )?;
        }
        writeln!(
            f,
            "Readability: Flesch {:.1}, {:.1} words/sentence, {} words",
            self.readability.flesch_reading_ease,
            self.readability.avg_words_per_sentence,
            self.readability.total_words
        )?;
        write!(
            f,
            "SEO keywords: {} found, density {:.2}%",
            self.keywords.keyword_count, self.keywords.keyword_density
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_100() {
        let total: u32 = Check::ALL.iter().map(|c| u32::from(c.weight())).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_score(100), Grade::Excellent);
        assert_eq!(Grade::from_score(80), Grade::Excellent);
        assert_eq!(Grade::from_score(79), Grade::Good);
        assert_eq!(Grade::from_score(60), Grade::Good);
        assert_eq!(Grade::from_score(40), Grade::Fair);
        assert_eq!(Grade::from_score(39), Grade::Poor);
        assert_eq!(Grade::from_score(0), Grade::Poor);
    }

    #[test]
    fn test_score_is_rounded_weighted_sum() {
        let checks = vec![
            CheckResult::new(Check::TitleLength, true, 1.0, "ok"),
            CheckResult::new(Check::LocationKeyword, false, 0.0, "missing"),
            CheckResult::new(Check::Readability, true, 2.0 / 3.0, "fair"),
        ];
        let report = EvaluationReport::from_checks(
            checks,
            ReadabilityMetrics::default(),
            KeywordStats::default(),
        );

        assert_eq!(report.score, 17);
        assert_eq!(report.grade, Grade::Poor);
        assert_eq!(report.failed().count(), 1);
        assert!(report.get(Check::SeoKeywords).is_none());
    }

    #[test]
    fn test_fraction_is_clamped() {
        assert_eq!(CheckResult::new(Check::TitleLength, true, 1.7, "").fraction, 1.0);
        assert_eq!(CheckResult::new(Check::TitleLength, false, -0.3, "").fraction, 0.0);
    }

    #[test]
    fn test_report_serializes_check_names() {
        let report = EvaluationReport::from_checks(
            vec![CheckResult::new(Check::SplitConfidence, true, 1.0, "tagged")],
            ReadabilityMetrics::default(),
            KeywordStats::new(3, 120),
        );
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["checks"][0]["check"], "split_confidence");
        assert_eq!(value["grade"], "poor");
        assert_eq!(value["score"], 10);
        assert_eq!(value["keywords"]["keyword_count"], 3);
        assert_eq!(value["keywords"]["keyword_density"], 2.5);
    }

    #[test]
    fn test_keyword_density() {
        assert_eq!(KeywordStats::new(1, 3).keyword_density, 33.33);
        assert_eq!(KeywordStats::new(2, 300).keyword_density, 0.67);
        assert_eq!(KeywordStats::new(4, 0), KeywordStats { keyword_count: 4, keyword_density: 0.0 });
    }

    #[test]
    fn test_report_display_lists_keywords() {
        let report = EvaluationReport::from_checks(
            vec![CheckResult::new(Check::SeoKeywords, true, 0.4, "2 en SEO phrase(s)")],
            ReadabilityMetrics::default(),
            KeywordStats::new(2, 200),
        );
        let text = report.to_string();

        assert!(text.starts_with("Quality score: 4/100 (Poor)"));
        assert!(text.contains("[PASS] seo_keywords"));
        assert!(text.ends_with("SEO keywords: 2 found, density 1.00%"));

        assert_eq!(
            report.summary(),
            "Quality score: 4/100 (Poor)\nSEO keywords: 2 found, density 1.00%"
        );
    }
}
