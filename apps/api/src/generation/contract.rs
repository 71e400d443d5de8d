//! Result Contract: the JSON shape a successful generation must produce.
//!
//! The model is a probabilistic producer, so a parse success proves nothing.
//! [`validate`] deserializes the recovered JSON into [`GenerationResult`] and
//! rejects hard violations (missing fields, out-of-range scores, unknown
//! badges). Arithmetic disagreements between the model's own numbers are
//! only reported by [`GenerationResult::inconsistencies`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const DIMENSION_RANGE: (f64, f64) = (1.0, 10.0);
const TOTAL_RAW_MAX: f64 = 140.0;
const TOTAL_NORMALIZED_MAX: f64 = 100.0;
/// Categories may be reported as an average (≤ 10) or a sum (≤ 40).
const CATEGORY_MAX: f64 = 40.0;
/// Dimension score at which a badge is earned.
pub const BADGE_THRESHOLD: f64 = 9.0;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub script: String,
    /// Whole, non-negative count. Integral floats such as `148.0` are accepted.
    pub word_count: f64,
    pub estimated_duration: String,
    pub format: String,
    pub platform: String,
    pub tone: String,
    pub emotional_trigger: String,
    pub hook_style: String,
    pub intention: String,
    pub target_viewer: String,
    pub score: ScriptScore,
    pub category_scores: CategoryScores,
    pub badges: Vec<String>,
    pub diagnosis: Vec<DiagnosisItem>,
    pub anti_generic_flags: Vec<AntiGenericFlag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptScore {
    pub hook_strength: f64,
    pub escalation_logic: f64,
    pub pacing_rhythm: f64,
    pub ending_strength: f64,
    pub specificity: f64,
    pub originality: f64,
    pub emotional_trigger_accuracy: f64,
    pub target_precision: f64,
    pub relatability: f64,
    pub quotability: f64,
    pub virality: f64,
    pub rewatchability: f64,
    pub conversational_feel: f64,
    pub visual_potential: f64,
    pub total_raw: f64,
    pub total_normalized: f64,
    pub letter_grade: LetterGrade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScores {
    pub structure: f64,
    pub substance: f64,
    pub impact: f64,
    pub authenticity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisItem {
    pub original_line: String,
    pub issue_type: String,
    pub issue_description: String,
    pub rewrite: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntiGenericFlag {
    pub phrase: String,
    pub category: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    /// Grade band for a normalized 0–100 score.
    pub fn for_score(total_normalized: f64) -> Self {
        match total_normalized {
            s if s >= 90.0 => LetterGrade::S,
            s if s >= 80.0 => LetterGrade::A,
            s if s >= 70.0 => LetterGrade::B,
            s if s >= 60.0 => LetterGrade::C,
            s if s >= 50.0 => LetterGrade::D,
            _ => LetterGrade::F,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dimensions, categories and the badge catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    HookStrength,
    EscalationLogic,
    PacingRhythm,
    EndingStrength,
    Specificity,
    Originality,
    EmotionalTriggerAccuracy,
    TargetPrecision,
    Relatability,
    Quotability,
    Virality,
    Rewatchability,
    ConversationalFeel,
    VisualPotential,
}

impl Dimension {
    pub fn key(self) -> &'static str {
        match self {
            Dimension::HookStrength => "hook_strength",
            Dimension::EscalationLogic => "escalation_logic",
            Dimension::PacingRhythm => "pacing_rhythm",
            Dimension::EndingStrength => "ending_strength",
            Dimension::Specificity => "specificity",
            Dimension::Originality => "originality",
            Dimension::EmotionalTriggerAccuracy => "emotional_trigger_accuracy",
            Dimension::TargetPrecision => "target_precision",
            Dimension::Relatability => "relatability",
            Dimension::Quotability => "quotability",
            Dimension::Virality => "virality",
            Dimension::Rewatchability => "rewatchability",
            Dimension::ConversationalFeel => "conversational_feel",
            Dimension::VisualPotential => "visual_potential",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Structure,
    Substance,
    Impact,
    Authenticity,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Structure,
        Category::Substance,
        Category::Impact,
        Category::Authenticity,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Structure => "structure",
            Category::Substance => "substance",
            Category::Impact => "impact",
            Category::Authenticity => "authenticity",
        }
    }

    pub fn dimensions(self) -> &'static [Dimension] {
        use Dimension::*;
        match self {
            Category::Structure => &[HookStrength, EscalationLogic, PacingRhythm, EndingStrength],
            Category::Substance => &[
                Specificity,
                Originality,
                EmotionalTriggerAccuracy,
                TargetPrecision,
            ],
            Category::Impact => &[Relatability, Quotability, Virality, Rewatchability],
            Category::Authenticity => &[ConversationalFeel, VisualPotential],
        }
    }
}

/// A named achievement tag, earned when its dimension scores 9 or more.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Badge {
    pub name: &'static str,
    pub emoji: &'static str,
    pub dimension: Dimension,
}

pub static BADGES: [Badge; 14] = [
    badge("sniper hook", "🎯", Dimension::HookStrength),
    badge("perfect build", "🧱", Dimension::EscalationLogic),
    badge("great rhythm", "🎵", Dimension::PacingRhythm),
    badge("mic drop", "🎤", Dimension::EndingStrength),
    badge("razor specific", "🔬", Dimension::Specificity),
    badge("fresh angle", "💡", Dimension::Originality),
    badge("hits different", "💘", Dimension::EmotionalTriggerAccuracy),
    badge("bullseye audience", "🎯", Dimension::TargetPrecision),
    badge("mirror moment", "🪞", Dimension::Relatability),
    badge("quotable", "💬", Dimension::Quotability),
    badge("would share", "🔁", Dimension::Virality),
    badge("replay value", "🔄", Dimension::Rewatchability),
    badge("sounds human", "🗣️", Dimension::ConversationalFeel),
    badge("cinematic", "🎬", Dimension::VisualPotential),
];

const fn badge(name: &'static str, emoji: &'static str, dimension: Dimension) -> Badge {
    Badge {
        name,
        emoji,
        dimension,
    }
}

pub fn find_badge(name: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.name == name)
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("result does not match the contract shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("result violates the contract: {}", .0.join("; "))]
    Violations(Vec<String>),
}

/// Checks a recovered JSON value against the contract.
pub fn validate(value: &Value) -> Result<GenerationResult, ContractError> {
    let result = GenerationResult::deserialize(value)?;

    let violations = result.violations();
    if !violations.is_empty() {
        return Err(ContractError::Violations(violations));
    }

    Ok(result)
}

impl ScriptScore {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::HookStrength => self.hook_strength,
            Dimension::EscalationLogic => self.escalation_logic,
            Dimension::PacingRhythm => self.pacing_rhythm,
            Dimension::EndingStrength => self.ending_strength,
            Dimension::Specificity => self.specificity,
            Dimension::Originality => self.originality,
            Dimension::EmotionalTriggerAccuracy => self.emotional_trigger_accuracy,
            Dimension::TargetPrecision => self.target_precision,
            Dimension::Relatability => self.relatability,
            Dimension::Quotability => self.quotability,
            Dimension::Virality => self.virality,
            Dimension::Rewatchability => self.rewatchability,
            Dimension::ConversationalFeel => self.conversational_feel,
            Dimension::VisualPotential => self.visual_potential,
        }
    }

    /// Sum of the fourteen dimension scores.
    pub fn dimension_total(&self) -> f64 {
        BADGES.iter().map(|b| self.get(b.dimension)).sum()
    }
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Structure => self.structure,
            Category::Substance => self.substance,
            Category::Impact => self.impact,
            Category::Authenticity => self.authenticity,
        }
    }
}

impl GenerationResult {
    /// Hard contract violations. Any entry makes the result unusable.
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let (lo, hi) = DIMENSION_RANGE;

        if self.word_count < 0.0 || self.word_count.fract() != 0.0 {
            violations.push(format!(
                "word_count = {} is not a whole non-negative number",
                self.word_count
            ));
        }

        for badge in &BADGES {
            let value = self.score.get(badge.dimension);
            if !in_range(value, lo, hi) {
                violations.push(format!(
                    "score.{} = {value} is outside {lo}–{hi}",
                    badge.dimension.key()
                ));
            }
        }

        if !in_range(self.score.total_raw, 0.0, TOTAL_RAW_MAX) {
            violations.push(format!(
                "score.total_raw = {} is outside 0–{TOTAL_RAW_MAX}",
                self.score.total_raw
            ));
        }
        if !in_range(self.score.total_normalized, 0.0, TOTAL_NORMALIZED_MAX) {
            violations.push(format!(
                "score.total_normalized = {} is outside 0–{TOTAL_NORMALIZED_MAX}",
                self.score.total_normalized
            ));
        }

        for category in Category::ALL {
            let value = self.category_scores.get(category);
            if !in_range(value, 0.0, CATEGORY_MAX) {
                violations.push(format!(
                    "category_scores.{} = {value} is outside 0–{CATEGORY_MAX}",
                    category.key()
                ));
            }
        }

        for name in &self.badges {
            if find_badge(name).is_none() {
                violations.push(format!("unknown badge '{name}'"));
            }
        }

        violations
    }

    /// Places where the model's own arithmetic disagrees with itself.
    /// Worth logging, not worth failing the request over.
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let score = &self.score;

        let sum = score.dimension_total();
        if (sum - score.total_raw).abs() > 0.5 {
            issues.push(format!(
                "total_raw {} differs from dimension sum {sum}",
                score.total_raw
            ));
        }

        let expected_normalized = (score.total_raw / TOTAL_RAW_MAX * 100.0).round();
        if (expected_normalized - score.total_normalized).abs() > 1.0 {
            issues.push(format!(
                "total_normalized {} differs from {expected_normalized} implied by total_raw",
                score.total_normalized
            ));
        }

        let expected_grade = LetterGrade::for_score(score.total_normalized);
        if expected_grade != score.letter_grade {
            issues.push(format!(
                "letter_grade {:?} does not match {expected_grade:?} band for {}",
                score.letter_grade, score.total_normalized
            ));
        }

        for category in Category::ALL {
            let dims = category.dimensions();
            let total: f64 = dims.iter().map(|d| score.get(*d)).sum();
            let average = total / dims.len() as f64;
            let reported = self.category_scores.get(category);
            if (reported - average).abs() > 0.5 && (reported - total).abs() > 0.5 {
                issues.push(format!(
                    "category_scores.{} = {reported} matches neither average {average} nor sum {total}",
                    category.key()
                ));
            }
        }

        let earned: BTreeSet<&str> = BADGES
            .iter()
            .filter(|b| score.get(b.dimension) >= BADGE_THRESHOLD)
            .map(|b| b.name)
            .collect();
        let awarded: BTreeSet<&str> = self.badges.iter().map(String::as_str).collect();
        if earned != awarded {
            issues.push(format!(
                "badges {awarded:?} differ from badges earned by score {earned:?}"
            ));
        }

        issues
    }
}

fn in_range(value: f64, lo: f64, hi: f64) -> bool {
    value.is_finite() && value >= lo && value <= hi
}

/// A complete, internally consistent result used across the crate's tests.
#[cfg(test)]
pub(crate) fn sample_result_json() -> Value {
    serde_json::json!({
        "script": "You don't need a 5am routine. You need a 5-minute one.\n[VISUAL: alarm at 6:40]\nHere's mine.",
        "word_count": 148,
        "estimated_duration": "~55 seconds",
        "format": "talking head",
        "platform": "reels",
        "tone": "casual",
        "emotional_trigger": "relatability",
        "hook_style": "hot take",
        "intention": "reframe",
        "target_viewer": "Office workers who keep failing at elaborate morning routines.",
        "score": {
            "hook_strength": 8,
            "escalation_logic": 7,
            "pacing_rhythm": 7,
            "ending_strength": 6,
            "specificity": 9,
            "originality": 6,
            "emotional_trigger_accuracy": 7,
            "target_precision": 7,
            "relatability": 8,
            "quotability": 6,
            "virality": 6,
            "rewatchability": 5,
            "conversational_feel": 9,
            "visual_potential": 6,
            "total_raw": 97,
            "total_normalized": 69,
            "letter_grade": "C"
        },
        "category_scores": {
            "structure": 7.0,
            "substance": 7.25,
            "impact": 6.25,
            "authenticity": 7.5
        },
        "badges": ["razor specific", "sounds human"],
        "diagnosis": [
            {
                "original_line": "Here's mine.",
                "issue_type": "filler",
                "issue_description": "Transition adds nothing the viewer needs.",
                "rewrite": "Coffee. Window. Two lines in a notebook. Done.",
                "explanation": "Shows the routine instead of announcing it."
            }
        ],
        "anti_generic_flags": [
            {
                "phrase": "game-changing",
                "category": "empty superlative",
                "replacement": "cut it"
            }
        ]
    })
}
