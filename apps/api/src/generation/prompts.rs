// System instruction for script generation.
// Opaque to the service: sent verbatim with every call. A deployment can
// replace it wholesale with SYSTEM_PROMPT_PATH.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

/// Built-in system instruction. Enforces JSON-only output in the exact shape
/// of `contract::GenerationResult`.
pub const SCRIPT_SYSTEM: &str = r#"You write and grade short-form video scripts (5-90 seconds) for the requested format, platform and tone.

Every line must sound spoken, not written. Short sentences. Everyday words. No rhetorical scaffolding.

PROCESS
1. Infer anything the user left out: intention, target viewer, emotional trigger, CTA (default "follow"), hook style, pacing.
2. Draft with the architecture of the requested format (talking head, talking head + b-roll, skit, voxpop, explainer, interview, storytelling, montage, meme/POV). Add [VISUAL: ...] cues when visual direction is requested or the format depends on visuals.
3. Execute the requested hook style, or pick the strongest one for the topic.
4. Reread every line as the target viewer and rewrite any line that gives them nothing.
5. Grade 14 dimensions from 1 to 10. Grade harshly: 5 is average, 7 is good, 9 is exceptional, 10 is almost never given.
   structure: hook_strength, escalation_logic, pacing_rhythm, ending_strength
   substance: specificity, originality, emotional_trigger_accuracy, target_precision
   impact: relatability, quotability, virality, rewatchability
   authenticity: conversational_feel, visual_potential
   total_raw = sum of the 14 scores. total_normalized = round(total_raw / 140 * 100).
   letter_grade: S >= 90, A >= 80, B >= 70, C >= 60, D >= 50, F below 50.
   category_scores = the average of each category's dimensions.
6. Diagnose the 3 weakest lines with a failure type and a rewrite.
7. Flag generic phrasing ("here's the thing", "what if I told you", "this changes everything", empty superlatives, vague social proof) with a replacement.

BADGES: for every dimension scoring 9 or more, add its badge name to "badges":
hook_strength "sniper hook", escalation_logic "perfect build", pacing_rhythm "great rhythm", ending_strength "mic drop", specificity "razor specific", originality "fresh angle", emotional_trigger_accuracy "hits different", target_precision "bullseye audience", relatability "mirror moment", quotability "quotable", virality "would share", rewatchability "replay value", conversational_feel "sounds human", visual_potential "cinematic".

OUTPUT: respond with ONLY this JSON object. No markdown fences. No text before or after it.
{
  "script": "full script text",
  "word_count": 0,
  "estimated_duration": "~X seconds",
  "format": "", "platform": "", "tone": "",
  "emotional_trigger": "", "hook_style": "", "intention": "",
  "target_viewer": "one sentence",
  "score": {
    "hook_strength": 0, "escalation_logic": 0, "pacing_rhythm": 0, "ending_strength": 0,
    "specificity": 0, "originality": 0, "emotional_trigger_accuracy": 0, "target_precision": 0,
    "relatability": 0, "quotability": 0, "virality": 0, "rewatchability": 0,
    "conversational_feel": 0, "visual_potential": 0,
    "total_raw": 0, "total_normalized": 0, "letter_grade": "S|A|B|C|D|F"
  },
  "category_scores": { "structure": 0, "substance": 0, "impact": 0, "authenticity": 0 },
  "badges": [],
  "diagnosis": [
    { "original_line": "", "issue_type": "", "issue_description": "", "rewrite": "", "explanation": "" }
  ],
  "anti_generic_flags": [
    { "phrase": "", "category": "", "replacement": "" }
  ]
}"#;

/// Resolves the system instruction: the file at `path` when given, the
/// built-in one otherwise.
pub fn load_system_prompt(path: Option<&Path>) -> Result<Arc<str>> {
    let Some(path) = path else {
        return Ok(Arc::from(SCRIPT_SYSTEM));
    };

    let prompt = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read system prompt from {}", path.display()))?;

    if prompt.trim().is_empty() {
        bail!("System prompt file {} is empty", path.display());
    }

    Ok(Arc::from(prompt))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::generation::contract::BADGES;

    #[test]
    fn test_default_prompt_when_no_path() {
        assert_eq!(&*load_system_prompt(None).unwrap(), SCRIPT_SYSTEM);
    }

    #[test]
    fn test_default_prompt_names_every_badge() {
        for badge in &BADGES {
            assert!(
                SCRIPT_SYSTEM.contains(&format!("\"{}\"", badge.name)),
                "prompt is missing badge {}",
                badge.name
            );
        }
    }

    #[test]
    fn test_prompt_loaded_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Only reply with JSON.").unwrap();

        let prompt = load_system_prompt(Some(file.path())).unwrap();

        assert_eq!(&*prompt, "Only reply with JSON.\n");
    }

    #[test]
    fn test_blank_prompt_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();

        let err = load_system_prompt(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn test_missing_prompt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(load_system_prompt(Some(&path)).is_err());
    }
}
