//! Generation request: the user-supplied script parameters and the
//! Request Builder that turns them into the user half of the prompt.

use serde::Deserialize;

use crate::errors::AppError;

/// Value of `hookStyle` / `pacing` that leaves the choice to the model.
const AUTO: &str = "auto";

/// Request body for `POST /api/generate`.
///
/// Everything is optional at the serde level so that a missing field becomes
/// a specific validation message instead of a generic body rejection.
/// `format`, `platform` and `tone` are only checked for presence; their
/// values mean something to the model, not to us.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub topic: Option<String>,
    pub format: Option<String>,
    pub platform: Option<String>,
    pub tone: Option<String>,
    pub emotional_trigger: Option<String>,
    pub target_viewer: Option<String>,
    pub cta_strategy: Option<String>,
    pub hook_style: Option<String>,
    pub pacing: Option<String>,
    pub real_anchors: Option<String>,
    pub include_visual_direction: Option<bool>,
}

impl GenerationRequest {
    /// Checks the required fields in order: topic, format, platform, tone.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("topic", &self.topic),
            ("format", &self.format),
            ("platform", &self.platform),
            ("tone", &self.tone),
        ];

        for (name, value) in required {
            if present(value).is_none() {
                return Err(AppError::Validation(format!("{name} is required.")));
            }
        }

        Ok(())
    }
}

/// `Some` for a non-blank value; the value itself is returned untrimmed.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Like [`present`], but also drops the `auto` sentinel.
fn chosen(value: &Option<String>) -> Option<&str> {
    present(value).filter(|v| *v != AUTO)
}

/// Serializes a request into one `Key: value` line per present field, in a
/// fixed order. Absent optional fields produce no line at all. Values are
/// embedded verbatim.
pub fn build_user_message(request: &GenerationRequest) -> String {
    let mut lines = vec![
        format!("Topic: {}", request.topic.as_deref().unwrap_or_default()),
        format!("Format: {}", request.format.as_deref().unwrap_or_default()),
        format!("Platform: {}", request.platform.as_deref().unwrap_or_default()),
        format!("Tone: {}", request.tone.as_deref().unwrap_or_default()),
    ];

    let optional = [
        ("Emotional trigger", present(&request.emotional_trigger)),
        ("Target viewer", present(&request.target_viewer)),
        ("CTA strategy", present(&request.cta_strategy)),
        ("Hook style", chosen(&request.hook_style)),
        ("Pacing", chosen(&request.pacing)),
        ("Real details to include", present(&request.real_anchors)),
    ];

    lines.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| value.map(|v| format!("{label}: {v}"))),
    );

    if request.include_visual_direction == Some(true) {
        lines.push("Include visual direction notes: yes".to_string());
    }

    lines.join("\n")
}
