//! Rules for the two-step capsule composition wizard.

use crate::model::WritePayload;

pub const MIN_CONTENT_CHARS: usize = 10;

/// Fixed emoji palette; the wire format carries the index, not the glyph.
pub const EMOJI_CHOICES: &[&str] = &["😀", "😍", "🎉", "👍"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WizardStep {
    #[default]
    Compose,
    Decorate,
}

impl WizardStep {
    /// Route step segments are 1-based; anything else falls back to the
    /// first step.
    pub fn from_route(step: u8) -> Self {
        match step {
            2 => WizardStep::Decorate,
            _ => WizardStep::Compose,
        }
    }

    pub fn route_index(self) -> u8 {
        match self {
            WizardStep::Compose => 1,
            WizardStep::Decorate => 2,
        }
    }
}

/// In-memory draft for one wizard mount. Does not survive a reload.
#[derive(Clone, Debug, PartialEq)]
pub struct WizardDraft {
    pub content: String,
    pub emoji: u32,
    pub is_public: bool,
}

impl Default for WizardDraft {
    fn default() -> Self {
        Self {
            content: String::new(),
            emoji: 0,
            is_public: true,
        }
    }
}

impl WizardDraft {
    /// Step 1 gate: trimmed content must reach the minimum length before
    /// the wizard may advance.
    pub fn can_advance(&self) -> bool {
        self.content.trim().chars().count() >= MIN_CONTENT_CHARS
    }

    pub fn payload(&self) -> WritePayload {
        WritePayload {
            content: self.content.clone(),
            emoji: self.emoji,
            is_public: self.is_public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with(content: &str) -> WizardDraft {
        WizardDraft {
            content: content.to_string(),
            ..WizardDraft::default()
        }
    }

    #[test]
    fn advance_requires_ten_trimmed_chars() {
        assert!(!draft_with("123456789").can_advance());
        assert!(draft_with("1234567890").can_advance());
        assert!(!draft_with("   123456789   ").can_advance());
        assert!(draft_with("  1234567890  ").can_advance());
    }

    #[test]
    fn defaults_are_first_emoji_and_public() {
        let draft = WizardDraft::default();
        assert_eq!(draft.emoji, 0);
        assert!(draft.is_public);
        assert_eq!(draft.payload().emoji, 0);
        assert!(draft.payload().is_public);
    }

    #[test]
    fn step_parses_from_route_segment() {
        assert_eq!(WizardStep::from_route(1), WizardStep::Compose);
        assert_eq!(WizardStep::from_route(2), WizardStep::Decorate);
        assert_eq!(WizardStep::from_route(7), WizardStep::Compose);
        assert_eq!(WizardStep::Decorate.route_index(), 2);
    }
}
