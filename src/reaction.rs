//! Stabilized label to reaction asset key.

use serde::{Deserialize, Serialize};

use crate::types::ExpressionLabel;

/// Asset key per label, plus the grin variant for a toothy smile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetMap {
    pub neutral: String,
    pub smile: String,
    pub scream: String,
    pub squint: String,
    pub freaky: String,
    pub grin: String,
}

impl Default for AssetMap {
    fn default() -> Self {
        Self {
            neutral: "neutral".into(),
            smile: "smile".into(),
            scream: "scream".into(),
            squint: "squint".into(),
            freaky: "freaky".into(),
            grin: "grin".into(),
        }
    }
}

impl AssetMap {
    pub fn key_for(&self, label: ExpressionLabel) -> &str {
        match label {
            ExpressionLabel::Neutral => &self.neutral,
            ExpressionLabel::Smile => &self.smile,
            ExpressionLabel::Scream => &self.scream,
            ExpressionLabel::Squint => &self.squint,
            ExpressionLabel::Freaky => &self.freaky,
        }
    }

    /// Key to display; a SMILE showing teeth becomes the grin variant.
    pub fn reaction_for(&self, label: ExpressionLabel, toothy: bool) -> &str {
        if label == ExpressionLabel::Smile && toothy {
            &self.grin
        } else {
            self.key_for(label)
        }
    }

    pub fn neutral(&self) -> &str {
        &self.neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys() {
        let assets = AssetMap::default();
        assert_eq!(assets.key_for(ExpressionLabel::Scream), "scream");
        assert_eq!(assets.reaction_for(ExpressionLabel::Neutral, true), "neutral");
        assert_eq!(assets.reaction_for(ExpressionLabel::Freaky, false), "freaky");
    }

    #[test]
    fn toothy_smile_is_grin() {
        let assets = AssetMap::default();
        assert_eq!(assets.reaction_for(ExpressionLabel::Smile, true), "grin");
        assert_eq!(assets.reaction_for(ExpressionLabel::Smile, false), "smile");
        // only smiles get the variant
        assert_eq!(assets.reaction_for(ExpressionLabel::Scream, true), "scream");
    }
}
