use super::{EditRequest, EditType};
use crate::ImageRef;

/// Canned edits offered as one-click buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickAction {
    Enhance,
    RemoveBackground,
    Lighting,
    Staging,
}

impl QuickAction {
    pub const ALL: [QuickAction; 4] = [
        QuickAction::Enhance,
        QuickAction::RemoveBackground,
        QuickAction::Lighting,
        QuickAction::Staging,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuickAction::Enhance => "Enhance",
            QuickAction::RemoveBackground => "Remove background",
            QuickAction::Lighting => "Improve lighting",
            QuickAction::Staging => "Virtual staging",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            QuickAction::Enhance => {
                "Enhance this property photo: improve sharpness, color balance and clarity while keeping it realistic"
            }
            QuickAction::RemoveBackground => {
                "Remove the background and keep only the main subject on a clean backdrop"
            }
            QuickAction::Lighting => {
                "Improve the lighting with bright, natural daylight and balanced exposure"
            }
            QuickAction::Staging => {
                "Virtually stage this room with modern, tasteful furniture and decor"
            }
        }
    }

    pub fn edit_type(self) -> EditType {
        match self {
            QuickAction::Enhance => EditType::Generation,
            QuickAction::RemoveBackground => EditType::ObjectRemoval,
            QuickAction::Lighting => EditType::StyleTransfer,
            QuickAction::Staging => EditType::Inpainting,
        }
    }

    pub fn strength(self) -> f32 {
        match self {
            QuickAction::Enhance => 0.3,
            QuickAction::RemoveBackground => 0.9,
            QuickAction::Lighting => 0.5,
            QuickAction::Staging => 0.75,
        }
    }

    pub fn request(self, source: impl Into<ImageRef>) -> EditRequest {
        EditRequest::new(source, self.instruction())
            .with_edit_type(self.edit_type())
            .with_strength(self.strength())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_builds_a_valid_request() {
        for action in QuickAction::ALL {
            let request = action.request("https://cdn/house.jpg");
            assert_eq!(request.validate(), Ok(()), "{action:?}");
            assert_eq!(request.edit_type(), action.edit_type());
            assert_eq!(request.strength(), action.strength());
        }
    }
}
