use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AstroError;

/// Observer equipment preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewingLevel {
    NakedEye,
    Entry,
    Intermediate,
    Advanced,
}

impl ViewingLevel {
    pub const ALL: [ViewingLevel; 4] = [
        ViewingLevel::NakedEye,
        ViewingLevel::Entry,
        ViewingLevel::Intermediate,
        ViewingLevel::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewingLevel::NakedEye => "naked-eye",
            ViewingLevel::Entry => "entry",
            ViewingLevel::Intermediate => "intermediate",
            ViewingLevel::Advanced => "advanced",
        }
    }

    pub fn capabilities(self) -> &'static ViewingCapabilityProfile {
        match self {
            ViewingLevel::NakedEye => &NAKED_EYE,
            ViewingLevel::Entry => &ENTRY,
            ViewingLevel::Intermediate => &INTERMEDIATE,
            ViewingLevel::Advanced => &ADVANCED,
        }
    }

    pub fn is_naked_eye(self) -> bool {
        self == ViewingLevel::NakedEye
    }
}

impl fmt::Display for ViewingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the preset keys as well as the descriptive labels clients tend to send,
/// e.g. "Entry-level telescope (60-80mm aperture)".
impl FromStr for ViewingLevel {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower.contains("entry") || lower.contains("60-80mm") {
            Ok(ViewingLevel::Entry)
        } else if lower.contains("intermediate") || lower.contains("100-150mm") {
            Ok(ViewingLevel::Intermediate)
        } else if lower.contains("advanced") || lower.contains("200mm") {
            Ok(ViewingLevel::Advanced)
        } else if lower.contains("naked") {
            Ok(ViewingLevel::NakedEye)
        } else {
            Err(AstroError::invalid(
                "viewingLevel",
                "viewingLevel must be one of: naked-eye, entry, intermediate, advanced",
            ))
        }
    }
}

/// What an observer's equipment can resolve
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingCapabilityProfile {
    pub max_magnitude: f64,
    pub min_altitude: f64,
    pub description: &'static str,
}

static NAKED_EYE: ViewingCapabilityProfile = ViewingCapabilityProfile {
    max_magnitude: 6.0,
    min_altitude: 20.0,
    description: "Naked eye viewing",
};

static ENTRY: ViewingCapabilityProfile = ViewingCapabilityProfile {
    max_magnitude: 10.0,
    min_altitude: 15.0,
    description: "Entry-level telescope (60-80mm aperture)",
};

static INTERMEDIATE: ViewingCapabilityProfile = ViewingCapabilityProfile {
    max_magnitude: 12.0,
    min_altitude: 10.0,
    description: "Intermediate telescope (100-150mm aperture)",
};

static ADVANCED: ViewingCapabilityProfile = ViewingCapabilityProfile {
    max_magnitude: 14.0,
    min_altitude: 5.0,
    description: "Advanced telescope (200mm+ aperture)",
};

/// Per-hour viewing verdict for a body, most favorable first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatingTier {
    Excellent,
    Good,
    Fair,
    Poor,
    TooFaint,
    NotVisible,
}

impl RatingTier {
    /// Tiers that make it into a night summary
    pub fn is_recommended(self) -> bool {
        self <= RatingTier::Fair
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewingRating {
    pub rating: RatingTier,
    pub reason: String,
}

/// Rates one body at one hour. First matching rule wins.
pub fn rate_body(
    altitude: f64,
    magnitude: Option<f64>,
    profile: &ViewingCapabilityProfile,
    naked_eye: bool,
) -> ViewingRating {
    if altitude < 0.0 {
        return ViewingRating {
            rating: RatingTier::NotVisible,
            reason: "Below horizon".to_string(),
        };
    }
    if altitude < profile.min_altitude {
        return ViewingRating {
            rating: RatingTier::Poor,
            reason: "Too low on horizon".to_string(),
        };
    }
    if let Some(mag) = magnitude {
        if mag > profile.max_magnitude {
            let target = if naked_eye { "naked eye" } else { "your telescope" };
            return ViewingRating {
                rating: RatingTier::TooFaint,
                reason: format!("Too faint for {}", target),
            };
        }
    }

    let (mut rating, mut reason) = if altitude > 45.0 {
        (
            RatingTier::Excellent,
            String::from("High in sky, minimal atmospheric interference"),
        )
    } else if altitude > 30.0 {
        (RatingTier::Good, String::from("Good viewing angle"))
    } else {
        (RatingTier::Fair, String::from("Viewable but lower in sky"))
    };

    match magnitude {
        Some(mag) if mag < 0.0 => reason.push_str(", very bright"),
        Some(mag) if mag > 5.0 => {
            if rating == RatingTier::Excellent {
                rating = RatingTier::Good;
            }
            reason.push_str(", relatively faint");
        }
        _ => {}
    }

    ViewingRating { rating, reason }
}
