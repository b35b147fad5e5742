//! Mood → reasons taxonomy.
//!
//! Iteration order is insertion order, both for the built-in table and for a
//! JSON override file, so repeated runs visit work items in the same sequence.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Taxonomy JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Taxonomy has no moods")]
    Empty,

    #[error("Taxonomy contains a blank mood name")]
    BlankMood,

    #[error("Mood '{0}' has no reasons")]
    NoReasons(String),

    #[error("Mood '{0}' appears more than once")]
    DuplicateMood(String),
}

/// One (mood, reason) pair from the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoodReason {
    pub mood: String,
    pub reason: String,
}

/// A mood and its candidate reasons, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: String,
    pub reasons: Vec<String>,
}

/// Read-only taxonomy. Construct with [`Taxonomy::builtin`] or [`Taxonomy::from_json`].
#[derive(Debug, Clone)]
pub struct Taxonomy {
    moods: Vec<MoodEntry>,
}

impl Taxonomy {
    /// The twelve moods, grouped by energy/pleasantness quadrant.
    pub fn builtin() -> Self {
        let moods = BUILTIN_REASONS_BY_MOOD
            .iter()
            .map(|(mood, reasons)| MoodEntry {
                mood: (*mood).to_string(),
                reasons: reasons.iter().map(|r| (*r).to_string()).collect(),
            })
            .collect();
        Self { moods }
    }

    /// Parses a JSON array of `{ "mood": ..., "reasons": [...] }` objects.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let moods: Vec<MoodEntry> = serde_json::from_str(json)?;
        Self::from_entries(moods)
    }

    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn from_entries(moods: Vec<MoodEntry>) -> Result<Self, TaxonomyError> {
        if moods.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &moods {
            if entry.mood.trim().is_empty() {
                return Err(TaxonomyError::BlankMood);
            }
            if entry.reasons.is_empty() {
                return Err(TaxonomyError::NoReasons(entry.mood.clone()));
            }
            if !seen.insert(entry.mood.as_str()) {
                return Err(TaxonomyError::DuplicateMood(entry.mood.clone()));
            }
        }

        Ok(Self { moods })
    }

    pub fn moods(&self) -> &[MoodEntry] {
        &self.moods
    }

    /// Flattens the taxonomy: moods in order, reasons within a mood in order.
    pub fn pairs(&self) -> Vec<MoodReason> {
        self.moods
            .iter()
            .flat_map(|entry| {
                entry.reasons.iter().map(move |reason| MoodReason {
                    mood: entry.mood.clone(),
                    reason: reason.clone(),
                })
            })
            .collect()
    }

    pub fn pair_count(&self) -> usize {
        self.moods.iter().map(|e| e.reasons.len()).sum()
    }
}

const BUILTIN_REASONS_BY_MOOD: &[(&str, &[&str])] = &[
    // High energy + pleasant
    (
        "excited",
        &[
            "Upcoming event or opportunity",
            "New adventure or travel plans",
            "Anticipating a special occasion",
            "Starting something new and challenging",
            "Breakthrough or discovery",
            "Romantic anticipation or attraction",
        ],
    ),
    (
        "happy",
        &[
            "Recent accomplishment or success",
            "Positive social interaction",
            "Receiving good news",
            "Feeling appreciated or loved",
            "Beautiful weather or environment",
            "Spontaneous joy or gratitude",
        ],
    ),
    (
        "energetic",
        &[
            "Good physical health and vitality",
            "Productive morning routine",
            "Exercise or physical activity",
            "Caffeine or natural energy boost",
            "Motivated by clear goals",
            "Feeling physically strong and capable",
        ],
    ),
    // High energy + unpleasant
    (
        "angry",
        &[
            "Injustice or unfair treatment",
            "Boundaries being violated",
            "Feeling disrespected or dismissed",
            "Blocked goals or thwarted plans",
            "Witnessing wrongdoing",
            "Betrayal or broken trust",
        ],
    ),
    (
        "anxious",
        &[
            "Uncertainty about the future",
            "Important upcoming decision",
            "Fear of failure or judgment",
            "Health or safety concerns",
            "Social performance pressure",
            "Financial or security worries",
        ],
    ),
    (
        "stressed",
        &[
            "Multiple competing deadlines",
            "Overwhelming workload",
            "Time pressure and rushing",
            "Juggling too many responsibilities",
            "Difficult decision-making",
            "Pressure to meet expectations",
        ],
    ),
    // Low energy + pleasant
    (
        "calm",
        &[
            "Meditation or mindfulness practice",
            "Resolved conflict or problem",
            "Peaceful natural environment",
            "Sense of safety and security",
            "Deep breathing or relaxation",
            "Spiritual or philosophical reflection",
        ],
    ),
    (
        "content",
        &[
            "Acceptance of current circumstances",
            "Gratitude for what you have",
            "Feeling fulfilled in relationships",
            "Pride in personal progress",
            "Simple pleasures and comforts",
            "Alignment with personal values",
        ],
    ),
    (
        "relaxed",
        &[
            "End of a stressful period",
            "Comfortable physical environment",
            "Quality rest or leisure time",
            "Massage or physical relief",
            "Vacation or break from routine",
            "Letting go of control or worry",
        ],
    ),
    // Low energy + unpleasant
    (
        "sad",
        &[
            "Loss or grief",
            "Disappointment in outcomes",
            "Feeling misunderstood or alone",
            "Nostalgia or missing someone",
            "Empathy for others' suffering",
            "Unmet emotional needs",
        ],
    ),
    (
        "tired",
        &[
            "Physical or mental exhaustion",
            "Poor sleep quality or insomnia",
            "Emotional burnout",
            "Chronic stress effects",
            "Overcommitment and depletion",
            "Seasonal energy changes",
        ],
    ),
    (
        "bored",
        &[
            "Lack of mental stimulation",
            "Repetitive routine or monotony",
            "Underutilization of skills",
            "Absence of meaningful challenges",
            "Social isolation or understimulation",
            "Lack of purpose or direction",
        ],
    ),
];
