//! Static collectible catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockKind {
    Cycles,
    Streak,
    FocusMinutes,
    Level,
}

/// Cumulative achievement bar: `stat >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnlockCondition {
    pub kind: UnlockKind,
    pub threshold: u32,
}

/// Achievement stats compared against [`UnlockCondition`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeStats {
    pub cycles: u32,
    pub streak: u32,
    pub focus_minutes: u32,
    pub level: u32,
}

impl UnlockCondition {
    pub const fn new(kind: UnlockKind, threshold: u32) -> Self {
        Self { kind, threshold }
    }

    pub fn is_met(&self, stats: &CumulativeStats) -> bool {
        let value = match self.kind {
            UnlockKind::Cycles => stats.cycles,
            UnlockKind::Streak => stats.streak,
            UnlockKind::FocusMinutes => stats.focus_minutes,
            UnlockKind::Level => stats.level,
        };
        value >= self.threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rarity: Rarity,
    pub unlock_condition: UnlockCondition,
    /// Base drop weight in `(0, 1]`.
    pub drop_weight: f64,
}

impl CollectibleDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rarity: Rarity,
        unlock_condition: UnlockCondition,
        drop_weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            rarity,
            unlock_condition,
            drop_weight,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Ordered, validated list of collectibles. Order matters: reward draws
/// walk candidates in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    entries: Vec<CollectibleDefinition>,
    starter: Option<String>,
}

impl Catalog {
    /// Validate and build a catalog.
    ///
    /// # Errors
    /// Returns an error for empty or duplicate ids, drop weights outside
    /// `(0, 1]`, or a starter that is not in the list.
    pub fn new(
        entries: Vec<CollectibleDefinition>,
        starter: Option<String>,
    ) -> Result<Self, ValidationError> {
        let mut seen = HashSet::new();
        for def in &entries {
            if def.id.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "id".into(),
                    message: "collectible id must not be empty".into(),
                });
            }
            if !seen.insert(def.id.as_str()) {
                return Err(ValidationError::DuplicateId {
                    collection: "catalog".into(),
                    id: def.id.clone(),
                });
            }
            if !def.drop_weight.is_finite() || def.drop_weight <= 0.0 || def.drop_weight > 1.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.drop_weight", def.id),
                    message: format!("{} is outside (0, 1]", def.drop_weight),
                });
            }
        }
        if let Some(id) = &starter {
            if !seen.contains(id.as_str()) {
                return Err(ValidationError::UnknownId {
                    collection: "catalog".into(),
                    id: id.clone(),
                });
            }
        }
        Ok(Self { entries, starter })
    }

    pub fn entries(&self) -> &[CollectibleDefinition] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&CollectibleDefinition> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Collectible granted on a fresh install.
    pub fn starter(&self) -> Option<&str> {
        self.starter.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The catalog shipped with the app.
    pub fn builtin() -> Self {
        use Rarity::*;
        use UnlockKind::*;

        let entries = vec![
            CollectibleDefinition::new(
                "focus-buddy",
                "Focus Buddy",
                Common,
                UnlockCondition::new(Cycles, 0),
                1.0,
            )
            .with_description("Your first study companion."),
            CollectibleDefinition::new(
                "nobita",
                "Nobita",
                Common,
                UnlockCondition::new(Cycles, 1),
                0.8,
            )
            .with_description("Gentle buddy for beginners."),
            CollectibleDefinition::new(
                "shizuka",
                "Shizuka",
                Rare,
                UnlockCondition::new(FocusMinutes, 120),
                0.5,
            )
            .with_description("Keeps things calm and consistent."),
            CollectibleDefinition::new(
                "suneo",
                "Suneo",
                Rare,
                UnlockCondition::new(Streak, 3),
                0.5,
            )
            .with_description("A stylish motivator."),
            CollectibleDefinition::new(
                "takeshi",
                "Takeshi Goda",
                Rare,
                UnlockCondition::new(Cycles, 20),
                0.4,
            )
            .with_description("Power through tough sessions."),
            CollectibleDefinition::new(
                "dorami",
                "Dorami",
                Epic,
                UnlockCondition::new(Level, 5),
                0.25,
            )
            .with_description("Cheerful helper for focused sprints."),
            CollectibleDefinition::new(
                "doraemon",
                "Doraemon",
                Legendary,
                UnlockCondition::new(FocusMinutes, 1500),
                0.1,
            )
            .with_description("Always ready with a gadget to keep you on task."),
        ];

        Self {
            entries,
            starter: Some("focus-buddy".into()),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
