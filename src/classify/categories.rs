//! Normalizes raw questionnaire codes into categorical dimensions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::observation::Observation;

/// Raw values that mean "nothing reported" in an indicator column.
pub const NEGATIVE_SENTINELS: &[&str] = &["", "0", "ne", "no", "false", "nan", "null"];

/// Returns true if an indicator value reports an observed effect.
///
/// Trimmed, non-empty, and not one of [`NEGATIVE_SENTINELS`] (case-insensitive).
pub fn is_reported(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    !NEGATIVE_SENTINELS.contains(&v.as_str())
}

fn normalize_code(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectEffect {
    HeavyFurniture,
    Windows,
    Doors,
    HangingItems,
    Dishes,
    SmallObjects,
    Liquid,
}

impl fmt::Display for ObjectEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectEffect::HeavyFurniture => "heavy furniture",
            ObjectEffect::Windows => "windows",
            ObjectEffect::Doors => "doors",
            ObjectEffect::HangingItems => "hanging items",
            ObjectEffect::Dishes => "dishes",
            ObjectEffect::SmallObjects => "small objects",
            ObjectEffect::Liquid => "liquid",
        };
        f.write_str(name)
    }
}

/// Set of object effects reported on one observation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectEffects(BTreeSet<ObjectEffect>);

impl ObjectEffects {
    pub fn new(effects: impl IntoIterator<Item = ObjectEffect>) -> Self {
        Self(effects.into_iter().collect())
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, effect: ObjectEffect) -> bool {
        self.0.contains(&effect)
    }

    pub fn any_of(&self, effects: &[ObjectEffect]) -> bool {
        effects.iter().any(|e| self.0.contains(e))
    }

    /// Non-empty and every reported effect is in `effects`.
    pub fn only(&self, effects: &[ObjectEffect]) -> bool {
        !self.0.is_empty() && self.0.iter().all(|e| effects.contains(e))
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectEffect> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Indoor,
    Elsewhere,
    Unspecified,
}

impl Location {
    pub fn from_code(raw: Option<&str>) -> Self {
        match raw.map(normalize_code) {
            None => Location::Unspecified,
            Some(code) if code == "budova" => Location::Indoor,
            Some(_) => Location::Elsewhere,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Location::Indoor => "Indoors",
            Location::Elsewhere => "Outdoors or not in a building",
            Location::Unspecified => "Unspecified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeltBy {
    OnlyRespondent,
    SeveralOrMost,
    Unspecified,
}

impl FeltBy {
    pub fn from_code(raw: Option<&str>) -> Self {
        match raw.map(normalize_code).as_deref() {
            Some("pouze vy") => FeltBy::OnlyRespondent,
            Some("většina ano") => FeltBy::SeveralOrMost,
            _ => FeltBy::Unspecified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeltBy::OnlyRespondent => "Felt only by the respondent",
            FeltBy::SeveralOrMost => "Felt by several or most people present",
            FeltBy::Unspecified => "Unspecified or other answer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TremorKind {
    Strong,
    Weak,
    None,
    NotFelt,
    Other,
    Unspecified,
}

/// Exact code for the lightest shaking answer.
pub const WEAK_SHAKING: &str = "slabé chvění";

/// Tremor description: a bucket plus the normalized raw code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tremor {
    pub kind: TremorKind,
    pub code: Option<String>,
}

impl Tremor {
    pub fn from_code(raw: Option<&str>) -> Self {
        let code = raw.map(normalize_code).filter(|c| !c.is_empty());
        let kind = match code.as_deref() {
            None => TremorKind::Unspecified,
            Some("silné otřesy") => TremorKind::Strong,
            Some(WEAK_SHAKING) | Some("lehké otřesy") | Some("mírné otřesy") => TremorKind::Weak,
            Some("žádné") => TremorKind::None,
            Some("nepocítěno") => TremorKind::NotFelt,
            Some(_) => TremorKind::Other,
        };
        Self { kind, code }
    }

    pub fn is(&self, kind: TremorKind) -> bool {
        self.kind == kind
    }

    pub fn label(&self) -> String {
        self.code.clone().unwrap_or_else(|| "Unspecified".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Damage {
    Reported,
    NotReported,
    Unspecified,
}

impl Damage {
    pub fn from_code(raw: Option<&str>) -> Self {
        match raw.map(normalize_code).as_deref() {
            Some("bylo") => Damage::Reported,
            Some("nebylo") => Damage::NotReported,
            _ => Damage::Unspecified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Damage::Reported => "Damage reported",
            Damage::NotReported => "No damage reported",
            Damage::Unspecified => "Unspecified or other value",
        }
    }
}

/// Fear flag: the numeric answer equals 1.
pub fn fear_from_code(raw: Option<&str>) -> bool {
    raw.and_then(|v| v.trim().replace(',', ".").parse::<f64>().ok())
        .is_some_and(|v| v == 1.0)
}

pub fn fear_label(fear: bool) -> &'static str {
    if fear { "Fear or panic" } else { "No or unspecified" }
}

/// All normalized dimensions for one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categories {
    pub location: Location,
    pub felt_by: FeltBy,
    pub tremor: Tremor,
    pub fear: bool,
    pub damage: Damage,
    pub effects: ObjectEffects,
    pub sound_heard: bool,
}

impl Categories {
    pub fn from_observation(obs: &Observation) -> Self {
        let effects = ObjectEffects::new(
            obs.movement
                .iter()
                .filter(|(_, value)| is_reported(value))
                .map(|(effect, _)| *effect),
        );

        Self {
            location: Location::from_code(obs.location.as_deref()),
            felt_by: FeltBy::from_code(obs.felt_by.as_deref()),
            tremor: Tremor::from_code(obs.tremor.as_deref()),
            fear: fear_from_code(obs.fear.as_deref()),
            damage: Damage::from_code(obs.damage.as_deref()),
            effects,
            sound_heard: obs.sound.iter().any(|(_, value)| is_reported(value)),
        }
    }

    pub fn object_movement(&self) -> bool {
        !self.effects.is_empty()
    }
}
