//! Rule-based intensity estimation.
//!
//! [`RULES`] is a priority cascade: rules overlap, and the first one that
//! matches decides the label. Reordering the table changes results.

use crate::classify::categories::ObjectEffect::{
    Dishes, Doors, HangingItems, HeavyFurniture, SmallObjects, Windows,
};
use crate::classify::categories::{
    Categories, Damage, FeltBy, Location, ObjectEffect, TremorKind, WEAK_SHAKING,
};
use crate::classify::intensity::IntensityLabel;

const SMALL_OR_DISHES: &[ObjectEffect] = &[SmallObjects, Dishes];
const STRONG_EFFECTS: &[ObjectEffect] = &[SmallObjects, Dishes, HangingItems, Doors, Windows];
const HOUSEHOLD_EFFECTS: &[ObjectEffect] = &[Windows, Doors, Dishes, HangingItems];
const OPENINGS: &[ObjectEffect] = &[Windows, Doors];
const RATTLING_EFFECTS: &[ObjectEffect] = &[Windows, Doors, Dishes, SmallObjects];
const NON_HANGING_EFFECTS: &[ObjectEffect] = &[Windows, Doors, Dishes, SmallObjects, HeavyFurniture];

/// One entry of the decision table.
pub struct Rule {
    pub name: &'static str,
    pub label: IntensityLabel,
    predicate: fn(&Categories) -> bool,
}

impl Rule {
    pub fn matches(&self, c: &Categories) -> bool {
        (self.predicate)(c)
    }
}

pub static RULES: &[Rule] = &[
    Rule {
        name: "damage reported",
        label: IntensityLabel::MildlyDestructive,
        predicate: damage_reported,
    },
    Rule {
        name: "fear, most felt, strong tremor, small objects or dishes",
        label: IntensityLabel::MildlyDestructive,
        predicate: fear_strong_falling_objects,
    },
    Rule {
        name: "strong tremor or fearful majority, objects moved",
        label: IntensityLabel::Strong,
        predicate: strong_with_objects,
    },
    Rule {
        name: "most felt, strong tremor, small objects",
        label: IntensityLabel::Strong,
        predicate: most_strong_small_objects,
    },
    Rule {
        name: "strong tremor without fear, household effects",
        label: IntensityLabel::SignificantlyObserved,
        predicate: strong_calm_household,
    },
    Rule {
        name: "several indoors, household effects",
        label: IntensityLabel::SignificantlyObserved,
        predicate: several_indoor_household,
    },
    Rule {
        name: "several indoors, weak tremor, windows or doors",
        label: IntensityLabel::SignificantlyObserved,
        predicate: several_indoor_weak_openings,
    },
    Rule {
        name: "several indoors, weak tremor, nothing rattled",
        label: IntensityLabel::Weak,
        predicate: several_indoor_weak_quiet,
    },
    Rule {
        name: "respondent alone indoors, weak tremor, calm",
        label: IntensityLabel::Weak,
        predicate: alone_indoor_weak_calm,
    },
    Rule {
        name: "hanging items only",
        label: IntensityLabel::Weak,
        predicate: hanging_items_only,
    },
    Rule {
        name: "respondent alone indoors, weak shaking, no effects",
        label: IntensityLabel::RarelyFelt,
        predicate: alone_indoor_weak_shaking,
    },
    Rule {
        name: "no tremor",
        label: IntensityLabel::NotFelt,
        predicate: no_tremor,
    },
    Rule {
        name: "not felt",
        label: IntensityLabel::NotFelt,
        predicate: not_felt,
    },
];

/// Returns the label and the 1-based number of the rule that produced it.
pub fn classify(c: &Categories) -> (IntensityLabel, Option<usize>) {
    RULES
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.matches(c))
        .map(|(i, rule)| (rule.label, Some(i + 1)))
        .unwrap_or((IntensityLabel::Unclassified, None))
}

pub fn estimate(c: &Categories) -> IntensityLabel {
    classify(c).0
}

fn most(c: &Categories) -> bool {
    c.felt_by == FeltBy::SeveralOrMost
}

fn alone(c: &Categories) -> bool {
    c.felt_by == FeltBy::OnlyRespondent
}

fn indoor(c: &Categories) -> bool {
    c.location == Location::Indoor
}

fn strong(c: &Categories) -> bool {
    c.tremor.is(TremorKind::Strong)
}

fn weak(c: &Categories) -> bool {
    c.tremor.is(TremorKind::Weak)
}

fn damage_reported(c: &Categories) -> bool {
    c.damage == Damage::Reported
}

fn fear_strong_falling_objects(c: &Categories) -> bool {
    c.fear && most(c) && strong(c) && c.effects.any_of(SMALL_OR_DISHES)
}

fn strong_with_objects(c: &Categories) -> bool {
    (strong(c) || (most(c) && c.fear)) && c.effects.any_of(STRONG_EFFECTS)
}

fn most_strong_small_objects(c: &Categories) -> bool {
    most(c) && strong(c) && c.effects.has(SmallObjects)
}

fn strong_calm_household(c: &Categories) -> bool {
    strong(c) && !c.fear && c.effects.any_of(HOUSEHOLD_EFFECTS)
}

fn several_indoor_household(c: &Categories) -> bool {
    most(c) && indoor(c) && c.effects.any_of(HOUSEHOLD_EFFECTS)
}

fn several_indoor_weak_openings(c: &Categories) -> bool {
    most(c) && indoor(c) && weak(c) && c.effects.any_of(OPENINGS)
}

fn several_indoor_weak_quiet(c: &Categories) -> bool {
    most(c) && indoor(c) && weak(c) && !c.effects.any_of(RATTLING_EFFECTS)
}

fn alone_indoor_weak_calm(c: &Categories) -> bool {
    alone(c)
        && indoor(c)
        && weak(c)
        && !c.fear
        && (c.effects.is_empty() || c.effects.only(&[HangingItems]))
}

fn hanging_items_only(c: &Categories) -> bool {
    c.effects.has(HangingItems)
        && !strong(c)
        && !c.fear
        && !c.effects.any_of(NON_HANGING_EFFECTS)
}

fn alone_indoor_weak_shaking(c: &Categories) -> bool {
    alone(c)
        && indoor(c)
        && c.tremor.code.as_deref() == Some(WEAK_SHAKING)
        && !c.fear
        && c.effects.is_empty()
}

fn no_tremor(c: &Categories) -> bool {
    c.tremor.is(TremorKind::None)
        && (c.felt_by == FeltBy::Unspecified || (alone(c) && c.effects.is_empty() && !c.fear))
}

fn not_felt(c: &Categories) -> bool {
    c.tremor.is(TremorKind::NotFelt)
}
