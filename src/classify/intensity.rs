use serde::{Serialize, Serializer};
use std::fmt;

/// Ordinal macroseismic intensity assigned to one observation.
///
/// Compare labels with [`IntensityLabel::rank`], never by name.
///
/// | Label                  | Rank |
/// |------------------------|------|
/// | Not felt               | 1    |
/// | Rarely felt            | 2    |
/// | Weak                   | 3    |
/// | Significantly observed | 4    |
/// | Strong                 | 5    |
/// | Mildly destructive     | 6    |
/// | Unclassified           | 1000 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntensityLabel {
    NotFelt,
    RarelyFelt,
    Weak,
    SignificantlyObserved,
    Strong,
    MildlyDestructive,
    Unclassified,
}

impl IntensityLabel {
    /// Real labels in ascending rank.
    pub const REAL: [IntensityLabel; 6] = [
        IntensityLabel::NotFelt,
        IntensityLabel::RarelyFelt,
        IntensityLabel::Weak,
        IntensityLabel::SignificantlyObserved,
        IntensityLabel::Strong,
        IntensityLabel::MildlyDestructive,
    ];

    pub fn rank(&self) -> u32 {
        match self {
            IntensityLabel::NotFelt => 1,
            IntensityLabel::RarelyFelt => 2,
            IntensityLabel::Weak => 3,
            IntensityLabel::SignificantlyObserved => 4,
            IntensityLabel::Strong => 5,
            IntensityLabel::MildlyDestructive => 6,
            IntensityLabel::Unclassified => 1000,
        }
    }

    pub fn is_real(&self) -> bool {
        *self != IntensityLabel::Unclassified
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntensityLabel::NotFelt => "Not felt",
            IntensityLabel::RarelyFelt => "Rarely felt",
            IntensityLabel::Weak => "Weak",
            IntensityLabel::SignificantlyObserved => "Significantly observed",
            IntensityLabel::Strong => "Strong",
            IntensityLabel::MildlyDestructive => "Mildly destructive",
            IntensityLabel::Unclassified => "Unclassified",
        }
    }

    /// Fill color used by map renderers.
    pub fn color(&self) -> &'static str {
        match self {
            IntensityLabel::NotFelt => "#d9d9d9",
            IntensityLabel::RarelyFelt => "#a6cee3",
            IntensityLabel::Weak => "#1f78b4",
            IntensityLabel::SignificantlyObserved => "#ffd92f",
            IntensityLabel::Strong => "#ff7f00",
            IntensityLabel::MildlyDestructive => "#e31a1c",
            IntensityLabel::Unclassified => "#7f7f7f",
        }
    }
}

impl fmt::Display for IntensityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for IntensityLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
