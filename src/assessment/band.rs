use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComfortBand {
    TooLow,
    InfBorder,
    Optimum,
    SupBorder,
    TooHigh,
}

impl ComfortBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComfortBand::TooLow => "tooLow",
            ComfortBand::InfBorder => "infBorder",
            ComfortBand::Optimum => "optimum",
            ComfortBand::SupBorder => "supBorder",
            ComfortBand::TooHigh => "tooHigh",
        }
    }

    /// Coarse reading used by the decision table. The border bands sit inside
    /// the comfort interval, so they count as optimum there.
    pub fn level(&self) -> Level {
        match self {
            ComfortBand::TooLow => Level::TooLow,
            ComfortBand::InfBorder | ComfortBand::Optimum | ComfortBand::SupBorder => {
                Level::Optimum
            }
            ComfortBand::TooHigh => Level::TooHigh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Co2Band {
    Optimum,
    Acceptable,
    Harmful,
    Danger,
}

impl Co2Band {
    pub fn as_str(&self) -> &'static str {
        match self {
            Co2Band::Optimum => "optimum",
            Co2Band::Acceptable => "acceptable",
            Co2Band::Harmful => "harmful",
            Co2Band::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    TooLow,
    Optimum,
    TooHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Band {
    Comfort(ComfortBand),
    Co2(Co2Band),
}

impl Band {
    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Comfort(b) => b.as_str(),
            Band::Co2(b) => b.as_str(),
        }
    }

    pub fn comfort(&self) -> Option<ComfortBand> {
        match self {
            Band::Comfort(b) => Some(*b),
            Band::Co2(_) => None,
        }
    }

    pub fn co2(&self) -> Option<Co2Band> {
        match self {
            Band::Co2(b) => Some(*b),
            Band::Comfort(_) => None,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendBand {
    Falling,
    Constant,
    Rising,
}
