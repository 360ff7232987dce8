//! Fixed code tables for the pregnancy-risk and controlled-substance fields.
//!
//! Both lookups are total: a code outside the known set maps to a fallback
//! description instead of failing.

pub const UNKNOWN_PREGNANCY_RISK: &str = "Unknown risk";
pub const UNLISTED_CSA_SCHEDULE: &str = "Unlisted.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PregnancyCategory {
    A,
    B,
    C,
    D,
    X,
    NotClassified,
}

impl PregnancyCategory {
    pub const ALL: [PregnancyCategory; 6] = [
        PregnancyCategory::A,
        PregnancyCategory::B,
        PregnancyCategory::C,
        PregnancyCategory::D,
        PregnancyCategory::X,
        PregnancyCategory::NotClassified,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "X" => Some(Self::X),
            "N" => Some(Self::NotClassified),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::X => "X",
            Self::NotClassified => "N",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::A => "No risk in first trimester.",
            Self::B => "No human risk, animal studies show none.",
            Self::C => "Animal risk shown; use only if benefits outweigh risks.",
            Self::D => "Positive evidence of fetal risk; benefits may still justify use.",
            Self::X => "High risk of fetal abnormalities; should not be used.",
            Self::NotClassified => "Not classified.",
        }
    }
}

/// U.S. Controlled Substances Act schedule as stored in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsaSchedule {
    I,
    II,
    III,
    IV,
    V,
    NotControlled,
    Multiple,
    Unknown,
}

impl CsaSchedule {
    pub const ALL: [CsaSchedule; 8] = [
        CsaSchedule::I,
        CsaSchedule::II,
        CsaSchedule::III,
        CsaSchedule::IV,
        CsaSchedule::V,
        CsaSchedule::NotControlled,
        CsaSchedule::Multiple,
        CsaSchedule::Unknown,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::I),
            "2" => Some(Self::II),
            "3" => Some(Self::III),
            "4" => Some(Self::IV),
            "5" => Some(Self::V),
            "N" => Some(Self::NotControlled),
            "M" => Some(Self::Multiple),
            "U" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::I => "1",
            Self::II => "2",
            Self::III => "3",
            Self::IV => "4",
            Self::V => "5",
            Self::NotControlled => "N",
            Self::Multiple => "M",
            Self::Unknown => "U",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::I => "Schedule I – High abuse risk, no accepted medical use.",
            Self::II => "Schedule II – High abuse risk, but accepted medical use.",
            Self::III => "Schedule III – Moderate abuse risk, accepted use.",
            Self::IV => "Schedule IV – Lower abuse risk.",
            Self::V => "Schedule V – Lowest abuse risk.",
            Self::NotControlled => "Not a controlled substance.",
            Self::Multiple => "Multiple schedules apply.",
            Self::Unknown => "Unknown CSA schedule.",
        }
    }
}

pub fn pregnancy_risk(code: &str) -> &'static str {
    PregnancyCategory::from_code(code).map_or(UNKNOWN_PREGNANCY_RISK, PregnancyCategory::description)
}

pub fn csa_description(code: &str) -> &'static str {
    CsaSchedule::from_code(code).map_or(UNLISTED_CSA_SCHEDULE, CsaSchedule::description)
}
