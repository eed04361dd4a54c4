use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Risk grade attached to an interaction or a whole analysis.
    RiskLevel {
        High => "high",
        Moderate => "moderate",
        Low => "low",
        None => "none",
        Unknown => "unknown",
    }
);

impl RiskLevel {
    /// Tolerant parse for free-text grades coming back from the model.
    pub fn parse(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "high" | "severe" | "major" | "contraindicated" | "critical" | "serious" => Self::High,
            "moderate" | "medium" => Self::Moderate,
            "low" | "minor" | "mild" => Self::Low,
            "none" | "no interaction" | "safe" | "no risk" => Self::None,
            _ => {
                // "High risk", "Moderate-to-high" and similar phrasings
                if lower.starts_with("high") || lower.starts_with("severe") {
                    Self::High
                } else if lower.starts_with("moderate") || lower.starts_with("medium") {
                    Self::Moderate
                } else if lower.starts_with("low") || lower.starts_with("minor") {
                    Self::Low
                } else {
                    Self::Unknown
                }
            }
        }
    }

    /// Ordering weight for worst-of aggregation: Unknown < None < Low < Moderate < High.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::None => 1,
            Self::Low => 2,
            Self::Moderate => 3,
            Self::High => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
            Self::None => "None",
            Self::Unknown => "Unknown",
        }
    }

    /// Worst risk of an iterator, `None` risk when empty.
    pub fn worst<I: IntoIterator<Item = RiskLevel>>(levels: I) -> RiskLevel {
        levels
            .into_iter()
            .max_by_key(|r| r.rank())
            .unwrap_or(RiskLevel::None)
    }
}

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

str_enum!(
    /// Interaction families checked by an analysis.
    InteractionCategory {
        DrugDrug => "drug_drug",
        DrugSubstance => "drug_substance",
        DrugAllergy => "drug_allergy",
        DrugCondition => "drug_condition",
        Pharmacogenetic => "pharmacogenetic",
        Beers => "beers",
    }
);

impl InteractionCategory {
    /// All categories in display order.
    pub fn all() -> &'static [InteractionCategory] {
        &[
            Self::DrugDrug,
            Self::DrugSubstance,
            Self::DrugAllergy,
            Self::DrugCondition,
            Self::Pharmacogenetic,
            Self::Beers,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::DrugDrug => "Drug-Drug Interactions",
            Self::DrugSubstance => "Drug-Substance Interactions",
            Self::DrugAllergy => "Drug-Allergy Interactions",
            Self::DrugCondition => "Drug-Condition Interactions",
            Self::Pharmacogenetic => "Pharmacogenetic Interactions",
            Self::Beers => "Beers Criteria",
        }
    }

    /// Accepts snake_case keys, camelCase keys and a few spelled-out forms.
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized: String = key
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "drugdrug" | "drugdruginteractions" => Some(Self::DrugDrug),
            "drugsubstance" | "drugsubstanceinteractions" | "drugfood" | "drugalcohol" => {
                Some(Self::DrugSubstance)
            }
            "drugallergy" | "drugallergyinteractions" | "allergy" => Some(Self::DrugAllergy),
            "drugcondition" | "drugconditioninteractions" | "drugdisease" => {
                Some(Self::DrugCondition)
            }
            "pharmacogenetic" | "pharmacogenetics" | "pgx" | "druggene" => {
                Some(Self::Pharmacogenetic)
            }
            "beers" | "beerscriteria" => Some(Self::Beers),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn risk_parse_synonyms() {
        assert_eq!(RiskLevel::parse("Severe"), RiskLevel::High);
        assert_eq!(RiskLevel::parse(" MAJOR "), RiskLevel::High);
        assert_eq!(RiskLevel::parse("medium"), RiskLevel::Moderate);
        assert_eq!(RiskLevel::parse("minor"), RiskLevel::Low);
        assert_eq!(RiskLevel::parse("No interaction"), RiskLevel::None);
        assert_eq!(RiskLevel::parse("High risk"), RiskLevel::High);
        assert_eq!(RiskLevel::parse("banana"), RiskLevel::Unknown);
    }

    #[test]
    fn risk_ordering() {
        assert!(RiskLevel::High > RiskLevel::Moderate);
        assert!(RiskLevel::Moderate > RiskLevel::Low);
        assert!(RiskLevel::Low > RiskLevel::None);
        assert!(RiskLevel::None > RiskLevel::Unknown);
    }

    #[test]
    fn worst_of_empty_is_none() {
        assert_eq!(RiskLevel::worst(Vec::new()), RiskLevel::None);
        assert_eq!(
            RiskLevel::worst(vec![RiskLevel::Low, RiskLevel::High, RiskLevel::Unknown]),
            RiskLevel::High
        );
    }

    #[test]
    fn strict_from_str_rejects_synonyms() {
        assert_eq!(RiskLevel::from_str("high").unwrap(), RiskLevel::High);
        assert!(RiskLevel::from_str("severe").is_err());
    }

    #[test]
    fn category_keys_round_trip_through_serde() {
        let json = serde_json::to_string(&InteractionCategory::DrugAllergy).unwrap();
        assert_eq!(json, "\"drug_allergy\"");
    }

    #[test]
    fn category_from_key_variants() {
        assert_eq!(
            InteractionCategory::from_key("drugDrug"),
            Some(InteractionCategory::DrugDrug)
        );
        assert_eq!(
            InteractionCategory::from_key("drug-condition"),
            Some(InteractionCategory::DrugCondition)
        );
        assert_eq!(
            InteractionCategory::from_key("PGx"),
            Some(InteractionCategory::Pharmacogenetic)
        );
        assert_eq!(
            InteractionCategory::from_key("beersCriteria"),
            Some(InteractionCategory::Beers)
        );
        assert_eq!(InteractionCategory::from_key("summary"), None);
    }

    #[test]
    fn all_categories_have_titles() {
        assert_eq!(InteractionCategory::all().len(), 6);
        assert!(InteractionCategory::all().iter().all(|c| !c.title().is_empty()));
    }
}
