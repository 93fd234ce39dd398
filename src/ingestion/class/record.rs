//! Class record types.

use serde::{Deserialize, Serialize};

use crate::ingestion::statblock::record::{ImportIssues, Roll};
use crate::ingestion::vocabulary::{Ability, Skill};

/// A class or subclass feature gained at a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFeature {
    pub name: String,
    pub level: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpell {
    pub name: String,
    /// 0 until a level heading is seen
    pub level: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    pub level: Option<u32>,
    /// Normalized to `NdM` ("d8" becomes "1d8")
    pub hit_die: Option<String>,
    pub hit_points: Option<Roll>,
    pub proficiency_bonus: Option<i32>,
    pub armor_proficiencies: Vec<String>,
    pub weapon_proficiencies: Vec<String>,
    pub tool_proficiencies: Vec<String>,
    pub saving_throws: Vec<Ability>,
    pub skills: Vec<Skill>,
    pub equipment: Vec<String>,
    pub class_features: Vec<ClassFeature>,
    pub subclass: Option<String>,
    pub subclass_features: Vec<ClassFeature>,
    pub spellcasting_ability: Option<Ability>,
    pub spell_slots: Option<String>,
    pub cantrips: Vec<String>,
    pub spells: Vec<ClassSpell>,
    pub multiclassing: Option<String>,
    pub other_info: Option<String>,

    #[serde(default)]
    pub import_issues: ImportIssues,
}

impl ClassRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Every spell name, cantrips first.
    pub fn spell_names(&self) -> impl Iterator<Item = &str> {
        self.cantrips
            .iter()
            .map(String::as_str)
            .chain(self.spells.iter().map(|s| s.name.as_str()))
    }
}
