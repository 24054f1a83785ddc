//! Static Data Export table rows.
//!
//! Field names follow the SDE JSON conversion (`typeID`, `groupName`, ...);
//! both the `ID` and `Id` spellings are accepted for identifiers.

use serde::{Deserialize, Serialize};

/// Entry of the SDE table index (`tables.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLink {
    pub name: String,
    pub href: String,
}

fn published_default() -> i64 {
    1
}

/// Row of `invTypes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRecord {
    #[serde(rename = "typeID", alias = "typeId")]
    pub type_id: i64,
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "groupID", alias = "groupId")]
    pub group_id: i64,
    #[serde(default, rename = "marketGroupID", alias = "marketGroupId")]
    pub market_group_id: Option<i64>,
    #[serde(default = "published_default")]
    pub published: i64,
}

/// Row of `invGroups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    #[serde(rename = "groupID", alias = "groupId")]
    pub group_id: i64,
    pub group_name: String,
    #[serde(rename = "categoryID", alias = "categoryId")]
    pub category_id: i64,
    #[serde(default = "published_default")]
    pub published: i64,
}

/// Row of `invCategories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    #[serde(rename = "categoryID", alias = "categoryId")]
    pub category_id: i64,
    pub category_name: String,
    #[serde(default = "published_default")]
    pub published: i64,
}

/// Row of `invMarketGroups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketGroupRecord {
    #[serde(rename = "marketGroupID", alias = "marketGroupId")]
    pub market_group_id: i64,
    pub market_group_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Industry activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(rename = "activityID", alias = "activityId")]
    pub activity_id: i64,
    pub activity_name: String,
}

/// The fixed list of industry activities.
pub fn industry_activities() -> Vec<ActivityRecord> {
    [
        (1, "Manufacturing"),
        (3, "Researching Time Efficiency"),
        (4, "Researching Material Efficiency"),
        (5, "Copying"),
        (8, "Invention"),
        (9, "Reactions"),
    ]
    .into_iter()
    .map(|(activity_id, name)| ActivityRecord { activity_id, activity_name: name.to_string() })
    .collect()
}

/// Rows of the per-type industry tables, grouped by the blueprint or formula type.
pub trait TypeKeyed {
    fn type_id(&self) -> i64;
}

/// Row of `industryActivity`: how long an activity takes on a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTimeRecord {
    #[serde(rename = "typeID", alias = "typeId")]
    pub type_id: i64,
    #[serde(rename = "activityID", alias = "activityId")]
    pub activity_id: i64,
    pub time: i64,
}

/// Row of `industryActivityMaterials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMaterialRecord {
    #[serde(rename = "typeID", alias = "typeId")]
    pub type_id: i64,
    #[serde(rename = "activityID", alias = "activityId")]
    pub activity_id: i64,
    #[serde(rename = "materialTypeID", alias = "materialTypeId")]
    pub material_type_id: i64,
    pub quantity: i64,
}

/// Row of `industryActivityProducts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProductRecord {
    #[serde(rename = "typeID", alias = "typeId")]
    pub type_id: i64,
    #[serde(rename = "activityID", alias = "activityId")]
    pub activity_id: i64,
    #[serde(rename = "productTypeID", alias = "productTypeId")]
    pub product_type_id: i64,
    pub quantity: i64,
}

/// Row of `industryActivityProbabilities` (invention chances).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProbabilityRecord {
    #[serde(rename = "typeID", alias = "typeId")]
    pub type_id: i64,
    #[serde(rename = "activityID", alias = "activityId")]
    pub activity_id: i64,
    #[serde(rename = "productTypeID", alias = "productTypeId")]
    pub product_type_id: i64,
    pub probability: f64,
}

/// Row of `industryActivitySkills`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySkillRecord {
    #[serde(rename = "typeID", alias = "typeId")]
    pub type_id: i64,
    #[serde(rename = "activityID", alias = "activityId")]
    pub activity_id: i64,
    #[serde(rename = "skillID", alias = "skillId")]
    pub skill_id: i64,
    pub level: i64,
}

macro_rules! type_keyed {
    ($($record:ty),+ $(,)?) => {
        $(impl TypeKeyed for $record {
            fn type_id(&self) -> i64 {
                self.type_id
            }
        })+
    };
}

type_keyed!(
    ActivityTimeRecord,
    ActivityMaterialRecord,
    ActivityProductRecord,
    ActivityProbabilityRecord,
    ActivitySkillRecord,
);

/// Unfiltered table contents, as downloaded.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub types: Vec<TypeRecord>,
    pub groups: Vec<GroupRecord>,
    pub categories: Vec<CategoryRecord>,
    pub market_groups: Vec<MarketGroupRecord>,
    pub activities: Vec<ActivityRecord>,
    pub activity_times: Vec<ActivityTimeRecord>,
    pub activity_materials: Vec<ActivityMaterialRecord>,
    pub activity_products: Vec<ActivityProductRecord>,
    pub activity_probabilities: Vec<ActivityProbabilityRecord>,
    pub activity_skills: Vec<ActivitySkillRecord>,
}
