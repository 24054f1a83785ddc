//! Read-only reference index for identifier-to-name resolution.
//!
//! A [`ReferenceIndex`] is built once from [`ReferenceTables`] and never
//! mutated afterwards; share it behind an `Arc`. Types, groups and categories
//! keep only published rows, and the per-type industry tables keep only rows
//! whose type is published.

pub mod tables;

use std::collections::BTreeMap;

pub use tables::{
    ActivityMaterialRecord, ActivityProbabilityRecord, ActivityProductRecord, ActivityRecord, ActivitySkillRecord,
    ActivityTimeRecord, CategoryRecord, GroupRecord, MarketGroupRecord, ReferenceTables, TableLink, TypeKeyed,
    TypeRecord, industry_activities,
};

use crate::Error;

pub const TYPES_TABLE: &str = "invTypes";
pub const GROUPS_TABLE: &str = "invGroups";
pub const CATEGORIES_TABLE: &str = "invCategories";
pub const MARKET_GROUPS_TABLE: &str = "invMarketGroups";
pub const ACTIVITIES_TABLE: &str = "industryActivities";
pub const ACTIVITY_TIMES_TABLE: &str = "industryActivity";
pub const ACTIVITY_MATERIALS_TABLE: &str = "industryActivityMaterials";
pub const ACTIVITY_PRODUCTS_TABLE: &str = "industryActivityProducts";
pub const ACTIVITY_PROBABILITIES_TABLE: &str = "industryActivityProbabilities";
pub const ACTIVITY_SKILLS_TABLE: &str = "industryActivitySkills";

/// Group rows by type id, keeping only types present in `published`.
fn by_published_type<T: TypeKeyed>(rows: Vec<T>, published: &BTreeMap<i64, TypeRecord>) -> BTreeMap<i64, Vec<T>> {
    let mut grouped: BTreeMap<i64, Vec<T>> = BTreeMap::new();
    for row in rows {
        if published.contains_key(&row.type_id()) {
            grouped.entry(row.type_id()).or_default().push(row);
        }
    }
    grouped
}

/// Immutable lookup tables keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    types: BTreeMap<i64, TypeRecord>,
    groups: BTreeMap<i64, GroupRecord>,
    categories: BTreeMap<i64, CategoryRecord>,
    market_groups: BTreeMap<i64, MarketGroupRecord>,
    activities: BTreeMap<i64, ActivityRecord>,
    activity_times: BTreeMap<i64, Vec<ActivityTimeRecord>>,
    activity_materials: BTreeMap<i64, Vec<ActivityMaterialRecord>>,
    activity_products: BTreeMap<i64, Vec<ActivityProductRecord>>,
    activity_probabilities: BTreeMap<i64, Vec<ActivityProbabilityRecord>>,
    activity_skills: BTreeMap<i64, Vec<ActivitySkillRecord>>,
}

impl ReferenceIndex {
    /// Build the index, dropping unpublished types, groups and categories and
    /// industry rows of unpublished types.
    pub fn build(tables: ReferenceTables) -> Self {
        let ReferenceTables {
            types,
            groups,
            categories,
            market_groups,
            activities,
            activity_times,
            activity_materials,
            activity_products,
            activity_probabilities,
            activity_skills,
        } = tables;

        let types: BTreeMap<i64, TypeRecord> = types
            .into_iter()
            .filter(|t| t.published != 0)
            .map(|t| (t.type_id, t))
            .collect();

        let index = Self {
            activity_times: by_published_type(activity_times, &types),
            activity_materials: by_published_type(activity_materials, &types),
            activity_products: by_published_type(activity_products, &types),
            activity_probabilities: by_published_type(activity_probabilities, &types),
            activity_skills: by_published_type(activity_skills, &types),
            types,
            groups: groups
                .into_iter()
                .filter(|g| g.published != 0)
                .map(|g| (g.group_id, g))
                .collect(),
            categories: categories
                .into_iter()
                .filter(|c| c.published != 0)
                .map(|c| (c.category_id, c))
                .collect(),
            market_groups: market_groups.into_iter().map(|m| (m.market_group_id, m)).collect(),
            activities: activities.into_iter().map(|a| (a.activity_id, a)).collect(),
        };

        tracing::debug!(
            types = index.types.len(),
            groups = index.groups.len(),
            categories = index.categories.len(),
            market_groups = index.market_groups.len(),
            industry_types = index.activity_times.len(),
            "reference index built"
        );

        index
    }

    pub fn type_record(&self, type_id: i64) -> Result<&TypeRecord, Error> {
        self.types
            .get(&type_id)
            .ok_or(Error::UnknownReference { table: TYPES_TABLE, id: type_id })
    }

    pub fn type_name(&self, type_id: i64) -> Result<&str, Error> {
        Ok(&self.type_record(type_id)?.type_name)
    }

    pub fn group_id(&self, type_id: i64) -> Result<i64, Error> {
        Ok(self.type_record(type_id)?.group_id)
    }

    pub fn group_name(&self, group_id: i64) -> Result<&str, Error> {
        self.groups
            .get(&group_id)
            .map(|g| g.group_name.as_str())
            .ok_or(Error::UnknownReference { table: GROUPS_TABLE, id: group_id })
    }

    /// Market group of a type; types that are not on the market have none.
    pub fn market_group_id(&self, type_id: i64) -> Result<i64, Error> {
        self.type_record(type_id)?
            .market_group_id
            .ok_or(Error::UnknownReference { table: MARKET_GROUPS_TABLE, id: type_id })
    }

    pub fn market_group_name(&self, market_group_id: i64) -> Result<&str, Error> {
        self.market_groups
            .get(&market_group_id)
            .map(|m| m.market_group_name.as_str())
            .ok_or(Error::UnknownReference { table: MARKET_GROUPS_TABLE, id: market_group_id })
    }

    pub fn category_id(&self, group_id: i64) -> Result<i64, Error> {
        self.groups
            .get(&group_id)
            .map(|g| g.category_id)
            .ok_or(Error::UnknownReference { table: GROUPS_TABLE, id: group_id })
    }

    pub fn category_name(&self, category_id: i64) -> Result<&str, Error> {
        self.categories
            .get(&category_id)
            .map(|c| c.category_name.as_str())
            .ok_or(Error::UnknownReference { table: CATEGORIES_TABLE, id: category_id })
    }

    pub fn activity_name(&self, activity_id: i64) -> Result<&str, Error> {
        self.activities
            .get(&activity_id)
            .map(|a| a.activity_name.as_str())
            .ok_or(Error::UnknownReference { table: ACTIVITIES_TABLE, id: activity_id })
    }

    /// Published type ids in ascending order.
    pub fn published_type_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.types.keys().copied()
    }

    /// Activity durations for a blueprint type. Empty if it has none.
    pub fn activity_times(&self, type_id: i64) -> &[ActivityTimeRecord] {
        self.activity_times.get(&type_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn activity_materials(&self, type_id: i64) -> &[ActivityMaterialRecord] {
        self.activity_materials.get(&type_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn activity_products(&self, type_id: i64) -> &[ActivityProductRecord] {
        self.activity_products.get(&type_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn activity_probabilities(&self, type_id: i64) -> &[ActivityProbabilityRecord] {
        self.activity_probabilities.get(&type_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn activity_skills(&self, type_id: i64) -> &[ActivitySkillRecord] {
        self.activity_skills.get(&type_id).map(Vec::as_slice).unwrap_or_default()
    }
}
