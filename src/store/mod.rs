//! Plan Store
//!
//! Persistence seam for generated plans and the points ledger. The store keeps
//! at most one active plan per user and category: [`activate_plan`] always
//! deactivates the previous plans before inserting the new one.

pub mod memory;
pub mod persistence;

pub use memory::MemoryPlanStore;
pub use persistence::SledPlanStore;

use crate::error::StoreError;
use crate::types::{DietPlan, WorkoutPlan};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanCategory {
    Workout,
    Diet,
}

impl PlanCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanCategory::Workout => "workout",
            PlanCategory::Diet => "diet",
        }
    }
}

impl std::str::FromStr for PlanCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "workout" => Ok(PlanCategory::Workout),
            "diet" => Ok(PlanCategory::Diet),
            other => Err(format!("unknown plan category '{}' (workout, diet)", other)),
        }
    }
}

/// How a plan was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Ai,
    Manual,
    Default,
}

/// A plan ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlanRecord {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub estimated_weeks: Option<u32>,
    /// Serialized WorkoutPlan or DietPlan.
    pub plan_data: Value,
    pub category: PlanCategory,
    pub plan_type: PlanType,
    pub split_type: Option<String>,
}

impl NewPlanRecord {
    pub fn workout(
        user_id: impl Into<String>,
        plan: &WorkoutPlan,
        plan_type: PlanType,
        split_type: Option<String>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            user_id: user_id.into(),
            name: plan.name.clone(),
            description: plan.description.clone(),
            estimated_weeks: Some(plan.estimated_weeks),
            plan_data: serde_json::to_value(plan)?,
            category: PlanCategory::Workout,
            plan_type,
            split_type,
        })
    }

    pub fn diet(
        user_id: impl Into<String>,
        plan: &DietPlan,
        plan_type: PlanType,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            user_id: user_id.into(),
            name: format!("{} kcal diet", plan.daily_calories),
            description: format!(
                "{} meals, {}g protein / {}g carbs / {}g fat",
                plan.meals.len(),
                plan.macros.protein,
                plan.macros.carbs,
                plan.macros.fat
            ),
            estimated_weeks: None,
            plan_data: serde_json::to_value(plan)?,
            category: PlanCategory::Diet,
            plan_type,
            split_type: None,
        })
    }
}

/// A stored plan, including its generated identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: u64,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub estimated_weeks: Option<u32>,
    pub plan_data: Value,
    pub is_active: bool,
    pub category: PlanCategory,
    pub plan_type: PlanType,
    pub split_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A points ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub user_id: String,
    pub points: i64,
    pub reason: String,
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Insert a record as active and return it with its generated id.
    async fn insert_plan(&self, record: NewPlanRecord) -> Result<PlanRecord, StoreError>;

    /// Mark every active plan of the user in `category` inactive. Returns how
    /// many plans changed.
    async fn deactivate_plans(&self, user_id: &str, category: PlanCategory) -> Result<usize, StoreError>;

    async fn active_plan(&self, user_id: &str, category: PlanCategory) -> Result<Option<PlanRecord>, StoreError>;

    async fn record_points(&self, entry: PointsEntry) -> Result<(), StoreError>;

    /// Sum of every points entry recorded for the user.
    async fn points_total(&self, user_id: &str) -> Result<i64, StoreError>;
}

/// Replace the user's active plan in the record's category.
pub async fn activate_plan(store: &dyn PlanStore, record: NewPlanRecord) -> Result<PlanRecord, StoreError> {
    if record.user_id.trim().is_empty() {
        return Err(StoreError::InvalidRecord("user_id is empty".to_string()));
    }
    let deactivated = store.deactivate_plans(&record.user_id, record.category).await?;
    let stored = store.insert_plan(record).await?;
    info!(
        user_id = %stored.user_id,
        category = stored.category.as_str(),
        plan_id = stored.id,
        deactivated,
        "Plan activated"
    );
    Ok(stored)
}
