//! Persistence layer for the plan store

use super::{NewPlanRecord, PlanCategory, PlanRecord, PlanStore, PointsEntry};
use crate::error::StoreError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::Path;

const PLANS_TREE: &str = "plans";
const POINTS_TREE: &str = "points";

/// Sled-based implementation of [`PlanStore`].
///
/// Plans and points entries live in separate trees keyed by big-endian ids,
/// so iteration follows insertion order. Values are JSON because `plan_data`
/// is an arbitrary JSON document.
pub struct SledPlanStore {
    db: sled::Db,
    plans: sled::Tree,
    points: sled::Tree,
}

fn backend(context: &'static str) -> impl FnOnce(sled::Error) -> StoreError {
    move |e| StoreError::Backend(format!("{}: {}", context, e))
}

impl SledPlanStore {
    /// Open (or create) the database directory at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(backend("Failed to open plan database"))?;
        let plans = db
            .open_tree(PLANS_TREE)
            .map_err(backend("Failed to open plans tree"))?;
        let points = db
            .open_tree(POINTS_TREE)
            .map_err(backend("Failed to open points tree"))?;
        Ok(Self { db, plans, points })
    }

    /// Every stored plan, oldest first.
    pub fn plans(&self) -> Result<Vec<PlanRecord>, StoreError> {
        values(&self.plans)
    }

    pub fn plans_for(&self, user_id: &str) -> Result<Vec<PlanRecord>, StoreError> {
        Ok(self
            .plans()?
            .into_iter()
            .filter(|plan| plan.user_id == user_id)
            .collect())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(backend("Failed to flush plan database"))?;
        Ok(())
    }

    fn next_id(&self) -> Result<u64, StoreError> {
        // sled ids start at zero; plan ids start at one.
        Ok(self
            .db
            .generate_id()
            .map_err(backend("Failed to allocate id"))?
            + 1)
    }
}

fn values<T: DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>, StoreError> {
    let mut records = Vec::new();
    for item in tree.iter() {
        let (_, value) = item.map_err(backend("Failed to iterate store"))?;
        records.push(serde_json::from_slice(&value)?);
    }
    Ok(records)
}

#[async_trait]
impl PlanStore for SledPlanStore {
    async fn insert_plan(&self, record: NewPlanRecord) -> Result<PlanRecord, StoreError> {
        let stored = PlanRecord {
            id: self.next_id()?,
            user_id: record.user_id,
            name: record.name,
            description: record.description,
            estimated_weeks: record.estimated_weeks,
            plan_data: record.plan_data,
            is_active: true,
            category: record.category,
            plan_type: record.plan_type,
            split_type: record.split_type,
            created_at: chrono::Utc::now(),
        };
        self.plans
            .insert(stored.id.to_be_bytes(), serde_json::to_vec(&stored)?)
            .map_err(backend("Failed to insert plan"))?;
        self.flush()?;
        Ok(stored)
    }

    async fn deactivate_plans(&self, user_id: &str, category: PlanCategory) -> Result<usize, StoreError> {
        let mut batch = sled::Batch::default();
        let mut changed = 0;
        for mut plan in self.plans()? {
            if plan.user_id == user_id && plan.category == category && plan.is_active {
                plan.is_active = false;
                batch.insert(plan.id.to_be_bytes().to_vec(), serde_json::to_vec(&plan)?);
                changed += 1;
            }
        }
        if changed > 0 {
            self.plans
                .apply_batch(batch)
                .map_err(backend("Failed to deactivate plans"))?;
            self.flush()?;
        }
        Ok(changed)
    }

    async fn active_plan(&self, user_id: &str, category: PlanCategory) -> Result<Option<PlanRecord>, StoreError> {
        Ok(self
            .plans()?
            .into_iter()
            .rev()
            .find(|plan| plan.user_id == user_id && plan.category == category && plan.is_active))
    }

    async fn record_points(&self, entry: PointsEntry) -> Result<(), StoreError> {
        let id = self.next_id()?;
        self.points
            .insert(id.to_be_bytes(), serde_json::to_vec(&entry)?)
            .map_err(backend("Failed to record points"))?;
        self.flush()
    }

    async fn points_total(&self, user_id: &str) -> Result<i64, StoreError> {
        Ok(values::<PointsEntry>(&self.points)?
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.points)
            .sum())
    }
}
