//! In-process plan store.

use super::{NewPlanRecord, PlanCategory, PlanRecord, PlanStore, PointsEntry};
use crate::error::StoreError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct MemoryPlanStore {
    plans: RwLock<Vec<PlanRecord>>,
    points: RwLock<Vec<PointsEntry>>,
    next_id: AtomicU64,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plans(&self) -> Vec<PlanRecord> {
        self.plans.read().clone()
    }

    pub fn plans_for(&self, user_id: &str) -> Vec<PlanRecord> {
        self.plans
            .read()
            .iter()
            .filter(|plan| plan.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn insert_plan(&self, record: NewPlanRecord) -> Result<PlanRecord, StoreError> {
        let stored = PlanRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
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
        self.plans.write().push(stored.clone());
        Ok(stored)
    }

    async fn deactivate_plans(&self, user_id: &str, category: PlanCategory) -> Result<usize, StoreError> {
        let mut plans = self.plans.write();
        let mut changed = 0;
        for plan in plans
            .iter_mut()
            .filter(|plan| plan.user_id == user_id && plan.category == category && plan.is_active)
        {
            plan.is_active = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn active_plan(&self, user_id: &str, category: PlanCategory) -> Result<Option<PlanRecord>, StoreError> {
        Ok(self
            .plans
            .read()
            .iter()
            .rev()
            .find(|plan| plan.user_id == user_id && plan.category == category && plan.is_active)
            .cloned())
    }

    async fn record_points(&self, entry: PointsEntry) -> Result<(), StoreError> {
        self.points.write().push(entry);
        Ok(())
    }

    async fn points_total(&self, user_id: &str) -> Result<i64, StoreError> {
        Ok(self
            .points
            .read()
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.points)
            .sum())
    }
}
