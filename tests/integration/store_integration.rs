//! Integration tests for plan persistence

use fitgen::error::StoreError;
use fitgen::planner::defaults::default_workout_plan;
use fitgen::store::memory::MemoryPlanStore;
use fitgen::store::{activate_plan, NewPlanRecord, PlanCategory, PlanStore, PlanType, PointsEntry};
use fitgen::synthesis::synthesize_diet_plan;

use crate::integration::sample_profile;

#[tokio::test]
async fn test_one_active_plan_per_user_and_category() {
    let store = MemoryPlanStore::new();
    let workout = default_workout_plan();
    let diet = synthesize_diet_plan(&sample_profile());

    let first = activate_plan(
        &store,
        NewPlanRecord::workout("alice", &workout, PlanType::Default, None).unwrap(),
    )
    .await
    .unwrap();
    let diet_record = activate_plan(&store, NewPlanRecord::diet("alice", &diet, PlanType::Manual).unwrap())
        .await
        .unwrap();
    let second = activate_plan(
        &store,
        NewPlanRecord::workout("alice", &workout, PlanType::Ai, Some("Full Body".to_string())).unwrap(),
    )
    .await
    .unwrap();
    activate_plan(
        &store,
        NewPlanRecord::workout("bob", &workout, PlanType::Default, None).unwrap(),
    )
    .await
    .unwrap();

    assert!(second.id > first.id);
    let active = store
        .active_plan("alice", PlanCategory::Workout)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, second.id);
    assert_eq!(active.plan_type, PlanType::Ai);
    assert_eq!(active.split_type.as_deref(), Some("Full Body"));

    let alice = store.plans_for("alice");
    assert_eq!(alice.len(), 3);
    assert_eq!(alice.iter().filter(|plan| plan.is_active).count(), 2);
    assert!(!alice.iter().find(|plan| plan.id == first.id).unwrap().is_active);
    assert!(alice.iter().find(|plan| plan.id == diet_record.id).unwrap().is_active);

    let bob = store.active_plan("bob", PlanCategory::Workout).await.unwrap();
    assert!(bob.is_some(), "other users are untouched");
}

#[tokio::test]
async fn test_plan_data_round_trips_through_record() {
    let store = MemoryPlanStore::new();
    let diet = synthesize_diet_plan(&sample_profile());
    let stored = activate_plan(&store, NewPlanRecord::diet("carol", &diet, PlanType::Manual).unwrap())
        .await
        .unwrap();

    assert_eq!(stored.name, "2259 kcal diet");
    assert_eq!(stored.estimated_weeks, None);
    let restored: fitgen::types::DietPlan = serde_json::from_value(stored.plan_data).unwrap();
    assert_eq!(restored, diet);
}

#[tokio::test]
async fn test_blank_user_is_rejected_before_any_write() {
    let store = MemoryPlanStore::new();
    let record = NewPlanRecord::workout("  ", &default_workout_plan(), PlanType::Default, None).unwrap();
    let outcome = activate_plan(&store, record).await;
    assert!(matches!(outcome, Err(StoreError::InvalidRecord(_))));
    assert!(store.plans().is_empty());
}

#[tokio::test]
async fn test_points_ledger_sums_per_user() {
    let store = MemoryPlanStore::new();
    for (user, points) in [("dave", 10), ("dave", 5), ("erin", 7), ("dave", -3)] {
        store
            .record_points(PointsEntry {
                user_id: user.to_string(),
                points,
                reason: "workout_completed".to_string(),
            })
            .await
            .unwrap();
    }
    assert_eq!(store.points_total("dave").await.unwrap(), 12);
    assert_eq!(store.points_total("erin").await.unwrap(), 7);
    assert_eq!(store.points_total("nobody").await.unwrap(), 0);
}
