//! Properties of workout synthesis

use chrono::Weekday;
use fitgen::synthesis::{
    synthesize_workout_plan, ExerciseRecord, ExperienceLevel, SplitPattern, SynthesisRequest, PLAN_WEEKS,
};
use fitgen::types::TrainingLocation;
use proptest::prelude::*;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Pool records with unique ids and names, in generation order.
fn pool() -> impl Strategy<Value = Vec<ExerciseRecord>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["chest", "back", "upper legs", "shoulders", "waist", "upper arms", "cardio"]),
            prop::sample::select(vec!["body weight", "band", "barbell", "dumbbell"]),
        ),
        0..20,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .enumerate()
            .map(|(index, (body_part, equipment))| ExerciseRecord {
                id: format!("{:04}", index),
                name: format!("Exercise {}", index),
                body_part: body_part.to_string(),
                equipment: equipment.to_string(),
                ..ExerciseRecord::default()
            })
            .collect()
    })
}

fn request() -> impl Strategy<Value = SynthesisRequest> {
    (
        prop::sample::select(vec![
            SplitPattern::FullBody,
            SplitPattern::PushPullLegs,
            SplitPattern::UpperLower,
            SplitPattern::BroSplit,
        ]),
        prop::sample::subsequence(WEEK.to_vec(), 0..=7),
        prop::sample::select(vec![TrainingLocation::Home, TrainingLocation::Gym, TrainingLocation::Outdoor]),
        prop::sample::select(vec![
            ExperienceLevel::Beginner,
            ExperienceLevel::Intermediate,
            ExperienceLevel::Advanced,
        ]),
    )
        .prop_map(|(split, active_days, location, level)| SynthesisRequest {
            split,
            active_days,
            location,
            level,
        })
}

proptest! {
    #[test]
    fn test_plan_shape_matches_active_days(request in request(), pool in pool()) {
        let plan = synthesize_workout_plan(&request, &pool);
        prop_assert_eq!(plan.weeks.len(), PLAN_WEEKS as usize);
        for (week_index, week) in plan.weeks.iter().enumerate() {
            prop_assert_eq!(week.week, week_index as u32 + 1);
            prop_assert_eq!(week.days.len(), 7);
            for (day, weekday) in week.days.iter().zip(WEEK) {
                let active = request.active_days.contains(&weekday);
                prop_assert_eq!(day.is_rest(), !active);
                prop_assert_eq!(day.exercises.is_empty(), !active);
            }
        }
    }

    #[test]
    fn test_no_exercise_repeats_within_a_day(request in request(), pool in pool()) {
        let plan = synthesize_workout_plan(&request, &pool);
        for day in plan.weeks.iter().flat_map(|week| &week.days) {
            let mut ids: Vec<&str> = day
                .exercises
                .iter()
                .map(|exercise| exercise.exercise_id.as_str())
                .filter(|id| !id.is_empty())
                .collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
        }
    }

    #[test]
    fn test_home_plans_only_use_home_equipment(request in request(), pool in pool()) {
        let request = SynthesisRequest { location: TrainingLocation::Home, ..request };
        let plan = synthesize_workout_plan(&request, &pool);
        for exercise in plan.weeks.iter().flat_map(|week| &week.days).flat_map(|day| &day.exercises) {
            if let Some(record) = pool.iter().find(|record| record.name == exercise.name) {
                prop_assert!(record.equipment == "body weight" || record.equipment == "band");
            }
        }
    }
}
