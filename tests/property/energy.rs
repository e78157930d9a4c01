//! Properties of the energy and macro math

use fitgen::nutrition::{energy_summary, macro_distribution, MIN_DAILY_CALORIES};
use fitgen::synthesis::synthesize_diet_plan;
use fitgen::types::{ActivityLevel, Gender, Goal, NutritionProfileInput};
use proptest::prelude::*;

fn profile() -> impl Strategy<Value = NutritionProfileInput> {
    (
        30.0f64..200.0,
        120.0f64..220.0,
        14.0f64..90.0,
        prop::sample::select(vec![Gender::Male, Gender::Female, Gender::Other]),
        prop::sample::select(vec![
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::VeryActive,
        ]),
        prop::sample::select(vec![Goal::LoseWeight, Goal::GainWeight, Goal::GainMuscle, Goal::Maintain]),
    )
        .prop_map(|(weight, height, age, gender, activity_level, goal)| NutritionProfileInput {
            weight,
            height,
            age,
            gender,
            activity_level,
            goal,
            ..NutritionProfileInput::default()
        })
}

proptest! {
    #[test]
    fn test_daily_target_respects_floor_and_goal_direction(profile in profile()) {
        let summary = energy_summary(&profile);
        prop_assert!(summary.daily_calories >= MIN_DAILY_CALORIES);
        match profile.goal {
            Goal::LoseWeight => prop_assert!(summary.daily_calories <= summary.tdee.max(MIN_DAILY_CALORIES)),
            Goal::Maintain => prop_assert_eq!(summary.daily_calories, summary.tdee.max(MIN_DAILY_CALORIES)),
            Goal::GainWeight | Goal::GainMuscle => prop_assert!(summary.daily_calories > summary.tdee),
        }
    }

    #[test]
    fn test_macro_grams_stay_close_to_target(profile in profile()) {
        let summary = energy_summary(&profile);
        let kcal = summary.macros.protein * 4 + summary.macros.carbs * 4 + summary.macros.fat * 9;
        // Each macro rounds on its own: at most 2 + 2 + 4.5 kcal of drift.
        prop_assert!(kcal.abs_diff(summary.daily_calories) <= 9, "{} vs {}", kcal, summary.daily_calories);
        prop_assert!((macro_distribution(profile.goal).total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_synthesized_meals_split_the_target(profile in profile()) {
        let plan = synthesize_diet_plan(&profile);
        let total: u32 = plan.meals.iter().map(|meal| meal.calories).sum();
        prop_assert!(total.abs_diff(plan.daily_calories) <= 2);
        prop_assert!(plan.meals.iter().all(|meal| !meal.options.is_empty()));
    }
}
