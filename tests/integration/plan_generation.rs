//! Integration tests for plan generation with guaranteed fallbacks

use fitgen::error::AttemptError;
use fitgen::nutrition::energy_summary;
use fitgen::orchestrator::{FallbackOrchestrator, ModelEntry};
use fitgen::planner::{PlanGenerator, PlanSource, WorkoutFallback};
use fitgen::provider::{GenerationTransport, ImagePayload};
use fitgen::synthesis::{parse_exercise_pool, parse_weekdays, ExperienceLevel, SplitPattern, SynthesisRequest};
use fitgen::types::TrainingLocation;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::integration::{sample_pool, sample_profile, ScriptedTransport, Step};

fn generator(steps: &[(&str, Step)]) -> (PlanGenerator, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut transport = ScriptedTransport::new("gemini", calls.clone());
    for (model, step) in steps {
        transport = transport.script(model, step.clone());
    }
    let transport: Arc<dyn GenerationTransport> = Arc::new(transport);
    let orchestrator = FallbackOrchestrator::new(
        vec![
            ModelEntry::new(transport.clone(), "primary"),
            ModelEntry::new(transport, "backup"),
        ],
        Duration::from_millis(200),
    );
    (PlanGenerator::new(orchestrator), calls)
}

fn home_synthesis() -> WorkoutFallback {
    WorkoutFallback::Synthesize {
        request: SynthesisRequest {
            split: SplitPattern::PushPullLegs,
            active_days: parse_weekdays(&["mon", "wed", "fri"]).unwrap(),
            location: TrainingLocation::Home,
            level: ExperienceLevel::Beginner,
        },
        pool: parse_exercise_pool(sample_pool()).unwrap(),
    }
}

#[tokio::test]
async fn test_model_workout_plan_is_used_when_it_has_weeks() {
    let reply = r#"```json
{"name": "Model Plan", "description": "From the model", "estimated_weeks": 2,
 "weeks": [{"week": 1, "days": [{"day": 1, "name": "Monday", "type": "Strength",
   "exercises": [{"exercise_id": 42, "name": "Push-up", "sets": 3, "reps": "12", "rest_seconds": 45}]}]}]}
```"#;
    let (generator, calls) = generator(&[
        ("primary", Step::Fail(AttemptError::QuotaExceeded("429".to_string()))),
        ("backup", Step::Reply(reply.to_string())),
    ]);

    let outcome = generator
        .workout_plan(&sample_profile(), Some("no jumping"), &home_synthesis())
        .await;
    assert_eq!(outcome.plan.name, "Model Plan");
    assert_eq!(outcome.plan.weeks[0].days[0].exercises[0].exercise_id, "42");
    assert_eq!(
        outcome.source,
        PlanSource::Model {
            provider: "gemini".to_string(),
            model: "backup".to_string(),
            attempts: 2,
        }
    );
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_model_plans_with_loose_integer_fields_are_kept() {
    let workout = r#"{"name": "Loose", "estimated_weeks": "4 weeks",
 "weeks": [{"week": "1", "days": [{"day": 1.0, "name": "Monday",
   "exercises": [{"name": "Squat", "sets": "3", "reps": "8", "rest_seconds": "60s"}]}]}]}"#;
    let (workout_generator, _) = generator(&[("primary", Step::Reply(workout.to_string()))]);
    let outcome = workout_generator
        .workout_plan(&sample_profile(), None, &home_synthesis())
        .await;
    assert!(matches!(outcome.source, PlanSource::Model { attempts: 1, .. }));
    assert_eq!(outcome.plan.estimated_weeks, 4);
    let exercise = &outcome.plan.weeks[0].days[0].exercises[0];
    assert_eq!((exercise.sets, exercise.rest_seconds), (3, 60));

    let diet = r#"{"daily_calories": 2000.0, "macros": {"protein": 150, "carbs": 200, "fat": 60},
 "meals": [{"type": "Breakfast", "time": "08:00", "calories": 500, "options": ["Oats"]}]}"#;
    let (generator, _) = generator(&[("primary", Step::Reply(diet.to_string()))]);
    let outcome = generator.diet_plan(&sample_profile()).await;
    assert!(matches!(outcome.source, PlanSource::Model { attempts: 1, .. }));
    assert_eq!(outcome.plan.daily_calories, 2000);
}

#[tokio::test]
async fn test_workout_without_weeks_falls_back_to_synthesis() {
    let (generator, _) = generator(&[("primary", Step::Reply(r#"{"name": "Hollow", "weeks": []}"#.to_string()))]);

    let outcome = generator
        .workout_plan(&sample_profile(), None, &home_synthesis())
        .await;
    assert_eq!(outcome.source, PlanSource::Synthesized);
    assert_eq!(outcome.plan.name, "Push/Pull/Legs - Home");
    assert_eq!(outcome.plan.weeks.len(), 4);
    for week in &outcome.plan.weeks {
        assert_eq!(week.days.len(), 7);
        for day in week.days.iter().filter(|day| !day.is_rest()) {
            for exercise in &day.exercises {
                assert_ne!(exercise.exercise_id, "0002", "barbell work is not home training");
                assert_ne!(exercise.exercise_id, "0011", "machines are not home training");
            }
        }
    }
}

#[tokio::test]
async fn test_exhausted_chain_uses_default_workout() {
    let (generator, calls) = generator(&[("primary", Step::Hang), ("backup", Step::Reply("   ".to_string()))]);

    let outcome = generator
        .workout_plan(&sample_profile(), None, &WorkoutFallback::DefaultPlan)
        .await;
    assert_eq!(outcome.source, PlanSource::Default);
    assert_eq!(outcome.plan.estimated_weeks, 1);
    assert_eq!(outcome.plan.weeks[0].days.iter().filter(|day| !day.is_rest()).count(), 3);
    assert_eq!(*calls.lock().unwrap(), vec!["gemini/primary", "gemini/backup"]);
}

#[tokio::test]
async fn test_diet_plan_missing_target_is_filled_from_energy_math() {
    let reply = r#"{"meals": [{"type": "lunch", "time": "13:00", "calories": "650 kcal", "options": ["Rice bowl"]}]}"#;
    let (generator, _) = generator(&[("primary", Step::Reply(reply.to_string()))]);

    let profile = sample_profile();
    let outcome = generator.diet_plan(&profile).await;
    let summary = energy_summary(&profile);
    assert!(matches!(outcome.source, PlanSource::Model { .. }));
    assert_eq!(outcome.plan.daily_calories, summary.daily_calories);
    assert_eq!(outcome.plan.macros, summary.macros);
    assert_eq!(outcome.plan.meals[0].calories, 650);
}

#[tokio::test]
async fn test_diet_plan_synthesized_when_chain_fails() {
    let (generator, _) = generator(&[]);

    let outcome = generator.diet_plan(&sample_profile()).await;
    assert_eq!(outcome.source, PlanSource::Synthesized);
    assert_eq!(outcome.plan.daily_calories, 2259);
    assert_eq!(outcome.plan.meals.len(), 4);
    let total: u32 = outcome.plan.meals.iter().map(|meal| meal.calories).sum();
    assert!(total.abs_diff(2259) <= 4, "meal calories should add up to the target, got {}", total);
}

#[tokio::test]
async fn test_food_analysis_default_when_unrepairable() {
    let (generator, _) = generator(&[("primary", Step::Reply("Looks tasty!".to_string()))]);

    let outcome = generator
        .analyze_food(ImagePayload::new(vec![1, 2, 3], "image/png"), Some("lunch"))
        .await;
    assert_eq!(outcome.source, PlanSource::Default);
    assert_eq!(outcome.plan.calories, 0);
    assert_eq!(outcome.plan.description, "Unable to analyze the image");
}
