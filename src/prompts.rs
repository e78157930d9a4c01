//! Prompt builders for workout, diet and food-image requests.

use crate::nutrition::EnergySummary;
use crate::types::NutritionProfileInput;

const WORKOUT_SCHEMA: &str = r#"{
  "name": "string",
  "description": "string",
  "estimated_weeks": 4,
  "weeks": [
    {
      "week": 1,
      "days": [
        {
          "day": 1,
          "name": "Monday - Push",
          "type": "strength | cardio | rest | recovery",
          "exercises": [
            {"exercise_id": "0001", "name": "string", "sets": 3, "reps": "10-12", "rest_seconds": 60, "instructions": "string"}
          ]
        }
      ]
    }
  ]
}"#;

const DIET_SCHEMA: &str = r#"{
  "daily_calories": 2000,
  "macros": {"protein": 150, "carbs": 200, "fat": 67},
  "meals": [
    {"type": "breakfast", "time": "08:00", "calories": 500, "options": ["string"]}
  ],
  "tips": ["string"]
}"#;

const FOOD_SCHEMA: &str =
    r#"{"description": "string", "calories": 0, "protein": 0, "carbs": 0, "fat": 0}"#;

fn profile_lines(profile: &NutritionProfileInput) -> String {
    let mut lines = vec![
        format!("- Weight: {} kg", profile.weight),
        format!("- Height: {} cm", profile.height),
        format!("- Age: {}", profile.age),
        format!("- Gender: {}", profile.gender),
        format!("- Activity level: {}", profile.activity_level),
        format!("- Goal: {}", profile.goal),
        format!("- Training location: {}", profile.training_location),
    ];
    if let Some(minutes) = profile.available_minutes {
        lines.push(format!("- Time per session: {} minutes", minutes));
    }
    if !profile.food_preferences.is_empty() {
        lines.push(format!("- Food preferences: {}", profile.food_preferences.join(", ")));
    }
    if !profile.foods_at_home.is_empty() {
        lines.push(format!("- Foods at home: {}", profile.foods_at_home.join(", ")));
    }
    lines.join("\n")
}

pub fn workout_prompt(profile: &NutritionProfileInput, extra: Option<&str>) -> String {
    let mut prompt = format!(
        "Create a 4-week workout plan for this person:\n{}\n\n\
         Use 7 days per week, Monday first. Rest days have type \"rest\" and no exercises. \
         Every exercise_id is a 4-digit string. Respond with JSON only, matching:\n{}",
        profile_lines(profile),
        WORKOUT_SCHEMA
    );
    if let Some(extra) = extra.map(str::trim).filter(|text| !text.is_empty()) {
        prompt.push_str("\n\nAdditional requests: ");
        prompt.push_str(extra);
    }
    prompt
}

pub fn diet_prompt(profile: &NutritionProfileInput, summary: &EnergySummary) -> String {
    format!(
        "Create a one-day diet plan for this person:\n{}\n\n\
         Target {} kcal per day with about {}g protein, {}g carbs and {}g fat. \
         Prefer the listed foods when possible. Respond with JSON only, matching:\n{}",
        profile_lines(profile),
        summary.daily_calories,
        summary.macros.protein,
        summary.macros.carbs,
        summary.macros.fat,
        DIET_SCHEMA
    )
}

pub fn food_analysis_prompt(note: Option<&str>) -> String {
    let mut prompt = format!(
        "Identify the food in this image and estimate its nutrition for the visible portion. \
         Numbers are whole grams and kcal. Respond with JSON only, matching:\n{}",
        FOOD_SCHEMA
    );
    if let Some(note) = note.map(str::trim).filter(|text| !text.is_empty()) {
        prompt.push_str("\n\nContext from the user: ");
        prompt.push_str(note);
    }
    prompt
}
