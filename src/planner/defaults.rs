//! Hard-coded fallbacks used when generation fails and nothing better is available.

use crate::types::{DayType, ExercisePlan, FoodAnalysis, WorkoutDay, WorkoutPlan, WorkoutWeek};

fn exercise(id: &str, name: &str, reps: &str, instructions: &str) -> ExercisePlan {
    ExercisePlan {
        exercise_id: id.to_string(),
        name: name.to_string(),
        sets: 3,
        reps: reps.to_string(),
        rest_seconds: 60,
        instructions: Some(instructions.to_string()),
    }
}

fn training_day(day: u32, name: &str) -> WorkoutDay {
    WorkoutDay {
        day,
        name: name.to_string(),
        day_type: DayType::Strength,
        exercises: vec![
            exercise("0001", "Push-up", "10-12", "Keep the body straight and lower the chest to the floor."),
            exercise("0002", "Bodyweight Squat", "12-15", "Sit the hips back and keep the heels down."),
            exercise("0003", "Plank", "30s", "Hold a straight line from head to heels."),
            exercise("0004", "Glute Bridge", "12-15", "Drive through the heels and squeeze at the top."),
        ],
    }
}

/// One week, three body-weight strength days (Monday, Wednesday, Friday).
pub fn default_workout_plan() -> WorkoutPlan {
    let days = (1u32..=7)
        .map(|day| match day {
            1 => training_day(day, "Monday - Full Body"),
            3 => training_day(day, "Wednesday - Full Body"),
            5 => training_day(day, "Friday - Full Body"),
            _ => WorkoutDay::rest(day, "Rest"),
        })
        .collect();

    WorkoutPlan {
        name: "Basic Full Body Plan".to_string(),
        description: "A simple body-weight routine, three days per week.".to_string(),
        estimated_weeks: 1,
        weeks: vec![WorkoutWeek { week: 1, days }],
    }
}

pub fn default_food_analysis() -> FoodAnalysis {
    FoodAnalysis {
        description: "Unable to analyze the image".to_string(),
        calories: 0,
        protein: 0,
        carbs: 0,
        fat: 0,
    }
}
