//! Plan Data Model
//!
//! Typed records shared by the model-driven and deterministic generation paths.
//! Every field carries a serde default so that partially filled model output
//! deserializes into a complete record instead of failing outright.

use crate::repair::numeric_value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A multi-week workout plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutPlan {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub estimated_weeks: u32,
    pub weeks: Vec<WorkoutWeek>,
}

/// One week of a plan. Synthesized weeks always hold seven days, Monday first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutWeek {
    #[serde(deserialize_with = "lenient_u32")]
    pub week: u32,
    pub days: Vec<WorkoutDay>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutDay {
    #[serde(deserialize_with = "lenient_u32")]
    pub day: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub day_type: DayType,
    pub exercises: Vec<ExercisePlan>,
}

impl WorkoutDay {
    pub fn rest(day: u32, name: impl Into<String>) -> Self {
        Self {
            day,
            name: name.into(),
            day_type: DayType::Rest,
            exercises: Vec::new(),
        }
    }

    pub fn is_rest(&self) -> bool {
        self.day_type == DayType::Rest
    }
}

/// Kind of training day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayType {
    #[default]
    Strength,
    Cardio,
    Rest,
    Recovery,
}

impl DayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Strength => "strength",
            DayType::Cardio => "cardio",
            DayType::Rest => "rest",
            DayType::Recovery => "recovery",
        }
    }

    /// Lenient parse; anything unrecognized is treated as a training day.
    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "cardio" | "conditioning" | "hiit" => DayType::Cardio,
            "rest" | "off" | "rest_day" => DayType::Rest,
            "recovery" | "active_recovery" | "mobility" => DayType::Recovery,
            _ => DayType::Strength,
        }
    }
}

impl Serialize for DayType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DayType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DayType::parse_lenient(&raw))
    }
}

/// A prescribed exercise within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExercisePlan {
    #[serde(deserialize_with = "string_or_number")]
    pub exercise_id: String,
    pub name: String,
    #[serde(deserialize_with = "lenient_sets")]
    pub sets: u32,
    pub reps: String,
    #[serde(deserialize_with = "lenient_rest_seconds")]
    pub rest_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Default for ExercisePlan {
    fn default() -> Self {
        Self {
            exercise_id: String::new(),
            name: String::new(),
            sets: 3,
            reps: "10-12".to_string(),
            rest_seconds: 60,
            instructions: None,
        }
    }
}

/// Model output sometimes carries numeric ids; keep them as opaque text.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Counts as models write them: `12`, `12.0`, `"12"`, `"60s"`, `"4 weeks"`.
/// Numbers are rounded and clamped into `u32`; anything without a leading
/// number yields `None`.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(numeric_value(&value).map(|amount| {
        if amount.is_finite() && amount > 0.0 {
            amount.round().min(u32::MAX as f64) as u32
        } else {
            0
        }
    }))
}

fn lenient_u32<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient_count(deserializer)?.unwrap_or_default())
}

fn lenient_optional_u32<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    lenient_count(deserializer)
}

fn lenient_sets<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient_count(deserializer)?.unwrap_or(ExercisePlan::default().sets))
}

fn lenient_rest_seconds<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient_count(deserializer)?.unwrap_or(ExercisePlan::default().rest_seconds))
}

/// A daily diet plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DietPlan {
    #[serde(deserialize_with = "lenient_u32")]
    pub daily_calories: u32,
    pub macros: Macros,
    pub meals: Vec<DietMeal>,
    pub tips: Vec<String>,
}

/// Macronutrients in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Macros {
    #[serde(deserialize_with = "lenient_u32")]
    pub protein: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub carbs: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub fat: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DietMeal {
    #[serde(rename = "type")]
    pub meal_type: String,
    /// Local time, "HH:MM".
    pub time: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub calories: u32,
    pub options: Vec<String>,
}

/// Nutrition estimate for a photographed meal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodAnalysis {
    pub description: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub calories: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub protein: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub carbs: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub fat: u32,
}

/// Caller-owned profile used for energy math and prompt construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionProfileInput {
    /// Body weight in kilograms
    pub weight: f64,
    /// Height in centimeters
    pub height: f64,
    /// Age in years
    pub age: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    #[serde(deserialize_with = "lenient_optional_u32")]
    pub available_minutes: Option<u32>,
    pub training_location: TrainingLocation,
    pub food_preferences: Vec<String>,
    pub foods_at_home: Vec<String>,
}

impl Default for NutritionProfileInput {
    fn default() -> Self {
        Self {
            weight: 70.0,
            height: 170.0,
            age: 30.0,
            gender: Gender::default(),
            activity_level: ActivityLevel::default(),
            goal: Goal::default(),
            available_minutes: None,
            training_location: TrainingLocation::default(),
            food_preferences: Vec::new(),
            foods_at_home: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "female" | "f" | "woman" => Gender::Female,
            "male" | "m" | "man" => Gender::Male,
            _ => Gender::Other,
        }
    }
}

/// Self-reported activity level. Unknown values keep their text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
    Unknown(String),
}

impl ActivityLevel {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::Unknown(raw) => raw,
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "light" | "lightly_active" => ActivityLevel::Light,
            "moderate" | "moderately_active" => ActivityLevel::Moderate,
            "active" => ActivityLevel::Active,
            "very_active" | "extra_active" => ActivityLevel::VeryActive,
            _ => ActivityLevel::Unknown(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Goal {
    LoseWeight,
    GainWeight,
    GainMuscle,
    #[default]
    Maintain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::LoseWeight => "lose_weight",
            Goal::GainWeight => "gain_weight",
            Goal::GainMuscle => "gain_muscle",
            Goal::Maintain => "maintain",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "lose_weight" | "weight_loss" | "lose" | "cut" => Goal::LoseWeight,
            "gain_weight" | "weight_gain" | "bulk" => Goal::GainWeight,
            "gain_muscle" | "muscle_gain" | "build_muscle" => Goal::GainMuscle,
            _ => Goal::Maintain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrainingLocation {
    Home,
    #[default]
    Gym,
    Outdoor,
}

impl TrainingLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingLocation::Home => "home",
            TrainingLocation::Gym => "gym",
            TrainingLocation::Outdoor => "outdoor",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TrainingLocation::Home => "Home",
            TrainingLocation::Gym => "Gym",
            TrainingLocation::Outdoor => "Outdoor",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "home" | "house" | "casa" => TrainingLocation::Home,
            "outdoor" | "outdoors" | "park" => TrainingLocation::Outdoor,
            _ => TrainingLocation::Gym,
        }
    }
}

/// Lowercase, trimmed, with spaces and dashes folded to underscores.
pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

macro_rules! lenient_string_serde {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.as_str())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let raw = String::deserialize(deserializer)?;
                    Ok(<$ty>::parse_lenient(&raw))
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl std::str::FromStr for $ty {
                type Err = std::convert::Infallible;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Ok(<$ty>::parse_lenient(s))
                }
            }
        )*
    };
}

lenient_string_serde!(Gender, ActivityLevel, Goal, TrainingLocation);
