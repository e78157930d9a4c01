//! Energy Expenditure and Macro Math
//!
//! Pure functions over a [`NutritionProfileInput`]: Mifflin-St Jeor basal
//! metabolic rate, activity-scaled daily expenditure, goal-adjusted calorie
//! targets and fixed macro splits.

use crate::types::{ActivityLevel, Gender, Goal, Macros, NutritionProfileInput};
use serde::{Deserialize, Serialize};

/// Lowest daily calorie target ever produced.
pub const MIN_DAILY_CALORIES: u32 = 1200;

const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
const CARBS_KCAL_PER_GRAM: f64 = 4.0;
const FAT_KCAL_PER_GRAM: f64 = 9.0;

/// Fractional calorie split across macronutrients. Fields sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroDistribution {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroDistribution {
    pub fn total(&self) -> f64 {
        self.protein + self.carbs + self.fat
    }
}

/// Everything the energy calculation produces for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySummary {
    pub bmr: f64,
    pub tdee: u32,
    pub daily_calories: u32,
    pub distribution: MacroDistribution,
    pub macros: Macros,
}

/// Mifflin-St Jeor: `10w + 6.25h - 5a`, then -161 for women and +5 otherwise.
pub fn basal_metabolic_rate(profile: &NutritionProfileInput) -> f64 {
    let base = 10.0 * profile.weight + 6.25 * profile.height - 5.0 * profile.age;
    match profile.gender {
        Gender::Female => base - 161.0,
        _ => base + 5.0,
    }
}

pub fn activity_multiplier(level: &ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
        ActivityLevel::VeryActive => 1.9,
        ActivityLevel::Unknown(_) => 1.55,
    }
}

/// BMR scaled by the activity multiplier, rounded to whole kcal.
pub fn total_daily_energy_expenditure(profile: &NutritionProfileInput) -> u32 {
    let tdee = basal_metabolic_rate(profile) * activity_multiplier(&profile.activity_level);
    round_non_negative(tdee)
}

/// Goal-adjusted daily target, never below [`MIN_DAILY_CALORIES`].
pub fn daily_calorie_goal(profile: &NutritionProfileInput) -> u32 {
    let tdee = total_daily_energy_expenditure(profile);
    let target = match profile.goal {
        Goal::LoseWeight => tdee.saturating_sub(500),
        Goal::GainWeight => tdee.saturating_add(500),
        Goal::GainMuscle => tdee.saturating_add(300),
        Goal::Maintain => tdee,
    };
    target.max(MIN_DAILY_CALORIES)
}

pub fn macro_distribution(goal: Goal) -> MacroDistribution {
    match goal {
        Goal::LoseWeight => MacroDistribution {
            protein: 0.40,
            carbs: 0.30,
            fat: 0.30,
        },
        Goal::GainMuscle => MacroDistribution {
            protein: 0.30,
            carbs: 0.45,
            fat: 0.25,
        },
        Goal::GainWeight => MacroDistribution {
            protein: 0.25,
            carbs: 0.50,
            fat: 0.25,
        },
        Goal::Maintain => MacroDistribution {
            protein: 0.30,
            carbs: 0.40,
            fat: 0.30,
        },
    }
}

/// Converts a calorie budget to grams. Each macro is rounded on its own, so the
/// gram calories may drift a few kcal from `calories`.
pub fn macro_grams(calories: u32, distribution: &MacroDistribution) -> Macros {
    let calories = f64::from(calories);
    Macros {
        protein: round_non_negative(calories * distribution.protein / PROTEIN_KCAL_PER_GRAM),
        carbs: round_non_negative(calories * distribution.carbs / CARBS_KCAL_PER_GRAM),
        fat: round_non_negative(calories * distribution.fat / FAT_KCAL_PER_GRAM),
    }
}

pub fn energy_summary(profile: &NutritionProfileInput) -> EnergySummary {
    let daily_calories = daily_calorie_goal(profile);
    let distribution = macro_distribution(profile.goal);
    EnergySummary {
        bmr: basal_metabolic_rate(profile),
        tdee: total_daily_energy_expenditure(profile),
        daily_calories,
        distribution,
        macros: macro_grams(daily_calories, &distribution),
    }
}

fn round_non_negative(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
