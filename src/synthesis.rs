//! Deterministic Plan Synthesis
//!
//! Builds complete plans locally, without any network call. Workout plans come
//! from a named split pattern, the active weekdays, a training location and a
//! caller-supplied exercise pool; diet plans come from the profile energy math.
//! Output has the same shape as model-generated plans, so callers can swap one
//! for the other. Synthesis never fails: an empty or non-matching pool yields a
//! placeholder exercise instead of an empty training day.

use crate::nutrition::{daily_calorie_goal, macro_distribution, macro_grams};
use crate::types::{
    normalize_token, string_or_number, DayType, DietMeal, DietPlan, ExercisePlan, Goal,
    NutritionProfileInput, TrainingLocation, WorkoutDay, WorkoutPlan, WorkoutWeek,
};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Weeks in every synthesized workout plan.
pub const PLAN_WEEKS: u32 = 4;

const PER_GROUP: usize = 2;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Shoulders,
    Core,
    Arms,
    Biceps,
    Triceps,
}

impl MuscleGroup {
    pub fn display_name(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Core => "Core",
            MuscleGroup::Arms => "Arms",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
        }
    }

    /// Lowercase words that identify the group in pool text.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            MuscleGroup::Chest => &["chest", "pectorals"],
            MuscleGroup::Back => &["back", "lats", "traps"],
            MuscleGroup::Legs => &["legs", "quads", "hamstrings", "glutes", "calves"],
            MuscleGroup::Shoulders => &["shoulders", "delts"],
            MuscleGroup::Core => &["core", "abs", "waist", "oblique"],
            MuscleGroup::Arms => &["arms", "biceps", "triceps"],
            MuscleGroup::Biceps => &["biceps"],
            MuscleGroup::Triceps => &["triceps"],
        }
    }

    fn matches(&self, record: &ExerciseRecord) -> bool {
        let fields = [
            record.body_part.to_lowercase(),
            record.target.to_lowercase(),
            record.name.to_lowercase(),
        ];
        self.keywords()
            .iter()
            .any(|keyword| fields.iter().any(|field| field.contains(keyword)))
    }
}

struct Session {
    label: &'static str,
    groups: &'static [MuscleGroup],
}

const FULL_BODY_SESSIONS: &[Session] = &[Session {
    label: "Full Body",
    groups: &[
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Legs,
        MuscleGroup::Shoulders,
        MuscleGroup::Core,
    ],
}];

const PUSH_PULL_LEGS_SESSIONS: &[Session] = &[
    Session {
        label: "Push",
        groups: &[MuscleGroup::Chest, MuscleGroup::Shoulders, MuscleGroup::Triceps],
    },
    Session {
        label: "Pull",
        groups: &[MuscleGroup::Back, MuscleGroup::Biceps],
    },
    Session {
        label: "Legs",
        groups: &[MuscleGroup::Legs, MuscleGroup::Core],
    },
];

const UPPER_LOWER_SESSIONS: &[Session] = &[
    Session {
        label: "Upper",
        groups: &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Arms,
        ],
    },
    Session {
        label: "Lower",
        groups: &[MuscleGroup::Legs, MuscleGroup::Core],
    },
];

const BRO_SPLIT_SESSIONS: &[Session] = &[
    Session {
        label: "Chest",
        groups: &[MuscleGroup::Chest],
    },
    Session {
        label: "Back",
        groups: &[MuscleGroup::Back],
    },
    Session {
        label: "Legs",
        groups: &[MuscleGroup::Legs],
    },
    Session {
        label: "Shoulders",
        groups: &[MuscleGroup::Shoulders],
    },
    Session {
        label: "Arms & Core",
        groups: &[MuscleGroup::Arms, MuscleGroup::Core],
    },
];

/// Named weekly arrangement of muscle groups per training day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SplitPattern {
    #[default]
    FullBody,
    PushPullLegs,
    UpperLower,
    BroSplit,
}

impl SplitPattern {
    pub fn display_name(&self) -> &'static str {
        match self {
            SplitPattern::FullBody => "Full Body",
            SplitPattern::PushPullLegs => "Push/Pull/Legs",
            SplitPattern::UpperLower => "Upper/Lower",
            SplitPattern::BroSplit => "Bro Split",
        }
    }

    /// Unknown names fall back to Full Body.
    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).replace('/', "_").as_str() {
            "ppl" | "push_pull_legs" | "pushpulllegs" => SplitPattern::PushPullLegs,
            "upper_lower" | "upperlower" | "upper_lower_split" => SplitPattern::UpperLower,
            "bro" | "bro_split" | "brosplit" | "body_part_split" => SplitPattern::BroSplit,
            _ => SplitPattern::FullBody,
        }
    }

    fn sessions(&self) -> &'static [Session] {
        match self {
            SplitPattern::FullBody => FULL_BODY_SESSIONS,
            SplitPattern::PushPullLegs => PUSH_PULL_LEGS_SESSIONS,
            SplitPattern::UpperLower => UPPER_LOWER_SESSIONS,
            SplitPattern::BroSplit => BRO_SPLIT_SESSIONS,
        }
    }
}

impl fmt::Display for SplitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for SplitPattern {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SplitPattern::parse_lenient(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match normalize_token(raw).as_str() {
            "beginner" | "novice" | "new" => ExperienceLevel::Beginner,
            "advanced" | "expert" => ExperienceLevel::Advanced,
            _ => ExperienceLevel::Intermediate,
        }
    }

    /// (sets, reps, rest seconds) applied to every selected exercise.
    pub fn prescription(&self) -> (u32, &'static str, u32) {
        match self {
            ExperienceLevel::Beginner => (3, "12-15", 90),
            ExperienceLevel::Advanced => (4, "8-12", 60),
            ExperienceLevel::Intermediate => (3, "10-12", 60),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExperienceLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ExperienceLevel::parse_lenient(s))
    }
}

/// One entry of the exercise pool. Accepts ExerciseDB-style camelCase keys and
/// instructions given as a list or a single string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(alias = "bodyPart")]
    pub body_part: String,
    pub target: String,
    pub equipment: String,
    #[serde(deserialize_with = "one_or_many")]
    pub instructions: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => vec![s],
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolDocument {
    List(Vec<ExerciseRecord>),
    Wrapped { exercises: Vec<ExerciseRecord> },
}

/// Parse a pool given either as a bare array or as `{"exercises": [...]}`.
pub fn parse_exercise_pool(json: &str) -> Result<Vec<ExerciseRecord>, serde_json::Error> {
    Ok(match serde_json::from_str::<PoolDocument>(json)? {
        PoolDocument::List(records) => records,
        PoolDocument::Wrapped { exercises } => exercises,
    })
}

/// Home training only uses body weight or resistance bands.
fn equipment_allowed(location: TrainingLocation, record: &ExerciseRecord) -> bool {
    match location {
        TrainingLocation::Home => {
            let equipment = record.equipment.to_lowercase();
            equipment.contains("body weight") || equipment.contains("bodyweight") || equipment.contains("band")
        }
        TrainingLocation::Gym | TrainingLocation::Outdoor => true,
    }
}

/// Parse weekday names ("mon", "Monday", ...). Duplicates are dropped.
pub fn parse_weekdays<S: AsRef<str>>(names: &[S]) -> Result<Vec<Weekday>, chrono::ParseWeekdayError> {
    let mut days: Vec<Weekday> = Vec::new();
    for name in names {
        let day: Weekday = name.as_ref().trim().parse()?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Inputs for one workout synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub split: SplitPattern,
    pub active_days: Vec<Weekday>,
    pub location: TrainingLocation,
    pub level: ExperienceLevel,
}

impl SynthesisRequest {
    fn is_active(&self, day: Weekday) -> bool {
        self.active_days.contains(&day)
    }

    pub fn active_day_count(&self) -> usize {
        WEEK.iter().filter(|day| self.is_active(**day)).count()
    }

    /// Splits finer than Full Body need at least three sessions a week.
    pub fn effective_split(&self) -> SplitPattern {
        if self.active_day_count() <= 2 {
            SplitPattern::FullBody
        } else {
            self.split
        }
    }
}

/// Build a 4-week plan. Same inputs always give the same plan.
///
/// Candidates for a muscle group keep pool order; the starting point rotates
/// by two positions per week so consecutive weeks differ when the pool allows.
pub fn synthesize_workout_plan(request: &SynthesisRequest, pool: &[ExerciseRecord]) -> WorkoutPlan {
    let active_count = request.active_day_count();
    let split = request.effective_split();
    let substituted = split != request.split;
    if substituted {
        info!(
            requested = request.split.display_name(),
            active_days = active_count,
            "Too few training days for the requested split, using Full Body"
        );
    }

    let sessions = split.sessions();
    let mut session_counter = 0usize;
    let mut weeks = Vec::with_capacity(PLAN_WEEKS as usize);

    for week in 1..=PLAN_WEEKS {
        let mut days = Vec::with_capacity(WEEK.len());
        for (ordinal, weekday) in (1u32..).zip(WEEK) {
            if !request.is_active(weekday) {
                days.push(WorkoutDay::rest(ordinal, "Rest"));
                continue;
            }
            let session = &sessions[session_counter % sessions.len()];
            session_counter += 1;
            days.push(WorkoutDay {
                day: ordinal,
                name: format!("{} - {}", weekday_name(weekday), session.label),
                day_type: DayType::Strength,
                exercises: select_exercises(session.groups, pool, request, week),
            });
        }
        weeks.push(WorkoutWeek { week, days });
    }

    let description = if substituted {
        format!(
            "{} days per week, {} level. Adapted to Full Body from {} for {} training day(s) per week.",
            active_count,
            request.level,
            request.split.display_name(),
            active_count
        )
    } else {
        format!(
            "{} plan, {} days per week, {} level.",
            split.display_name(),
            active_count,
            request.level
        )
    };

    let split_label = if substituted {
        format!(
            "{} (adapted from {})",
            split.display_name(),
            request.split.display_name()
        )
    } else {
        split.display_name().to_string()
    };

    WorkoutPlan {
        name: format!("{} - {}", split_label, request.location.display_name()),
        description,
        estimated_weeks: PLAN_WEEKS,
        weeks,
    }
}

fn select_exercises(
    groups: &[MuscleGroup],
    pool: &[ExerciseRecord],
    request: &SynthesisRequest,
    week: u32,
) -> Vec<ExercisePlan> {
    let (sets, reps, rest_seconds) = request.level.prescription();
    let mut chosen: Vec<usize> = Vec::new();

    for group in groups {
        let matches: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, record)| group.matches(record) && equipment_allowed(request.location, record))
            .map(|(index, _)| index)
            .collect();
        if matches.is_empty() {
            continue;
        }
        let offset = ((week as usize - 1) * 2) % matches.len();
        let picked: Vec<usize> = matches
            .iter()
            .cycle()
            .skip(offset)
            .take(matches.len())
            .filter(|index| !chosen.contains(index))
            .take(PER_GROUP)
            .copied()
            .collect();
        chosen.extend(picked);
    }

    if chosen.is_empty() {
        let label = groups
            .iter()
            .map(MuscleGroup::display_name)
            .collect::<Vec<_>>()
            .join(", ");
        debug!(groups = %label, week, "No pool match, using placeholder exercise");
        return vec![ExercisePlan {
            exercise_id: String::new(),
            name: format!("{} Workout", label),
            sets,
            reps: reps.to_string(),
            rest_seconds,
            instructions: Some(format!(
                "Perform a general routine targeting: {}.",
                label.to_lowercase()
            )),
        }];
    }

    chosen
        .into_iter()
        .map(|index| {
            let record = &pool[index];
            ExercisePlan {
                exercise_id: record.id.clone(),
                name: record.name.clone(),
                sets,
                reps: reps.to_string(),
                rest_seconds,
                instructions: if record.instructions.is_empty() {
                    None
                } else {
                    Some(record.instructions.join(" "))
                },
            }
        })
        .collect()
}

struct MealSlot {
    meal_type: &'static str,
    time: &'static str,
    share: f64,
    staples: &'static [&'static str],
}

const MEAL_SLOTS: [MealSlot; 4] = [
    MealSlot {
        meal_type: "breakfast",
        time: "08:00",
        share: 0.25,
        staples: &["Oatmeal with fruit", "Greek yogurt with granola", "Scrambled eggs on whole-grain toast"],
    },
    MealSlot {
        meal_type: "lunch",
        time: "13:00",
        share: 0.35,
        staples: &["Grilled chicken with rice and vegetables", "Lentil salad with olive oil", "Turkey wrap with greens"],
    },
    MealSlot {
        meal_type: "snack",
        time: "16:30",
        share: 0.10,
        staples: &["Apple with peanut butter", "Handful of mixed nuts", "Cottage cheese"],
    },
    MealSlot {
        meal_type: "dinner",
        time: "20:00",
        share: 0.30,
        staples: &["Baked salmon with sweet potato", "Stir-fried tofu with vegetables", "Lean beef with quinoa"],
    },
];

const PERSONAL_OPTIONS_PER_MEAL: usize = 2;

/// Build the manual-mode diet plan from profile energy math.
pub fn synthesize_diet_plan(profile: &NutritionProfileInput) -> DietPlan {
    let daily_calories = daily_calorie_goal(profile);
    let macros = macro_grams(daily_calories, &macro_distribution(profile.goal));

    let mut personal: Vec<String> = Vec::new();
    for food in profile.foods_at_home.iter().chain(&profile.food_preferences) {
        let food = food.trim();
        if !food.is_empty() && !personal.iter().any(|known| known.eq_ignore_ascii_case(food)) {
            personal.push(food.to_string());
        }
    }

    let meals = MEAL_SLOTS
        .iter()
        .enumerate()
        .map(|(slot_index, slot)| {
            let mut options: Vec<String> = Vec::new();
            if !personal.is_empty() {
                let wanted = PERSONAL_OPTIONS_PER_MEAL.min(personal.len());
                for k in 0..wanted {
                    let food = &personal[(slot_index * PERSONAL_OPTIONS_PER_MEAL + k) % personal.len()];
                    if !options.contains(food) {
                        options.push(food.clone());
                    }
                }
            }
            options.extend(slot.staples.iter().map(|staple| staple.to_string()));
            DietMeal {
                meal_type: slot.meal_type.to_string(),
                time: slot.time.to_string(),
                calories: (f64::from(daily_calories) * slot.share).round() as u32,
                options,
            }
        })
        .collect();

    DietPlan {
        daily_calories,
        macros,
        meals,
        tips: goal_tips(profile.goal),
    }
}

fn goal_tips(goal: Goal) -> Vec<String> {
    let specific: &[&str] = match goal {
        Goal::LoseWeight => &[
            "Keep a steady calorie deficit and prioritize protein at every meal.",
            "Fill half the plate with vegetables to stay full on fewer calories.",
        ],
        Goal::GainWeight => &[
            "Eat on a regular schedule and add calorie-dense snacks such as nuts.",
            "Increase portions gradually rather than forcing large meals.",
        ],
        Goal::GainMuscle => &[
            "Spread protein evenly across meals and eat some after training.",
            "Pair the surplus with progressive strength training.",
        ],
        Goal::Maintain => &[
            "Keep portions consistent and adjust if weight drifts over several weeks.",
            "Favor whole foods and keep processed snacks occasional.",
        ],
    };
    specific
        .iter()
        .map(|tip| tip.to_string())
        .chain(std::iter::once(
            "Drink water throughout the day.".to_string(),
        ))
        .collect()
}
