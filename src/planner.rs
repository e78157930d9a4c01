//! Plan Generation With Guaranteed Results
//!
//! [`PlanGenerator`] asks the fallback chain for a plan and, when every model
//! fails or the output is unusable, falls back to local synthesis or to a
//! hard-coded default. Callers therefore always get a non-empty plan, tagged
//! with where it came from.

pub mod defaults;

use crate::error::GenerationError;
use crate::nutrition::energy_summary;
use crate::orchestrator::{FallbackOrchestrator, Generated};
use crate::prompts::{diet_prompt, food_analysis_prompt, workout_prompt};
use crate::provider::{GenerationRequest, ImagePayload};
use crate::synthesis::{synthesize_diet_plan, synthesize_workout_plan, ExerciseRecord, SynthesisRequest};
use crate::types::{DietPlan, FoodAnalysis, NutritionProfileInput, WorkoutPlan};
use serde::Serialize;
use tracing::{info, warn};

/// Where a plan came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlanSource {
    Model {
        provider: String,
        model: String,
        attempts: usize,
    },
    Synthesized,
    Default,
}

impl PlanSource {
    fn from_generated<T>(generated: &Generated<T>) -> Self {
        PlanSource::Model {
            provider: generated.provider.clone(),
            model: generated.model.clone(),
            attempts: generated.attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome<T> {
    pub plan: T,
    pub source: PlanSource,
}

/// What to use when no model produces a workout plan.
#[derive(Debug, Clone)]
pub enum WorkoutFallback {
    Synthesize {
        request: SynthesisRequest,
        pool: Vec<ExerciseRecord>,
    },
    DefaultPlan,
}

pub struct PlanGenerator {
    orchestrator: FallbackOrchestrator,
}

impl PlanGenerator {
    pub fn new(orchestrator: FallbackOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator {
        &self.orchestrator
    }

    pub async fn workout_plan(
        &self,
        profile: &NutritionProfileInput,
        extra: Option<&str>,
        fallback: &WorkoutFallback,
    ) -> PlanOutcome<WorkoutPlan> {
        let request = GenerationRequest::text(
            workout_prompt(profile, extra),
            self.orchestrator.default_options().clone(),
        );
        let generated = self
            .orchestrator
            .generate_as::<WorkoutPlan>(&request)
            .await
            .and_then(|generated| {
                if generated.value.weeks.is_empty() {
                    Err(GenerationError::RepairFailed {
                        provider: generated.provider,
                        model: generated.model,
                    })
                } else {
                    Ok(generated)
                }
            });

        match generated {
            Ok(generated) => PlanOutcome {
                source: PlanSource::from_generated(&generated),
                plan: generated.value,
            },
            Err(err) => {
                warn!(error = %err, "Workout generation failed, using fallback");
                match fallback {
                    WorkoutFallback::Synthesize { request, pool } => PlanOutcome {
                        plan: synthesize_workout_plan(request, pool),
                        source: PlanSource::Synthesized,
                    },
                    WorkoutFallback::DefaultPlan => PlanOutcome {
                        plan: defaults::default_workout_plan(),
                        source: PlanSource::Default,
                    },
                }
            }
        }
    }

    pub async fn diet_plan(&self, profile: &NutritionProfileInput) -> PlanOutcome<DietPlan> {
        let summary = energy_summary(profile);
        let request = GenerationRequest::text(
            diet_prompt(profile, &summary),
            self.orchestrator.default_options().clone(),
        );

        match self.orchestrator.generate_as::<DietPlan>(&request).await {
            Ok(generated) if !generated.value.meals.is_empty() => {
                let source = PlanSource::from_generated(&generated);
                let mut plan = generated.value;
                if plan.daily_calories == 0 {
                    info!(daily_calories = summary.daily_calories, "Filling missing calorie target");
                    plan.daily_calories = summary.daily_calories;
                    plan.macros = summary.macros;
                }
                PlanOutcome { plan, source }
            }
            Ok(generated) => {
                warn!(provider = %generated.provider, model = %generated.model, "Diet plan has no meals, synthesizing");
                PlanOutcome {
                    plan: synthesize_diet_plan(profile),
                    source: PlanSource::Synthesized,
                }
            }
            Err(err) => {
                warn!(error = %err, "Diet generation failed, synthesizing");
                PlanOutcome {
                    plan: synthesize_diet_plan(profile),
                    source: PlanSource::Synthesized,
                }
            }
        }
    }

    pub async fn analyze_food(
        &self,
        image: ImagePayload,
        note: Option<&str>,
    ) -> PlanOutcome<FoodAnalysis> {
        let request = GenerationRequest::with_image(
            food_analysis_prompt(note),
            image,
            self.orchestrator.default_options().clone(),
        );
        match self.orchestrator.generate_as::<FoodAnalysis>(&request).await {
            Ok(generated) => PlanOutcome {
                source: PlanSource::from_generated(&generated),
                plan: generated.value,
            },
            Err(err) => {
                warn!(error = %err, "Food analysis failed, using default");
                PlanOutcome {
                    plan: defaults::default_food_analysis(),
                    source: PlanSource::Default,
                }
            }
        }
    }
}
