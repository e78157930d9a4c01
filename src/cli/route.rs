//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{
    Commands, ConfigCommands, GenerateCommands, PlanCommands, SynthesizeCommands,
    WorkoutShapeArgs,
};
use crate::cli::presentation::{chain_entries, format_energy_text, format_json, format_models_text};
use crate::config::{ConfigLoader, FitgenConfig};
use crate::error::CliError;
use crate::nutrition::energy_summary;
use crate::orchestrator::FallbackOrchestrator;
use crate::planner::{PlanGenerator, PlanSource, WorkoutFallback};
use crate::provider::ImagePayload;
use crate::repair::repair_json_with_report;
use crate::store::{activate_plan, NewPlanRecord, PlanStore, PlanType, PointsEntry, SledPlanStore};
use crate::synthesis::{
    parse_exercise_pool, parse_weekdays, synthesize_diet_plan, synthesize_workout_plan,
    ExerciseRecord, SynthesisRequest,
};
use crate::types::{NutritionProfileInput, TrainingLocation};
use parking_lot::Mutex;
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Runtime context for CLI execution: workspace, loaded config and the plan store.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: FitgenConfig,
    /// Opened on first use so commands that never save leave no database behind.
    store: Mutex<Option<Arc<SledPlanStore>>>,
}

impl RunContext {
    /// Load and validate configuration. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config_path, config.validated()?))
    }

    pub fn with_config(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        config: FitgenConfig,
    ) -> Self {
        Self {
            workspace_root,
            config_path,
            config,
            store: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &FitgenConfig {
        &self.config
    }

    /// The plan store at the configured path, opened on first call.
    pub fn plan_store(&self) -> Result<Arc<SledPlanStore>, CliError> {
        let mut slot = self.store.lock();
        if let Some(store) = slot.as_ref() {
            return Ok(store.clone());
        }
        let path = self.config.storage.resolve_store_path(&self.workspace_root);
        let store = Arc::new(SledPlanStore::new(&path)?);
        info!(path = %path.display(), "Plan store opened");
        *slot = Some(store.clone());
        Ok(store)
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, CliError> {
        let started = Instant::now();
        let name = command_name(command);
        info!(
            command = %name,
            workspace = %self.workspace_root.display(),
            config = ?self.config_path,
            "Command started"
        );
        let result = self.execute_inner(command);
        info!(
            command = %name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, CliError> {
        match command {
            Commands::Energy { profile, format } => {
                let summary = energy_summary(&read_profile(profile)?);
                if format == "json" {
                    format_json(&summary)
                } else {
                    Ok(format_energy_text(&summary))
                }
            }
            Commands::Synthesize { command } => self.handle_synthesize(command),
            Commands::Generate { command } => self.handle_generate(command),
            Commands::AnalyzeFood {
                image,
                media_type,
                note,
            } => {
                let bytes = std::fs::read(image).map_err(|source| CliError::Read {
                    path: image.clone(),
                    source,
                })?;
                let media_type = match media_type {
                    Some(media_type) => media_type.clone(),
                    None => guess_media_type(image)?,
                };
                let generator = self.plan_generator()?;
                let outcome = block_on(
                    generator.analyze_food(ImagePayload::new(bytes, media_type), note.as_deref()),
                )?;
                format_json(&outcome)
            }
            Commands::Repair { input } => {
                let (origin, raw) = match input {
                    Some(path) => (path.display().to_string(), read_text(path)?),
                    None => {
                        let mut raw = String::new();
                        std::io::stdin()
                            .read_to_string(&mut raw)
                            .map_err(|source| CliError::Read {
                                path: PathBuf::from("<stdin>"),
                                source,
                            })?;
                        ("<stdin>".to_string(), raw)
                    }
                };
                let report = repair_json_with_report(&raw).ok_or_else(|| CliError::InvalidInput {
                    origin,
                    message: "no usable JSON could be recovered".to_string(),
                })?;
                info!(tier = ?report.tier, damage = ?report.damage, "Repair finished");
                format_json(&report.value)
            }
            Commands::Models { format } => {
                let entries = chain_entries(&self.config);
                if format == "json" {
                    format_json(&entries)
                } else {
                    Ok(format_models_text(
                        &entries,
                        self.config.generation.attempt_timeout_secs,
                    ))
                }
            }
            Commands::Plans { command } => match command {
                PlanCommands::Active { user, category } => {
                    let store = self.plan_store()?;
                    let active = block_on(store.active_plan(user, *category))??;
                    format_json(&active)
                }
                PlanCommands::List { user } => format_json(&self.plan_store()?.plans_for(user)?),
            },
            Commands::Points { user, add, reason } => {
                if user.trim().is_empty() {
                    return Err(CliError::InvalidInput {
                        origin: "--user".to_string(),
                        message: "user cannot be empty".to_string(),
                    });
                }
                let store = self.plan_store()?;
                let total = block_on(async {
                    if let Some(points) = add {
                        store
                            .record_points(PointsEntry {
                                user_id: user.clone(),
                                points: *points,
                                reason: reason.clone(),
                            })
                            .await?;
                    }
                    store.points_total(user).await
                })??;
                format_json(&serde_json::json!({ "user_id": user, "total": total }))
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => Ok(self.config.to_redacted_toml()?),
                ConfigCommands::Validate => {
                    self.config.clone().validated()?;
                    Ok("Configuration is valid".to_string())
                }
            },
        }
    }

    fn handle_synthesize(&self, command: &SynthesizeCommands) -> Result<String, CliError> {
        match command {
            SynthesizeCommands::Workout {
                shape,
                location,
                pool,
                save_for,
            } => {
                let request = synthesis_request(shape, *location)?;
                let pool = read_pool(pool.as_deref())?;
                let plan = synthesize_workout_plan(&request, &pool);
                match save_for {
                    Some(user_id) => {
                        let record = NewPlanRecord::workout(
                            user_id.as_str(),
                            &plan,
                            PlanType::Manual,
                            Some(request.effective_split().to_string()),
                        )?;
                        self.save(record)
                    }
                    None => format_json(&plan),
                }
            }
            SynthesizeCommands::Diet { profile, save_for } => {
                let plan = synthesize_diet_plan(&read_profile(profile)?);
                match save_for {
                    Some(user_id) => {
                        self.save(NewPlanRecord::diet(user_id.as_str(), &plan, PlanType::Manual)?)
                    }
                    None => format_json(&plan),
                }
            }
        }
    }

    fn handle_generate(&self, command: &GenerateCommands) -> Result<String, CliError> {
        let generator = self.plan_generator()?;
        match command {
            GenerateCommands::Workout {
                profile,
                prompt_extra,
                pool,
                shape,
                save_for,
            } => {
                let profile = read_profile(profile)?;
                let fallback = match pool {
                    Some(path) => WorkoutFallback::Synthesize {
                        request: synthesis_request(shape, profile.training_location)?,
                        pool: read_pool(Some(path))?,
                    },
                    None => WorkoutFallback::DefaultPlan,
                };
                let outcome = block_on(generator.workout_plan(
                    &profile,
                    prompt_extra.as_deref(),
                    &fallback,
                ))?;
                match save_for {
                    Some(user_id) => {
                        let split_type = match &fallback {
                            WorkoutFallback::Synthesize { request, .. } => {
                                Some(request.effective_split().to_string())
                            }
                            WorkoutFallback::DefaultPlan => None,
                        };
                        let record = NewPlanRecord::workout(
                            user_id.as_str(),
                            &outcome.plan,
                            plan_type_for(&outcome.source),
                            split_type,
                        )?;
                        self.save(record)
                    }
                    None => format_json(&outcome),
                }
            }
            GenerateCommands::Diet { profile, save_for } => {
                let profile = read_profile(profile)?;
                let outcome = block_on(generator.diet_plan(&profile))?;
                match save_for {
                    Some(user_id) => self.save(NewPlanRecord::diet(
                        user_id.as_str(),
                        &outcome.plan,
                        plan_type_for(&outcome.source),
                    )?),
                    None => format_json(&outcome),
                }
            }
        }
    }

    fn plan_generator(&self) -> Result<PlanGenerator, CliError> {
        Ok(PlanGenerator::new(FallbackOrchestrator::from_config(
            &self.config,
        )?))
    }

    fn save(&self, record: NewPlanRecord) -> Result<String, CliError> {
        let store = self.plan_store()?;
        let stored = block_on(activate_plan(store.as_ref(), record))??;
        format_json(&stored)
    }
}

fn plan_type_for(source: &PlanSource) -> PlanType {
    match source {
        PlanSource::Model { .. } => PlanType::Ai,
        PlanSource::Synthesized => PlanType::Manual,
        PlanSource::Default => PlanType::Default,
    }
}

/// Run a future on a fresh runtime. Network commands are the only async work.
fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    Ok(runtime.block_on(future))
}

fn synthesis_request(
    shape: &WorkoutShapeArgs,
    location: TrainingLocation,
) -> Result<SynthesisRequest, CliError> {
    let active_days = parse_weekdays(&shape.days).map_err(|e| CliError::InvalidInput {
        origin: "--days".to_string(),
        message: e.to_string(),
    })?;
    Ok(SynthesisRequest {
        split: shape.split,
        active_days,
        location,
        level: shape.level,
    })
}

fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_profile(path: &Path) -> Result<NutritionProfileInput, CliError> {
    serde_json::from_str(&read_text(path)?).map_err(|e| CliError::InvalidInput {
        origin: path.display().to_string(),
        message: e.to_string(),
    })
}

fn read_pool(path: Option<&Path>) -> Result<Vec<ExerciseRecord>, CliError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let pool = parse_exercise_pool(&read_text(path)?).map_err(|e| CliError::InvalidInput {
        origin: path.display().to_string(),
        message: e.to_string(),
    })?;
    info!(path = %path.display(), exercises = pool.len(), "Exercise pool loaded");
    Ok(pool)
}

fn guess_media_type(path: &Path) -> Result<String, CliError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let media_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => {
            return Err(CliError::InvalidInput {
                origin: path.display().to_string(),
                message: "unknown image type, pass --media-type".to_string(),
            })
        }
    };
    Ok(media_type.to_string())
}
