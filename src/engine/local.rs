//! In-process sequential engine.
//!
//! Each task becomes one chat call: the agent's persona as the system
//! message, the task prompt plus the outputs of earlier tasks as the user
//! message. The reply is the task output; it is written to the task's
//! output file and recorded in the kickoff store for `replay`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Map, Value};

use crate::agent::Agent;
use crate::crew::Crew;
use crate::crews::crew_output::CrewOutput;
use crate::engine::OrchestrationEngine;
use crate::llms::base_llm::{BaseLLM, LLMMessage, LlmFactory};
use crate::llms::openai_factory;
use crate::process::Process;
use crate::storage::KickoffTaskOutputsSQLiteStorage;
use crate::task::Task;
use crate::tasks::task_output::TaskOutput;
use crate::utilities::config::{Settings, DEFAULT_MODEL};
use crate::utilities::errors::ExecutionError;
use crate::utilities::evaluators::{CrewEvaluator, TaskEvaluator};
use crate::utilities::file_handler::FileHandler;
use crate::utilities::logger::Logger;
use crate::utilities::paths::{db_storage_path, resolve_against};
use crate::utilities::printer::PrinterColor;
use crate::utilities::training_handler::{CrewTrainingHandler, TRAINING_DATA_FILE};

/// Separator between earlier task outputs in the context of a task.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

type TaskHook<'a> = dyn FnMut(&Task, &TaskOutput, Duration) -> Result<(), ExecutionError> + 'a;

/// Sequential engine that calls an LLM for every task.
pub struct LocalEngine {
    llm_factory: LlmFactory,
    default_model: String,
    output_dir: PathBuf,
    storage_dir: PathBuf,
}

impl fmt::Debug for LocalEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEngine")
            .field("default_model", &self.default_model)
            .field("output_dir", &self.output_dir)
            .field("storage_dir", &self.storage_dir)
            .finish_non_exhaustive()
    }
}

/// One pass over the prepared tasks of a crew.
struct Execution<'a> {
    crew: &'a Crew,
    tasks: Vec<Task>,
    inputs: &'a HashMap<String, String>,
    storage: &'a KickoffTaskOutputsSQLiteStorage,
    was_replayed: bool,
}

impl LocalEngine {
    /// Engine using `llm_factory` to build a client per model, with
    /// `default_model` for agents without an override.
    pub fn new(llm_factory: LlmFactory, default_model: impl Into<String>) -> Self {
        Self {
            llm_factory,
            default_model: default_model.into(),
            output_dir: PathBuf::from("."),
            storage_dir: db_storage_path(),
        }
    }

    /// OpenAI-compatible engine configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let model = if settings.model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            settings.model.clone()
        };
        Self::new(openai_factory(settings), model)
            .with_output_dir(settings.output_dir.clone())
            .with_storage_dir(settings.storage_dir.clone())
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_storage_dir(mut self, storage_dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = storage_dir.into();
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Store holding the task outputs of the latest kickoff.
    pub fn storage(&self) -> Result<KickoffTaskOutputsSQLiteStorage, ExecutionError> {
        let storage = KickoffTaskOutputsSQLiteStorage::in_dir(&self.storage_dir)?;
        log::debug!("Kickoff outputs stored in {}", storage.db_path().display());
        Ok(storage)
    }

    // ---- LLM resolution ----

    fn llm(&self, model: &str, agent: &str) -> Result<Box<dyn BaseLLM>, ExecutionError> {
        (self.llm_factory)(model).map_err(|source| ExecutionError::Llm {
            agent: agent.to_string(),
            source,
        })
    }

    fn llm_for(&self, agent: &Agent) -> Result<Box<dyn BaseLLM>, ExecutionError> {
        let model = agent.llm.as_deref().unwrap_or(&self.default_model);
        self.llm(model, &agent.name)
    }

    // ---- Execution ----

    /// Interpolate `inputs` into every agent and task of `crew`. Tasks are
    /// rebound to the interpolated copy of their agent.
    fn prepare_tasks(
        crew: &Crew,
        inputs: &HashMap<String, String>,
    ) -> Result<Vec<Task>, ExecutionError> {
        let mut agents: HashMap<&str, Arc<Agent>> = HashMap::new();
        for agent in &crew.agents {
            let interpolated = agent
                .interpolated(inputs)
                .map_err(ExecutionError::Interpolation)?;
            agents.insert(agent.name.as_str(), Arc::new(interpolated));
        }

        crew.tasks
            .iter()
            .map(|task| {
                let agent = match agents.get(task.agent.name.as_str()) {
                    Some(agent) => agent.clone(),
                    None => Arc::new(
                        task.agent
                            .interpolated(inputs)
                            .map_err(ExecutionError::Interpolation)?,
                    ),
                };
                task.interpolated(inputs, agent)
                    .map_err(ExecutionError::Interpolation)
            })
            .collect()
    }

    fn ensure_supported(crew: &Crew) -> Result<(), ExecutionError> {
        match crew.process {
            Process::Sequential => Ok(()),
            other => Err(ExecutionError::UnsupportedProcess(other)),
        }
    }

    /// Full kickoff, calling `on_task` after every task.
    fn run(
        &self,
        crew: &Crew,
        inputs: &HashMap<String, String>,
        on_task: &mut TaskHook<'_>,
    ) -> Result<CrewOutput, ExecutionError> {
        Self::ensure_supported(crew)?;
        if crew.tasks.is_empty() {
            return Err(ExecutionError::NoTasks);
        }
        let tasks = Self::prepare_tasks(crew, inputs)?;

        let storage = self.storage()?;
        storage.delete_all()?;

        log::info!(
            "Kicking off {} (key {}) with {} task(s)",
            crew.name,
            crew.key(),
            tasks.len()
        );
        let execution = Execution {
            crew,
            tasks,
            inputs,
            storage: &storage,
            was_replayed: false,
        };
        self.execute_tasks(&execution, 0, Vec::new(), on_task)
    }

    /// Execute the tasks from `start_index` on. `task_outputs` holds the
    /// outputs of the tasks before it.
    fn execute_tasks(
        &self,
        execution: &Execution<'_>,
        start_index: usize,
        mut task_outputs: Vec<TaskOutput>,
        on_task: &mut TaskHook<'_>,
    ) -> Result<CrewOutput, ExecutionError> {
        for (index, task) in execution.tasks.iter().enumerate().skip(start_index) {
            let context = if task_outputs.is_empty() {
                None
            } else {
                Some(
                    task_outputs
                        .iter()
                        .map(|o| o.raw.as_str())
                        .collect::<Vec<&str>>()
                        .join(CONTEXT_SEPARATOR),
                )
            };

            let logger = Logger::new(execution.crew.verbose || task.agent.verbose);
            let started = Instant::now();
            let output = self.execute_task(task, context.as_deref(), &logger)?;
            let elapsed = started.elapsed();

            execution.storage.add(
                &task.id.to_string(),
                &task.expected_output,
                &output,
                index,
                execution.was_replayed,
                execution.inputs,
            )?;
            on_task(task, &output, elapsed)?;
            task_outputs.push(output);
        }

        Ok(CrewOutput::from_task_outputs(task_outputs))
    }

    fn execute_task(
        &self,
        task: &Task,
        context: Option<&str>,
        logger: &Logger,
    ) -> Result<TaskOutput, ExecutionError> {
        let agent = &task.agent;
        logger.log(
            "info",
            &format!("# Agent: {}", agent.role.trim()),
            Some(PrinterColor::BoldPurple),
        );
        logger.log(
            "info",
            &format!("## Task: {}", task.description.trim()),
            Some(PrinterColor::Green),
        );

        let llm = self.llm_for(agent)?;
        log::debug!(
            "Task '{}' runs on {}/{} as {}",
            task.name,
            llm.provider(),
            llm.model(),
            agent.name
        );
        let messages = vec![
            LLMMessage::system(agent.system_prompt()),
            LLMMessage::user(task.prompt(context)),
        ];
        let raw = llm.call(messages).map_err(|source| ExecutionError::Llm {
            agent: agent.name.clone(),
            source,
        })?;

        logger.log(
            "info",
            &format!("## Final Answer:\n{}", raw.trim()),
            Some(PrinterColor::BoldGreen),
        );
        let path = self.write_output(&task.output_file, &raw)?;
        log::debug!("Task '{}' output written to {}", task.name, path.display());

        Ok(TaskOutput::new(
            &task.name,
            &task.description,
            &task.expected_output,
            agent.role.trim(),
            raw,
            &task.output_file,
        ))
    }

    fn write_output(&self, output_file: &str, raw: &str) -> Result<PathBuf, ExecutionError> {
        let path = resolve_against(&self.output_dir, output_file);
        let to_error = |source: io::Error| ExecutionError::OutputFile {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(to_error)?;
            }
        }
        fs::write(&path, raw).map_err(to_error)?;
        Ok(path)
    }
}

fn data_file_error(path: &Path, err: io::Error) -> ExecutionError {
    ExecutionError::DataFile {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl OrchestrationEngine for LocalEngine {
    fn kickoff(
        &self,
        crew: &Crew,
        inputs: &HashMap<String, String>,
    ) -> Result<CrewOutput, ExecutionError> {
        self.run(crew, inputs, &mut |_, _, _| Ok(()))
    }

    fn train(
        &self,
        crew: &Crew,
        n_iterations: u32,
        filename: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<(), ExecutionError> {
        let data_path = self.storage_dir.join(TRAINING_DATA_FILE);
        let handler = CrewTrainingHandler::new(&data_path);
        handler
            .clear()
            .map_err(|e| data_file_error(&data_path, e))?;

        for iteration in 0..n_iterations {
            log::info!("Training iteration {}/{}", iteration + 1, n_iterations);
            let output = self.kickoff(crew, inputs)?;

            let mut per_agent: HashMap<&str, Vec<Value>> = HashMap::new();
            for (task, task_output) in crew.tasks.iter().zip(&output.tasks_output) {
                per_agent
                    .entry(task.agent.name.as_str())
                    .or_default()
                    .push(json!({
                        "task": task.name,
                        "expected_output": task_output.expected_output,
                        "output": task_output.raw,
                    }));
            }
            for (agent, entries) in per_agent {
                handler
                    .append(agent, iteration, Value::Array(entries))
                    .map_err(|e| data_file_error(&data_path, e))?;
            }
        }

        let data = handler.load().map_err(|e| data_file_error(&data_path, e))?;
        let mut trained = Map::new();
        for agent in &crew.agents {
            let Some(agent_data) = data.get(agent.name.as_str()) else {
                continue;
            };
            let agent = agent
                .interpolated(inputs)
                .map_err(ExecutionError::Interpolation)?;
            let llm = self.llm_for(&agent)?;
            let evaluation =
                TaskEvaluator::new(llm.as_ref()).evaluate_training_data(agent_data, &agent)?;
            trained.insert(agent.name.clone(), serde_json::to_value(evaluation)?);
        }

        let trained_path = resolve_against(&self.output_dir, filename);
        let agent_count = trained.len();
        FileHandler::new(&trained_path)
            .save(&Value::Object(trained))
            .map_err(|e| data_file_error(&trained_path, e))?;
        log::info!(
            "Trained data for {} agent(s) saved to {}",
            agent_count,
            trained_path.display()
        );
        Ok(())
    }

    fn replay(&self, crew: &Crew, task_id: &str) -> Result<(), ExecutionError> {
        Self::ensure_supported(crew)?;
        let storage = self.storage()?;
        let stored = storage.load()?;
        if stored.is_empty() {
            return Err(ExecutionError::NothingToReplay);
        }

        let (start_index, task) = crew
            .find_task(task_id)
            .ok_or_else(|| ExecutionError::TaskNotFound(task_id.to_string()))?;
        let stored_id = task.id.to_string();
        let record = stored
            .iter()
            .find(|r| r.task_id == stored_id)
            .ok_or_else(|| ExecutionError::TaskNotFound(task_id.to_string()))?;

        let inputs = record.inputs.clone();
        let prior: Vec<TaskOutput> = stored
            .iter()
            .filter(|r| r.task_index < start_index)
            .map(|r| r.output.clone())
            .collect();
        let tasks = Self::prepare_tasks(crew, &inputs)?;

        log::info!(
            "Replaying {} from task '{}' ({} stored output(s) reused)",
            crew.name,
            task.name,
            prior.len()
        );
        let execution = Execution {
            crew,
            tasks,
            inputs: &inputs,
            storage: &storage,
            was_replayed: true,
        };
        self.execute_tasks(&execution, start_index, prior, &mut |_, _, _| Ok(()))?;
        Ok(())
    }

    fn test(
        &self,
        crew: &Crew,
        n_iterations: u32,
        eval_llm: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<(), ExecutionError> {
        let tasks = Self::prepare_tasks(crew, inputs)?;
        let mut evaluator = CrewEvaluator::new(self.llm(eval_llm, "evaluator")?, &tasks);

        for iteration in 1..=n_iterations {
            log::info!("Test iteration {}/{}", iteration, n_iterations);
            evaluator.set_iteration(iteration);
            self.run(crew, inputs, &mut |task, output, elapsed| {
                evaluator.evaluate(task, output, elapsed).map(|_| ())
            })?;
            log::info!(
                "Test iteration {} scores: {:?}",
                iteration,
                evaluator.scores(iteration).unwrap_or_default()
            );
        }

        evaluator.print_crew_evaluation_result();
        Ok(())
    }
}
