//! Entry-point operations for the Software Development Crew.
//!
//! Each operation composes the crew, hands it to an engine and, on failure,
//! adds the operation it was part of exactly once. Arguments arrive as the
//! raw command-line strings and are validated here, before any engine call.

use std::collections::HashMap;
use std::fmt;

use anyhow::Context;

use crate::crew::Crew;
use crate::crews::crew_output::CrewOutput;
use crate::engine::OrchestrationEngine;
use crate::project::SoftwareDevelopmentCrew;
use crate::utilities::errors::{ArgumentError, CrewError, ExecutionError};

/// Project description the crew documents.
pub const DEFAULT_PROJECT_TYPE: &str = "Todo Application with Real-time Collaboration";

/// Available commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    /// Run the crew.
    Run,
    /// Train the crew.
    Train,
    /// Replay the crew from a task.
    Replay,
    /// Test the crew.
    Test,
}

impl CliCommand {
    /// Progressive form used in error messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Run => "running",
            Self::Train => "training",
            Self::Replay => "replaying",
            Self::Test => "testing",
        }
    }
}

impl fmt::Display for CliCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Train => write!(f, "train"),
            Self::Replay => write!(f, "replay"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Inputs every operation kicks the crew off with.
pub fn default_inputs() -> HashMap<String, String> {
    let mut inputs = HashMap::new();
    inputs.insert("project_type".to_string(), DEFAULT_PROJECT_TYPE.to_string());
    inputs
}

/// Parse an iteration count: a positive integer.
pub fn parse_iterations(value: &str) -> Result<u32, ArgumentError> {
    let n: u32 = value
        .trim()
        .parse()
        .map_err(|_| ArgumentError::InvalidIterations(value.to_string()))?;
    if n == 0 {
        return Err(ArgumentError::ZeroIterations);
    }
    Ok(n)
}

fn non_empty<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ArgumentError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ArgumentError::Empty(name));
    }
    Ok(value)
}

/// Message every failure of `command` is wrapped with.
pub fn error_context(command: CliCommand) -> String {
    format!("An error occurred while {} the crew", command.verb())
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Run the crew with the default inputs and report the result.
pub fn run(
    project: &SoftwareDevelopmentCrew,
    engine: &dyn OrchestrationEngine,
) -> anyhow::Result<CrewOutput> {
    let inputs = default_inputs();
    let result = kickoff(project, engine, &inputs).with_context(|| error_context(CliCommand::Run))?;

    log::info!("Wrote {}", result.output_files().join(", "));
    println!("Software Development Crew execution completed successfully!");
    println!("Development project documentation generated: {}", result);
    Ok(result)
}

/// Train the crew for `n_iterations` and save the result to `filename`.
pub fn train(
    project: &SoftwareDevelopmentCrew,
    engine: &dyn OrchestrationEngine,
    n_iterations: &str,
    filename: &str,
) -> anyhow::Result<()> {
    let context = || error_context(CliCommand::Train);
    let n_iterations = parse_iterations(n_iterations).with_context(context)?;
    let filename = non_empty(filename, "filename").with_context(context)?;

    let inputs = default_inputs();
    compose_and(project, |crew| crew.train(engine, n_iterations, filename, &inputs))
        .with_context(context)
}

/// Replay the crew from `task_id` (task name or id).
pub fn replay(
    project: &SoftwareDevelopmentCrew,
    engine: &dyn OrchestrationEngine,
    task_id: &str,
) -> anyhow::Result<()> {
    let context = || error_context(CliCommand::Replay);
    let task_id = non_empty(task_id, "task_id").with_context(context)?;

    compose_and(project, |crew| crew.replay(engine, task_id)).with_context(context)
}

/// Test the crew for `n_iterations`, scoring with `eval_model`.
pub fn test(
    project: &SoftwareDevelopmentCrew,
    engine: &dyn OrchestrationEngine,
    n_iterations: &str,
    eval_model: &str,
) -> anyhow::Result<()> {
    let context = || error_context(CliCommand::Test);
    let n_iterations = parse_iterations(n_iterations).with_context(context)?;
    let eval_model = non_empty(eval_model, "eval_model").with_context(context)?;

    let inputs = default_inputs();
    compose_and(project, |crew| crew.test(engine, n_iterations, eval_model, &inputs))
        .with_context(context)
}

fn kickoff(
    project: &SoftwareDevelopmentCrew,
    engine: &dyn OrchestrationEngine,
    inputs: &HashMap<String, String>,
) -> Result<CrewOutput, CrewError> {
    let crew = project.crew()?;
    log::debug!("Composed {}", crew);
    Ok(crew.kickoff(engine, inputs)?)
}

fn compose_and<T>(
    project: &SoftwareDevelopmentCrew,
    execute: impl FnOnce(&Crew) -> Result<T, ExecutionError>,
) -> Result<T, CrewError> {
    let crew = project.crew()?;
    log::debug!("Composed {}", crew);
    Ok(execute(&crew)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::base_llm::LlmError;
    use crate::project::software_development::tests::full_base;
    use crate::tasks::task_output::TaskOutput;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Recorded {
        Kickoff {
            inputs: HashMap<String, String>,
        },
        Train {
            n_iterations: u32,
            filename: String,
            inputs: HashMap<String, String>,
        },
        Replay {
            task_id: String,
        },
        Test {
            n_iterations: u32,
            eval_llm: String,
            inputs: HashMap<String, String>,
        },
    }

    /// Records every call; fails all of them when `fail` is set.
    #[derive(Default)]
    struct RecordingEngine {
        calls: Mutex<Vec<Recorded>>,
        fail: bool,
    }

    impl RecordingEngine {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn record(&self, call: Recorded) -> Result<(), ExecutionError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(ExecutionError::Llm {
                    agent: "product_manager".to_string(),
                    source: LlmError::MalformedResponse("boom".to_string()),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OrchestrationEngine for RecordingEngine {
        fn kickoff(
            &self,
            crew: &Crew,
            inputs: &HashMap<String, String>,
        ) -> Result<CrewOutput, ExecutionError> {
            self.record(Recorded::Kickoff {
                inputs: inputs.clone(),
            })?;
            let outputs = crew
                .tasks
                .iter()
                .map(|t| {
                    let raw = format!("{} done", t.name);
                    TaskOutput::new(&t.name, "d", "e", "a", raw, &t.output_file)
                })
                .collect();
            Ok(CrewOutput::from_task_outputs(outputs))
        }

        fn train(
            &self,
            _crew: &Crew,
            n_iterations: u32,
            filename: &str,
            inputs: &HashMap<String, String>,
        ) -> Result<(), ExecutionError> {
            self.record(Recorded::Train {
                n_iterations,
                filename: filename.to_string(),
                inputs: inputs.clone(),
            })
        }

        fn replay(&self, _crew: &Crew, task_id: &str) -> Result<(), ExecutionError> {
            self.record(Recorded::Replay {
                task_id: task_id.to_string(),
            })
        }

        fn test(
            &self,
            _crew: &Crew,
            n_iterations: u32,
            eval_llm: &str,
            inputs: &HashMap<String, String>,
        ) -> Result<(), ExecutionError> {
            self.record(Recorded::Test {
                n_iterations,
                eval_llm: eval_llm.to_string(),
                inputs: inputs.clone(),
            })
        }
    }

    fn project() -> SoftwareDevelopmentCrew {
        SoftwareDevelopmentCrew::new(full_base())
    }

    #[test]
    fn test_parse_iterations() {
        assert_eq!(parse_iterations("3"), Ok(3));
        assert_eq!(parse_iterations(" 10 "), Ok(10));
        assert_eq!(
            parse_iterations("three"),
            Err(ArgumentError::InvalidIterations("three".to_string()))
        );
        assert_eq!(
            parse_iterations("-1"),
            Err(ArgumentError::InvalidIterations("-1".to_string()))
        );
        assert_eq!(parse_iterations("0"), Err(ArgumentError::ZeroIterations));
    }

    #[test]
    fn test_command_display() {
        assert_eq!(CliCommand::Run.to_string(), "run");
        assert_eq!(CliCommand::Test.to_string(), "test");
    }

    #[test]
    fn test_run_kicks_off_with_project_type() {
        let engine = RecordingEngine::default();
        let output = run(&project(), &engine).unwrap();

        assert_eq!(
            engine.calls(),
            vec![Recorded::Kickoff {
                inputs: default_inputs()
            }]
        );
        assert_eq!(output.raw, "deployment_setup done");
        assert_eq!(
            output.output_files(),
            vec![
                "01_requirements_analysis.md",
                "02_system_architecture.md",
                "03_backend_implementation.md",
                "04_frontend_implementation.md",
                "05_quality_assurance.md",
                "06_deployment_setup.md",
            ]
        );
    }

    #[test]
    fn test_train_passes_iterations_and_filename() {
        let engine = RecordingEngine::default();
        train(&project(), &engine, "3", "model.pkl").unwrap();

        assert_eq!(
            engine.calls(),
            vec![Recorded::Train {
                n_iterations: 3,
                filename: "model.pkl".to_string(),
                inputs: default_inputs(),
            }]
        );
    }

    #[test]
    fn test_train_rejects_non_integer_before_engine() {
        let engine = RecordingEngine::default();
        let err = train(&project(), &engine, "three", "model.pkl").unwrap_err();

        assert!(engine.calls().is_empty());
        assert_eq!(err.to_string(), "An error occurred while training the crew");
        assert_eq!(
            err.downcast_ref::<ArgumentError>(),
            Some(&ArgumentError::InvalidIterations("three".to_string()))
        );
    }

    #[test]
    fn test_replay_passes_task_id_without_inputs() {
        let engine = RecordingEngine::default();
        replay(&project(), &engine, "system_architecture").unwrap();

        assert_eq!(
            engine.calls(),
            vec![Recorded::Replay {
                task_id: "system_architecture".to_string()
            }]
        );
    }

    #[test]
    fn test_replay_rejects_empty_task_id() {
        let engine = RecordingEngine::default();
        let err = replay(&project(), &engine, "  ").unwrap_err();
        assert!(engine.calls().is_empty());
        assert_eq!(
            err.downcast_ref::<ArgumentError>(),
            Some(&ArgumentError::Empty("task_id"))
        );
    }

    #[test]
    fn test_test_passes_iterations_and_eval_model() {
        let engine = RecordingEngine::default();
        test(&project(), &engine, "2", "gpt-4o").unwrap();

        assert_eq!(
            engine.calls(),
            vec![Recorded::Test {
                n_iterations: 2,
                eval_llm: "gpt-4o".to_string(),
                inputs: default_inputs(),
            }]
        );
    }

    #[test]
    fn test_engine_failure_is_wrapped_once() {
        let engine = RecordingEngine::failing();
        let err = run(&project(), &engine).unwrap_err();

        let rendered = format!("{:#}", err);
        assert!(rendered.starts_with("An error occurred while running the crew: "));
        assert!(rendered.contains("boom"));
        assert_eq!(rendered.matches("An error occurred").count(), 1);
        assert!(err.downcast_ref::<CrewError>().is_some());
    }

    #[test]
    fn test_each_operation_names_itself_on_failure() {
        let engine = RecordingEngine::failing();
        let project = project();

        let train_err = train(&project, &engine, "1", "out.json").unwrap_err();
        assert!(train_err.to_string().contains("while training the crew"));
        let replay_err = replay(&project, &engine, "system_architecture").unwrap_err();
        assert!(replay_err.to_string().contains("while replaying the crew"));
        let test_err = test(&project, &engine, "1", "gpt-4o").unwrap_err();
        assert!(test_err.to_string().contains("while testing the crew"));
    }

    #[test]
    fn test_configuration_failure_skips_engine() {
        let engine = RecordingEngine::default();
        let mut base = full_base();
        base.agents_config.remove("devops_engineer");

        let err = run(&SoftwareDevelopmentCrew::new(base), &engine).unwrap_err();
        assert!(engine.calls().is_empty());
        assert!(format!("{:#}", err).contains("devops_engineer"));
    }
}
