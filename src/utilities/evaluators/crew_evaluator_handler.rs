//! Scores every task output of a `test` run with an evaluation model and
//! prints a summary table.

use std::collections::BTreeMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::task::Task;
use crate::tasks::task_output::TaskOutput;
use crate::utilities::errors::ExecutionError;
use crate::utilities::evaluators::extract_json_object;
use crate::utilities::printer::{Printer, PrinterColor};

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

const EVALUATOR_ROLE: &str = "Task Execution Evaluator";
const EVALUATOR_GOAL: &str = "Your goal is to evaluate the performance of the agents in the crew \
     based on the tasks they have performed using score from 1 to 10 evaluating on completion, \
     quality, and overall performance.";
const EVALUATOR_BACKSTORY: &str = "Evaluator agent for crew evaluation with precise capabilities \
     to evaluate the performance of the agents in the crew based on the tasks they have performed";

/// Collects per-task quality scores and execution times across iterations.
#[derive(Debug)]
pub struct CrewEvaluator {
    llm: Box<dyn BaseLLM>,
    iteration: u32,
    /// Task names and agent roles, in execution order.
    tasks: Vec<(String, String)>,
    /// iteration → scores in task order.
    tasks_scores: BTreeMap<u32, Vec<f64>>,
    /// iteration → execution seconds in task order.
    execution_times: BTreeMap<u32, Vec<f64>>,
}

impl CrewEvaluator {
    pub fn new(llm: Box<dyn BaseLLM>, tasks: &[Task]) -> Self {
        Self {
            llm,
            iteration: 0,
            tasks: tasks
                .iter()
                .map(|t| (t.name.clone(), t.agent.role.trim().to_string()))
                .collect(),
            tasks_scores: BTreeMap::new(),
            execution_times: BTreeMap::new(),
        }
    }

    pub fn set_iteration(&mut self, iteration: u32) {
        self.iteration = iteration;
    }

    pub fn eval_model(&self) -> &str {
        self.llm.model()
    }

    /// Score one task output from 1 to 10 and record it for the current
    /// iteration.
    pub fn evaluate(
        &mut self,
        task: &Task,
        output: &TaskOutput,
        elapsed: Duration,
    ) -> Result<f64, ExecutionError> {
        let prompt = format!(
            "Based on the task description and the expected output, compare and evaluate the \
             performance of the agents in the crew based on the Task Output they have performed \
             using score from 1 to 10 evaluating on completion, quality, and overall performance.\n\
             task_description: {}\n\
             task_expected_output: {}\n\
             agent: {}\n\
             agent_goal: {}\n\
             Task Output: {}\n\n\
             Respond only with JSON of the form {{\"quality\": <score>}}.",
            task.description.trim(),
            task.expected_output.trim(),
            task.agent.role.trim(),
            task.agent.goal.trim(),
            output.raw
        );
        let messages = vec![
            LLMMessage::system(format!(
                "You are {}. {}\nYour personal goal is: {}",
                EVALUATOR_ROLE, EVALUATOR_BACKSTORY, EVALUATOR_GOAL
            )),
            LLMMessage::user(prompt),
        ];

        let reply = self.llm.call(messages).map_err(|source| ExecutionError::Llm {
            agent: EVALUATOR_ROLE.to_string(),
            source,
        })?;
        let score = parse_quality_score(&reply)?;

        log::debug!(
            "Evaluated task '{}' (iteration {}): {:.1}",
            task.name,
            self.iteration,
            score
        );
        self.tasks_scores.entry(self.iteration).or_default().push(score);
        self.execution_times
            .entry(self.iteration)
            .or_default()
            .push(elapsed.as_secs_f64());
        Ok(score)
    }

    /// Scores recorded for `iteration`, in task order.
    pub fn scores(&self, iteration: u32) -> Option<&[f64]> {
        self.tasks_scores.get(&iteration).map(Vec::as_slice)
    }

    /// Render the evaluation table: one row per task, one column per run,
    /// plus the crew average and total execution time per run.
    pub fn render_table(&self) -> String {
        let runs: Vec<u32> = self.tasks_scores.keys().copied().collect();
        let mut rows: Vec<Vec<String>> = Vec::new();

        let mut header = vec!["Tasks/Scores".to_string()];
        header.extend(runs.iter().map(|r| format!("Run {}", r)));
        header.push("Avg. Total".to_string());
        header.push("Agents".to_string());
        rows.push(header);

        for (index, (name, role)) in self.tasks.iter().enumerate() {
            let scores: Vec<Option<f64>> = runs
                .iter()
                .map(|r| self.tasks_scores[r].get(index).copied())
                .collect();
            let mut row = vec![format!("Task {} ({})", index + 1, name)];
            row.extend(scores.iter().map(|s| format_score(*s)));
            row.push(format_score(mean(scores.iter().flatten().copied())));
            row.push(format!("- {}", role));
            rows.push(row);
        }

        let crew_scores: Vec<Option<f64>> = runs
            .iter()
            .map(|r| mean(self.tasks_scores[r].iter().copied()))
            .collect();
        let mut crew_row = vec!["Crew".to_string()];
        crew_row.extend(crew_scores.iter().map(|s| format_score(*s)));
        crew_row.push(format_score(mean(crew_scores.iter().flatten().copied())));
        crew_row.push(String::new());
        rows.push(crew_row);

        let totals: Vec<f64> = runs
            .iter()
            .map(|r| {
                self.execution_times
                    .get(r)
                    .map(|t| t.iter().sum())
                    .unwrap_or_default()
            })
            .collect();
        let mut time_row = vec!["Execution Time (s)".to_string()];
        time_row.extend(totals.iter().map(|t| format!("{:.0}", t)));
        time_row.push(
            mean(totals.iter().copied())
                .map(|t| format!("{:.0}", t))
                .unwrap_or_else(|| "-".to_string()),
        );
        time_row.push(String::new());
        rows.push(time_row);

        render_rows(&rows)
    }

    /// Print the evaluation table.
    pub fn print_crew_evaluation_result(&self) {
        let printer = Printer::new();
        printer.print(
            &format!("Task Scores (1-10 Higher is better), evaluated by {}", self.eval_model()),
            PrinterColor::BoldPurple,
        );
        printer.print(&self.render_table(), PrinterColor::Cyan);
    }
}

/// Parse a quality score from an evaluation reply.
///
/// Accepts `{"quality": n}` JSON, falling back to the first number in the
/// text. Scores are clamped to 1..=10.
pub fn parse_quality_score(reply: &str) -> Result<f64, ExecutionError> {
    let from_json = extract_json_object(reply).and_then(|v| v.get("quality").and_then(|q| q.as_f64()));
    let score = match from_json {
        Some(score) => score,
        None => NUMBER_PATTERN
            .find(reply)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .ok_or_else(|| ExecutionError::Evaluation(reply.chars().take(200).collect()))?,
    };
    Ok(score.clamp(1.0, 10.0))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn format_score(score: Option<f64>) -> String {
    score.map(|s| format!("{:.1}", s)).unwrap_or_else(|| "-".to_string())
}

fn render_rows(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");

    let mut out = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        let line = widths
            .iter()
            .enumerate()
            .map(|(c, w)| format!(" {:<width$} ", row.get(c).map(String::as_str).unwrap_or(""), width = w))
            .collect::<Vec<_>>()
            .join("|");
        out.push(line.trim_end().to_string());
        if i == 0 {
            out.push(separator.clone());
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::llms::base_llm::LlmError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Scripted(Mutex<Vec<String>>);

    #[async_trait]
    impl BaseLLM for Scripted {
        fn model(&self) -> &str {
            "eval-model"
        }

        fn call(&self, _messages: Vec<LLMMessage>) -> Result<String, LlmError> {
            let mut replies = self.0.lock().unwrap();
            Ok(if replies.is_empty() {
                "{\"quality\": 5}".to_string()
            } else {
                replies.remove(0)
            })
        }
    }

    fn tasks() -> Vec<Task> {
        let pm = Arc::new(Agent::new("product_manager", "Product Manager", "g", "b"));
        let qa = Arc::new(Agent::new("qa_engineer", "QA Engineer", "g", "b"));
        vec![
            Task::new("requirements_analysis", "d", "e", pm, "01.md"),
            Task::new("quality_assurance", "d", "e", qa, "05.md"),
        ]
    }

    fn output(task: &Task) -> TaskOutput {
        TaskOutput::new(&task.name, "d", "e", &task.agent.role, "raw", &task.output_file)
    }

    #[test]
    fn test_parse_quality_score_json() {
        assert_eq!(parse_quality_score("```json\n{\"quality\": 8.5}\n```").unwrap(), 8.5);
    }

    #[test]
    fn test_parse_quality_score_fallback_and_clamp() {
        assert_eq!(parse_quality_score("I would rate this 7 out of 10").unwrap(), 7.0);
        assert_eq!(parse_quality_score("{\"quality\": 42}").unwrap(), 10.0);
        assert!(matches!(
            parse_quality_score("excellent work"),
            Err(ExecutionError::Evaluation(_))
        ));
    }

    #[test]
    fn test_evaluate_records_scores_per_iteration() {
        let llm = Scripted(Mutex::new(vec![
            "{\"quality\": 9}".into(),
            "{\"quality\": 7}".into(),
            "{\"quality\": 8}".into(),
            "{\"quality\": 6}".into(),
        ]));
        let tasks = tasks();
        let mut evaluator = CrewEvaluator::new(Box::new(llm), &tasks);

        for iteration in 1..=2 {
            evaluator.set_iteration(iteration);
            for task in &tasks {
                evaluator
                    .evaluate(task, &output(task), Duration::from_secs(2))
                    .unwrap();
            }
        }

        assert_eq!(evaluator.scores(1), Some(&[9.0, 7.0][..]));
        assert_eq!(evaluator.scores(2), Some(&[8.0, 6.0][..]));

        let table = evaluator.render_table();
        assert!(table.contains("Run 1"));
        assert!(table.contains("Run 2"));
        assert!(table.contains("Task 1 (requirements_analysis)"));
        assert!(table.contains("8.5"));
        assert!(table.contains("- QA Engineer"));
        assert!(table.contains("Crew"));
        assert!(table.contains("Execution Time (s)"));
    }
}
