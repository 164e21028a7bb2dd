use crate::output::{print_fields, print_json};
use anyhow::{bail, Context};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use wizard_core::{StepFields, StepKey, StepOutcome, WizardError};

#[derive(Subcommand)]
pub enum StepSubcommand {
    /// Show a step's prompt, saved answers, and completion
    Show {
        /// personalInfo, professionalInfo, additionalInfo (or 1-3)
        step: String,
    },
    /// Save and submit a step's answers
    Submit {
        step: String,
        /// Answers as a JSON object
        #[arg(long, conflicts_with = "file")]
        data: Option<String>,
        /// Read answers from a JSON file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Save answers as a draft without submitting
    Draft {
        step: String,
        #[arg(long, conflicts_with = "file")]
        data: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: StepSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        StepSubcommand::Show { step } => show(root, step.parse()?, json),
        StepSubcommand::Submit { step, data, file } => {
            let fields = read_fields(data, file)?;
            submit(root, step.parse()?, fields, json)
        }
        StepSubcommand::Draft { step, data, file } => {
            let fields = read_fields(data, file)?;
            draft(root, step.parse()?, fields, json)
        }
    }
}

fn read_fields(data: Option<String>, file: Option<PathBuf>) -> anyhow::Result<StepFields> {
    let text = match (data, file) {
        (Some(data), _) => data,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("provide the answers with --data '<json>' or --file <path>"),
    };
    let value: serde_json::Value =
        serde_json::from_str(&text).context("answers are not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(WizardError::InvalidPayload.into()),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, step: StepKey, json: bool) -> anyhow::Result<()> {
    let mut session = super::open_session(root)?;
    let allowed = session.guard().can_access_route(&step.route());
    let completion = session.guard().get_step_completion(step);
    let fields = session.load_step(step);
    let descriptor = super::runtime()?.block_on(session.peek(step));

    if json {
        return print_json(&serde_json::json!({
            "step": step,
            "title": step.title(),
            "allowed": allowed,
            "descriptor": descriptor,
            "fields": fields,
            "completion": completion,
        }));
    }

    println!("Step {}: {}", step.ordinal(), step.title());
    if let Some(d) = &descriptor {
        println!("{}", d.message);
    }
    if !allowed {
        let next = session.guard().get_next_allowed_step();
        println!("Locked: complete step {next} first.");
    }
    match &completion.completed_at {
        Some(at) if completion.is_completed => println!("Completed at {at}"),
        _ => println!("Not completed"),
    }
    print_fields(&fields);
    Ok(())
}

// ---------------------------------------------------------------------------
// submit
// ---------------------------------------------------------------------------

fn submit(root: &Path, step: StepKey, fields: StepFields, json: bool) -> anyhow::Result<()> {
    let mut session = super::open_session(root)?;
    let outcome = super::runtime()?.block_on(session.submit_step(step, fields))?;

    if json {
        print_json(&outcome)?;
    }

    match outcome {
        StepOutcome::Next(next) => {
            if !json {
                println!("Submitted {}.", step.title());
                println!("Next: step {} - {}", next.step, next.message);
            }
            Ok(())
        }
        StepOutcome::Completed(result) => {
            if !json {
                println!("{}.", result.message);
                println!("Run `wizard summary` for your application number.");
            }
            Ok(())
        }
        StepOutcome::Failed(error) => {
            bail!("step {} was not submitted: {}", error.step, error.error)
        }
    }
}

// ---------------------------------------------------------------------------
// draft
// ---------------------------------------------------------------------------

fn draft(root: &Path, step: StepKey, fields: StepFields, json: bool) -> anyhow::Result<()> {
    let mut session = super::open_session(root)?;
    session.load_step(step);
    let outcome = session.draft(step, fields);
    // One-shot process: write now rather than after the quiet period.
    let written = session.flush_drafts();

    if json {
        return print_json(&serde_json::json!({
            "outcome": outcome,
            "saved": !written.is_empty(),
        }));
    }

    match outcome {
        wizard_core::autosave::AutoSaveOutcome::Ignored => println!("Nothing to save."),
        wizard_core::autosave::AutoSaveOutcome::Unchanged => println!("No changes."),
        wizard_core::autosave::AutoSaveOutcome::Scheduled { invalidated } => {
            println!("Draft saved for {}.", step.title());
            if invalidated {
                println!("This step and the ones after it need to be submitted again.");
            }
        }
    }
    Ok(())
}
