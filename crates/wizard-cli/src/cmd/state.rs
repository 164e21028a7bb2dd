use crate::output::{print_json, print_table};
use std::path::Path;
use wizard_core::StepKey;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = super::open_session(root)?;
    let snapshot = session.snapshot();

    if json {
        return print_json(&snapshot);
    }

    let rows = StepKey::all()
        .iter()
        .map(|&step| {
            let completion = &snapshot.steps[&step];
            vec![
                step.ordinal().to_string(),
                step.title().to_string(),
                if completion.is_completed { "yes" } else { "no" }.to_string(),
                completion.completed_at.clone().unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    print_table(&["#", "Step", "Completed", "Completed At"], rows);

    println!();
    println!("Progress:     {}", progress_label(snapshot.progress));
    println!("Next allowed: step {}", snapshot.next_allowed_step);
    if let Some(number) = &snapshot.application_number {
        println!("Application:  {number}");
    }
    Ok(())
}

pub fn progress_label(progress: u8) -> String {
    match StepKey::from_ordinal(progress + 1) {
        Some(step) => format!("{progress} ({})", step.title()),
        None => format!("{progress} (Summary)"),
    }
}
