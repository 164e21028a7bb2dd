use crate::output::print_json;
use std::path::Path;

pub fn run(root: &Path, keep_answers: bool, json: bool) -> anyhow::Result<()> {
    let mut session = super::open_session(root)?;
    if keep_answers {
        session.restart_keeping_answers();
    } else {
        session.start_new_application();
    }

    if json {
        return print_json(&session.snapshot());
    }
    if keep_answers {
        println!("Progress cleared; answers kept. Start again at /step1.");
    } else {
        println!("Started a new application.");
    }
    Ok(())
}
