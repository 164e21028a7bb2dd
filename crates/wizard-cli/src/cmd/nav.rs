use crate::output::print_json;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum NavSubcommand {
    /// Move the progress indicator forward (stops at step 3)
    Next,
    /// Move the progress indicator back
    Previous,
    /// Put the progress indicator back on step 1
    Reset,
    /// Show the progress indicator
    Show,
}

pub fn run(root: &Path, subcmd: NavSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = super::open_session(root)?;
    let nav = session.navigation_mut();
    match subcmd {
        NavSubcommand::Next => nav.next_step(),
        NavSubcommand::Previous => nav.previous_step(),
        NavSubcommand::Reset => nav.reset_wizard(),
        NavSubcommand::Show => {}
    }

    let progress = nav.wizard_step();
    if json {
        print_json(&serde_json::json!({ "progress": progress }))?;
    } else {
        println!("Progress: {}", super::state::progress_label(progress));
    }
    Ok(())
}
