use crate::output::{print_fields, print_json};
use anyhow::bail;
use std::path::Path;
use wizard_core::StepKey;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut session = super::open_session(root)?;
    let Some(number) = session.enter_summary() else {
        let next = session.guard().get_next_allowed_step();
        bail!("the application is not complete yet (continue at /step{next})");
    };
    let data = session.store().load();

    if json {
        return print_json(&serde_json::json!({
            "applicationNumber": number,
            "data": data,
        }));
    }

    println!("Application number: {number}");
    for &step in StepKey::all() {
        println!();
        println!("{}", step.title());
        let fields = data.get(step).map(|r| r.fields.clone()).unwrap_or_default();
        print_fields(&fields);
    }
    Ok(())
}
