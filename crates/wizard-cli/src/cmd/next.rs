use crate::output::print_json;
use std::path::Path;
use wizard_core::{Route, Visit};

/// Where opening the wizard's root would take the user right now.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = super::open_session(root)?;
    let target = match session.visit(&Route::Root) {
        Visit::Redirect(redirect) => redirect.to,
        Visit::Page(route) => route.path().to_string(),
    };

    if json {
        print_json(&serde_json::json!({ "route": target }))?;
    } else {
        match Route::parse(&target).step() {
            Some(step) => println!("{target}  ({})", step.title()),
            None => println!("{target}"),
        }
    }
    Ok(())
}
