use crate::output::print_json;
use std::path::Path;
use wizard_core::{Route, Visit};

/// Would the guard let the user open `path`?
pub fn run(root: &Path, path: &str, json: bool) -> anyhow::Result<()> {
    let session = super::open_session(root)?;
    let location = Route::parse(path);
    let visit = session.visit(&location);

    if json {
        let value = match &visit {
            Visit::Page(route) => serde_json::json!({
                "route": route.path(),
                "allowed": true,
            }),
            Visit::Redirect(redirect) => serde_json::json!({
                "route": location.path(),
                "allowed": false,
                "redirect": redirect.to,
            }),
        };
        return print_json(&value);
    }

    match visit {
        Visit::Page(route) => println!("{route}: allowed"),
        Visit::Redirect(redirect) => println!("{location}: redirect -> {}", redirect.to),
    }
    Ok(())
}
