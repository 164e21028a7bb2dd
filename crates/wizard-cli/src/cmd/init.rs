use anyhow::Context;
use std::path::Path;
use wizard_core::config::WizardConfig;
use wizard_core::{io, paths};

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing wizard in: {}", root.display());

    let storage = paths::storage_dir(root);
    io::ensure_dir(&storage).with_context(|| format!("failed to create {}", storage.display()))?;

    if WizardConfig::write_default_if_missing(root).context("failed to write config.yaml")? {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let config = WizardConfig::load(root).context("failed to read config.yaml")?;
    for warning in config.validate() {
        println!("  {:?}: {}", warning.level, warning.message);
    }

    println!("Done. Next: wizard step show personalInfo");
    Ok(())
}
