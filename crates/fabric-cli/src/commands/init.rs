//! `fabric init` — scaffold a fabric.toml with default settings.

use std::path::Path;

use anyhow::{Context, bail};

use fabric_core::FabricConfig;

const HEADER: &str = "\
# fabric.toml — request fabric run configuration.
#
# Drop requests from a source range with:
#
# [[blocked]]
# low = \"10.0.0.1\"
# high = \"10.0.0.255\"

";

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let body = scaffold()?;
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    println!("✓ Generated {}", path.display());
    Ok(())
}

fn scaffold() -> anyhow::Result<String> {
    Ok(format!("{HEADER}{}", FabricConfig::default().to_toml_string()?))
}
