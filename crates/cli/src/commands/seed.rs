use std::path::Path;

use crate::commands::CommandResult;
use outfitter_core::config::{AppConfig, LoadOptions};
use outfitter_db::{demo_dataset, StaticCatalog};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    match seed_data_dir(&config.data.dir) {
        Ok(summary) => CommandResult::success("seed", summary),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

/// Write the demo dataset into the data directory, then prove it loads back
/// through the same path the server uses at startup.
fn seed_data_dir(dir: &Path) -> Result<String, (&'static str, String, u8)> {
    std::fs::create_dir_all(dir)
        .map_err(|error| ("data_dir", format!("could not create `{}`: {error}", dir.display()), 4u8))?;

    let dataset = demo_dataset();
    dataset
        .write_to_dir(dir)
        .map_err(|error| ("seed_write", error.to_string(), 5u8))?;

    let reloaded = StaticCatalog::from_data_dir(dir)
        .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

    if reloaded.products().len() != dataset.products.len() {
        return Err((
            "seed_verification",
            format!(
                "reloaded {} products, expected {}",
                reloaded.products().len(),
                dataset.products.len()
            ),
            6u8,
        ));
    }

    Ok(format!(
        "demo dataset written to `{}`: {} products, {} categories, {} users, {} orders",
        dir.display(),
        dataset.products.len(),
        dataset.categories.len(),
        dataset.users.len(),
        dataset.orders.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::seed_data_dir;

    #[test]
    fn seed_writes_and_verifies_the_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");

        let summary = seed_data_dir(dir.path()).expect("seed");
        assert!(summary.contains("6 products"));
        assert!(dir.path().join("products.json").exists());
        assert!(dir.path().join("orders.json").exists());
    }

    #[test]
    fn seeding_twice_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");

        seed_data_dir(dir.path()).expect("first seed");
        let summary = seed_data_dir(dir.path()).expect("second seed");
        assert!(summary.contains("6 products"));
    }
}
