use serde::Serialize;

use outfitter_core::config::{AppConfig, LoadOptions};
use outfitter_db::connect_with_settings;

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: &'static str,
    detail: String,
}

pub fn run(json: bool) -> String {
    let checks = collect_checks();

    if json {
        return serde_json::to_string_pretty(&checks)
            .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"));
    }

    let mut lines = vec!["outfitter doctor".to_string()];
    for check in &checks {
        lines.push(format!("  [{}] {} - {}", check.status, check.name, check.detail));
    }
    lines.join("\n")
}

fn collect_checks() -> Vec<DoctorCheck> {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config",
                status: "ok",
                detail: "configuration loads and validates".to_string(),
            });
            config
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config",
                status: "fail",
                detail: error.to_string(),
            });
            return checks;
        }
    };

    checks.push(database_check(&config));

    if config.data.dir.join("products.json").exists() {
        checks.push(DoctorCheck {
            name: "data_dir",
            status: "ok",
            detail: format!("catalog data present in `{}`", config.data.dir.display()),
        });
    } else {
        checks.push(DoctorCheck {
            name: "data_dir",
            status: "warn",
            detail: format!(
                "no products.json in `{}`; the server will use the embedded demo dataset \
                 (run `outfitter seed`)",
                config.data.dir.display()
            ),
        });
    }

    checks.push(if config.llm.api_key.is_some() {
        DoctorCheck {
            name: "llm",
            status: "ok",
            detail: format!("api key configured for model `{}`", config.llm.model),
        }
    } else {
        DoctorCheck {
            name: "llm",
            status: "warn",
            detail: "no api key configured; routing and handlers will degrade to fallbacks"
                .to_string(),
        }
    });

    checks
}

fn database_check(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "database",
                status: "fail",
                detail: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await?;
        sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&pool).await?;
        pool.close().await;
        Ok::<(), sqlx::Error>(())
    });

    match result {
        Ok(()) => DoctorCheck {
            name: "database",
            status: "ok",
            detail: format!("reachable at `{}`", config.database.url),
        },
        Err(error) => DoctorCheck {
            name: "database",
            status: "fail",
            detail: error.to_string(),
        },
    }
}
