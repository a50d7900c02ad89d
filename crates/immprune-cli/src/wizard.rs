use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Datelike;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};
use immprune_core::{BatchOptions, CompareOptions, Config, ImmpruneError};

const DEFAULT_START_YEAR: i32 = 2018;
const DEFAULT_BATCH_YEARS: u32 = 2;

fn prompt_error(e: dialoguer::Error) -> anyhow::Error {
    anyhow::anyhow!("Failed to read user input: {}", e)
}

pub fn parse_year(raw: &str, which: &str) -> Result<i32, ImmpruneError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ImmpruneError::input(format!("invalid {} year", which)))
}

pub fn parse_batch_years(raw: &str) -> Result<u32, ImmpruneError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 && n <= u32::MAX as i64 => Ok(n as u32),
        _ => Err(ImmpruneError::input("invalid years per batch")),
    }
}

pub fn parse_batch_limit(raw: &str) -> Result<usize, ImmpruneError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n as usize),
        _ => Err(ImmpruneError::input("invalid batch limit")),
    }
}

fn ask(theme: &ColorfulTheme, label: &str, default: String) -> anyhow::Result<String> {
    Input::<String>::with_theme(theme)
        .with_prompt(label)
        .default(default)
        .interact_text()
        .map_err(prompt_error)
}

/// Interactive compare set-up: scope, single pass or year batches, output path.
pub fn run_compare_wizard(mut options: CompareOptions) -> anyhow::Result<CompareOptions> {
    let theme = ColorfulTheme::default();
    eprintln!("🪄 Smart compare wizard");

    let scope = Select::with_theme(&theme)
        .with_prompt("Content scope")
        .items(&["All photos and videos", "Videos only"])
        .default(0)
        .interact()
        .map_err(prompt_error)?;
    options.only_videos = scope == 1;

    let style = Select::with_theme(&theme)
        .with_prompt("Check style")
        .items(&["Single pass", "Year batches"])
        .default(0)
        .interact()
        .map_err(prompt_error)?;

    if style == 1 {
        let current_year = chrono::Local::now().year();

        let start_year = parse_year(&ask(&theme, "Start year", DEFAULT_START_YEAR.to_string())?, "start")?;
        let end_year = parse_year(&ask(&theme, "End year", current_year.to_string())?, "end")?;
        if end_year < start_year {
            return Err(ImmpruneError::input("end year must be >= start year").into());
        }
        let batch_years = parse_batch_years(&ask(&theme, "Years per batch", DEFAULT_BATCH_YEARS.to_string())?)?;
        let limit_per_batch = parse_batch_limit(&ask(&theme, "Limit per batch (0 = no limit)", "0".to_string())?)?;

        options.batch = Some(BatchOptions {
            start_year,
            end_year,
            batch_years,
            limit_per_batch,
        });
    }

    let output = ask(&theme, "Output file", options.output.display().to_string())?;
    if !output.trim().is_empty() {
        options.output = PathBuf::from(output.trim());
    }

    Ok(options)
}

/// First-run credential prompt. Persists the answers to `path`.
pub fn run_setup(path: &Path) -> anyhow::Result<Config> {
    let theme = ColorfulTheme::default();
    eprintln!("🔧 First run: immprune setup");
    eprintln!("Create an Immich API key with the 'asset.read' permission.");
    eprintln!("In Immich, open: /user-settings?isOpen=api-keys");

    let url: String = Input::with_theme(&theme)
        .with_prompt("Immich URL (example: https://immich.yourdomain.com)")
        .validate_with(|input: &String| -> Result<(), &str> {
            let input = input.trim();
            if input.is_empty() {
                Err("URL cannot be empty")
            } else if !input.starts_with("http://") && !input.starts_with("https://") {
                Err("URL must start with http:// or https://")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(prompt_error)?;

    let key = Password::with_theme(&theme)
        .with_prompt("Immich API key")
        .interact()
        .map_err(prompt_error)?;

    let config = Config::new(&url, &key);
    config.validate()?;
    config
        .save(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    eprintln!("✅ Secure config written to {}", path.display());
    Ok(config)
}
