use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::{get_config_path, validate_config, Config, DisplayConfig, DEFAULT_DECIMALS, MAX_DECIMALS};

/// Prompt with a message and return the trimmed input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<String> {
    write!(out, "{}", message).context("Failed to write prompt")?;
    out.flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim().to_string())
}

/// Prompt with a default value. Returns default if input is empty.
fn prompt_with_default<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
    default: &str,
) -> Result<String> {
    let answer = prompt(input, out, &format!("{} [{}]: ", message, default))?;
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}

/// Prompt with a yes/no question.
fn prompt_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
    default_yes: bool,
) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let answer = prompt(input, out, &format!("{} [{}]: ", message, hint))?.to_lowercase();
    if answer.is_empty() {
        Ok(default_yes)
    } else {
        Ok(answer == "y" || answer == "yes")
    }
}

/// Ask for the config values, re-prompting until decimals is valid.
pub fn ask_config<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Config> {
    let store_default = crate::store::get_store_path().display().to_string();
    let store_path = prompt_with_default(input, out, "Where should camp data be stored?", &store_default)?;

    let decimals = loop {
        let answer = prompt_with_default(
            input,
            out,
            "Decimal places for results",
            &DEFAULT_DECIMALS.to_string(),
        )?;
        match answer.parse::<usize>() {
            Ok(n) if n <= MAX_DECIMALS => break n,
            _ => writeln!(out, "  Enter a whole number between 0 and {}.", MAX_DECIMALS)
                .context("Failed to write prompt")?,
        }
    };

    let medals = prompt_yes_no(input, out, "Show medals for the podium?", true)?;

    Ok(Config {
        store_path: if store_path == store_default {
            None
        } else {
            Some(store_path)
        },
        display: Some(DisplayConfig {
            decimals: Some(decimals),
            medals: Some(medals),
        }),
    })
}

/// Serialize and write a config file atomically, creating parent directories.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(errors) = validate_config(config).err() {
        anyhow::bail!("Refusing to write invalid config: {}", errors.join("; "));
    }

    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = atomic_write_file::AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit().context("Failed to save config")?;

    Ok(())
}

/// Create a config file, interactively unless `use_defaults` is set.
///
/// An existing file is only replaced when `force` is set.
pub fn run_init(target: Option<PathBuf>, use_defaults: bool, force: bool) -> Result<PathBuf> {
    let config_path = target.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = if use_defaults {
        Config::default()
    } else {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut out = std::io::stdout();
        ask_config(&mut input, &mut out)?
    };

    write_config(&config_path, &config)?;
    tracing::info!(path = %config_path.display(), "Wrote config");
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_config_accepts_defaults() {
        let mut input = Cursor::new("\n\n\n");
        let mut out = Vec::new();
        let config = ask_config(&mut input, &mut out).unwrap();
        assert!(config.store_path.is_none());
        assert_eq!(config.decimals(), DEFAULT_DECIMALS);
        assert!(config.medals());
    }

    #[test]
    fn test_ask_config_reprompts_bad_decimals() {
        let mut input = Cursor::new("/tmp/camp.json\n9\nabc\n3\nn\n");
        let mut out = Vec::new();
        let config = ask_config(&mut input, &mut out).unwrap();
        assert_eq!(config.store_path.as_deref(), Some("/tmp/camp.json"));
        assert_eq!(config.decimals(), 3);
        assert!(!config.medals());

        let transcript = String::from_utf8(out).unwrap();
        assert_eq!(transcript.matches("Enter a whole number").count(), 2);
    }

    #[test]
    fn test_write_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.yaml");
        let config = Config {
            store_path: Some("/data/camp.json".to_string()),
            display: Some(DisplayConfig {
                decimals: Some(1),
                medals: Some(false),
            }),
        };
        write_config(&path, &config).unwrap();
        let loaded = super::super::load_config(Some(path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_write_config_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = Config {
            store_path: None,
            display: Some(DisplayConfig {
                decimals: Some(40),
                medals: None,
            }),
        };
        assert!(write_config(&path, &config).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_run_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "{}\n").unwrap();

        let err = run_init(Some(path.clone()), true, false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        run_init(Some(path.clone()), true, true).unwrap();
        assert!(super::super::load_config(Some(path)).is_ok());
    }
}
