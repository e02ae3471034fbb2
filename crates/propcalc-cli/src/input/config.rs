use propcalc_core::config::CalculatorDefaults;
use tracing::debug;

/// Load calculator defaults from a YAML file, or the built-in defaults when
/// no file is given. Keys left out of the file keep their built-in value.
pub fn load_defaults(path: Option<&str>) -> Result<CalculatorDefaults, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(CalculatorDefaults::default());
    };

    let (canonical, contents) = super::file::read_text(path)?;
    let defaults = parse_defaults(&contents)
        .map_err(|e| format!("Invalid config '{}': {}", canonical.display(), e))?;
    debug!(path, ?defaults, "loaded calculator defaults");
    Ok(defaults)
}

fn parse_defaults(contents: &str) -> Result<CalculatorDefaults, Box<dyn std::error::Error>> {
    let defaults: CalculatorDefaults = serde_yaml::from_str(contents)?;
    defaults.validate()?;
    Ok(defaults)
}
