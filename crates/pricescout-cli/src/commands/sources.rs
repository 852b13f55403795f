use pricescout_core::SourceRegistry;

use crate::error::CliError;

use super::CommandOutput;

pub fn run(registry: &SourceRegistry) -> Result<CommandOutput, CliError> {
    let stats = registry.stats();

    let mut text = String::new();
    for entry in &stats {
        text.push_str(&format!(
            "{:<10} wait={}ms initial_back_off={}ms\n",
            entry.source.as_str(),
            entry.limiter.wait_ms,
            entry.limiter.back_off_ms,
        ));
    }

    let data = serde_json::to_value(&stats)?;
    Ok(CommandOutput::ok(data, text.trim_end().to_owned()))
}
