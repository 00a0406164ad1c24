use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
///
/// `raw` writes compact JSON, one line per element when the response is a
/// list, so ticket listings and audit trails pipe straight into line tools.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => match serde_json::to_value(value)? {
            Value::Array(items) => {
                let lines = items
                    .iter()
                    .map(serde_json::to_string)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(lines.join("\n"))
            }
            other => Ok(serde_json::to_string(&other)?),
        },
    }
}

/// Print a response to stdout. An empty `raw` listing prints nothing.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}
