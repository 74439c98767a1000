//! Command-line interface.

pub mod commands;
pub mod display;
pub mod types;

pub use types::Cli;

/// Report a fatal error on stderr (or stdout as JSON) with its full cause chain.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "success": false,
                "error": err.to_string(),
                "causes": causes,
            }))
            .unwrap_or_default()
        );
    } else {
        eprintln!("{}", display::action_failure(&format!("{err:#}")));
    }
}
