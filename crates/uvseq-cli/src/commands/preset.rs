use clap::Subcommand;
use serde_json::json;
use uvseq_core::Config;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List configured presets
    List,
    /// Print the steps of one preset as JSON
    Show {
        /// Preset key (e.g. "standard_cure")
        key: String,
    },
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        PresetAction::List => {
            for (key, preset) in &config.presets {
                println!("{key}\t{}", preset.procedure);
            }
        }
        PresetAction::Show { key } => {
            let preset = config.preset(&key)?;
            let steps: Vec<_> = preset
                .steps(&key, config.procedure.step_count)?
                .into_iter()
                .map(|(time, intensity)| json!({ "time": time, "intensity": intensity }))
                .collect();
            let out = json!({
                "key": key,
                "procedure": preset.procedure,
                "steps": steps,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
