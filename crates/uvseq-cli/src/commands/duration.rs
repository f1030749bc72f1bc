use clap::Subcommand;
use uvseq_core::{format_duration, parse_duration};

#[derive(Subcommand)]
pub enum DurationAction {
    /// Print the total seconds in an HH:MM:SS (or HHMMSS) duration
    Parse { text: String },
    /// Print total seconds as HH:MM:SS
    Format { seconds: u64 },
}

pub fn run(action: DurationAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DurationAction::Parse { text } => println!("{}", parse_duration(&text)?),
        DurationAction::Format { seconds } => println!("{}", format_duration(seconds)),
    }
    Ok(())
}
