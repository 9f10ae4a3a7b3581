use std::path::PathBuf;

use clap::Subcommand;
use portfolio_client::preferences::{FilePreferenceStore, LanguagePreference};
use portfolio_models::language::Language;

#[derive(Debug, Subcommand)]
pub enum LanguageCommand {
    /// Print the current display language
    Get,
    /// Change the display language
    Set { language: Language },
}

impl LanguageCommand {
    pub fn invoke(self, preferences: PathBuf) -> anyhow::Result<()> {
        let mut preference = LanguagePreference::load(FilePreferenceStore::new(preferences));

        match self {
            LanguageCommand::Get => println!("{}", preference.language()),
            LanguageCommand::Set { language } => preference.set(language)?,
        }

        Ok(())
    }
}
