//! Catalogue of editing actions, judge criteria and dataset tasks
//!
//! Each action's template key, judge task phrase and display label live here
//! and nowhere else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Rewrite requested of the generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Lengthen,
    Shorten,
    Friendly,
    Sympathetic,
    Professional,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Lengthen,
        Action::Shorten,
        Action::Friendly,
        Action::Sympathetic,
        Action::Professional,
    ];

    /// Key of this action's entry in the prompt library
    pub fn template_key(self) -> &'static str {
        match self {
            Self::Lengthen => "lengthen",
            Self::Shorten => "shorten",
            Self::Friendly => "friendly",
            Self::Sympathetic => "sympathetic",
            Self::Professional => "professional",
        }
    }

    /// Phrase the judge prompt uses to describe the transformation
    pub fn task_description(self) -> &'static str {
        match self {
            Self::Lengthen => "lengthening the original text",
            Self::Shorten => "shortening the original text",
            Self::Friendly => "changing the tone of the original text to be friendly",
            Self::Sympathetic => "changing the tone of the original text to be sympathetic",
            Self::Professional => "changing the tone of the original text to be professional",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lengthen => "Lengthen",
            Self::Shorten => "Shorten",
            Self::Friendly => "Friendly",
            Self::Sympathetic => "Sympathetic",
            Self::Professional => "Professional",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_key())
    }
}

impl FromStr for Action {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.template_key() == wanted)
            .ok_or_else(|| {
                PipelineError::config(format!(
                    "unknown action '{}' (expected one of: lengthen, shorten, friendly, sympathetic, professional)",
                    s
                ))
            })
    }
}

/// Tone choices offered for change-tone tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Friendly,
    Sympathetic,
    Professional,
}

impl Tone {
    pub fn action(self) -> Action {
        match self {
            Self::Friendly => Action::Friendly,
            Self::Sympathetic => Action::Sympathetic,
            Self::Professional => Action::Professional,
        }
    }

    pub fn label(self) -> &'static str {
        self.action().label()
    }

    pub fn next(self) -> Self {
        match self {
            Self::Friendly => Self::Sympathetic,
            Self::Sympathetic => Self::Professional,
            Self::Professional => Self::Friendly,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Friendly => Self::Professional,
            Self::Sympathetic => Self::Friendly,
            Self::Professional => Self::Sympathetic,
        }
    }
}

/// Axis the judge scores a rewrite on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Completeness,
    Faithfulness,
}

impl Criterion {
    pub const ALL: [Criterion; 2] = [Criterion::Completeness, Criterion::Faithfulness];

    pub fn template_key(self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::Faithfulness => "faithfulness",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Completeness => "Completeness",
            Self::Faithfulness => "Faithfulness",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_key())
    }
}

impl FromStr for Criterion {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.template_key() == wanted)
            .ok_or_else(|| PipelineError::config(format!("unknown judge criterion '{}'", s)))
    }
}

/// Editing task the operator picks; each one owns a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Task {
    #[default]
    Lengthen,
    Shorten,
    ChangeTone,
    LengthenSynthetic,
    ShortenSynthetic,
    ChangeToneSynthetic,
}

impl Task {
    pub const ALL: [Task; 6] = [
        Task::Lengthen,
        Task::Shorten,
        Task::ChangeTone,
        Task::LengthenSynthetic,
        Task::ShortenSynthetic,
        Task::ChangeToneSynthetic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Lengthen => "Lengthen",
            Self::Shorten => "Shorten",
            Self::ChangeTone => "Change Tone",
            Self::LengthenSynthetic => "Lengthen (synthetic)",
            Self::ShortenSynthetic => "Shorten (synthetic)",
            Self::ChangeToneSynthetic => "Change Tone (synthetic)",
        }
    }

    /// File stem of the task's dataset (`<stem>.jsonl`)
    pub fn dataset_stem(self) -> &'static str {
        match self {
            Self::Lengthen => "lengthen",
            Self::Shorten => "shorten",
            Self::ChangeTone => "tone",
            Self::LengthenSynthetic => "lengthen_synthetic",
            Self::ShortenSynthetic => "shorten_synthetic",
            Self::ChangeToneSynthetic => "tone_synthetic",
        }
    }

    pub fn is_tone(self) -> bool {
        matches!(self, Self::ChangeTone | Self::ChangeToneSynthetic)
    }

    pub fn is_synthetic(self) -> bool {
        matches!(
            self,
            Self::LengthenSynthetic | Self::ShortenSynthetic | Self::ChangeToneSynthetic
        )
    }

    /// Resolve the concrete action; tone tasks use the operator's tone choice
    pub fn action(self, tone: Tone) -> Action {
        match self {
            Self::Lengthen | Self::LengthenSynthetic => Action::Lengthen,
            Self::Shorten | Self::ShortenSynthetic => Action::Shorten,
            Self::ChangeTone | Self::ChangeToneSynthetic => tone.action(),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for Task {
    type Err = PipelineError;

    /// Accepts a dataset stem such as `shorten` or `tone_synthetic`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.dataset_stem() == wanted)
            .ok_or_else(|| PipelineError::config(format!("unknown dataset '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trips_through_name() {
        for action in Action::ALL {
            assert_eq!(action.template_key().parse::<Action>().unwrap(), action);
        }
        assert_eq!(" Friendly ".parse::<Action>().unwrap(), Action::Friendly);
        assert!("summarize".parse::<Action>().is_err());
    }

    #[test]
    fn test_task_descriptions() {
        assert_eq!(
            Action::Shorten.task_description(),
            "shortening the original text"
        );
        assert_eq!(
            Action::Professional.task_description(),
            "changing the tone of the original text to be professional"
        );
    }

    #[test]
    fn test_task_resolves_action() {
        assert_eq!(Task::Shorten.action(Tone::Sympathetic), Action::Shorten);
        assert_eq!(
            Task::ShortenSynthetic.action(Tone::Friendly),
            Action::Shorten
        );
        assert_eq!(
            Task::ChangeTone.action(Tone::Sympathetic),
            Action::Sympathetic
        );
        assert_eq!(
            Task::ChangeToneSynthetic.action(Tone::Professional),
            Action::Professional
        );
    }

    #[test]
    fn test_task_cycle_wraps() {
        assert_eq!(Task::ChangeToneSynthetic.next(), Task::Lengthen);
        assert_eq!(Task::Lengthen.prev(), Task::ChangeToneSynthetic);
        assert_eq!(Tone::Professional.next(), Tone::Friendly);
    }

    #[test]
    fn test_task_from_dataset_stem() {
        assert_eq!("tone".parse::<Task>().unwrap(), Task::ChangeTone);
        assert_eq!(
            "shorten_synthetic".parse::<Task>().unwrap(),
            Task::ShortenSynthetic
        );
        assert!("emails".parse::<Task>().is_err());
    }
}
