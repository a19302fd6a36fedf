use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

/// Category of water body the user says the image shows.
///
/// `None` is the unset state. A report is never generated for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceLabel {
    #[default]
    None,
    Clean,
    River,
    Sea,
    Contaminated,
    SuspectedContamination,
}

impl SourceLabel {
    /// Every label a user can pick, unset first.
    pub const ALL: [SourceLabel; 6] = [
        SourceLabel::None,
        SourceLabel::Clean,
        SourceLabel::River,
        SourceLabel::Sea,
        SourceLabel::Contaminated,
        SourceLabel::SuspectedContamination,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceLabel::None => "None",
            SourceLabel::Clean => "clean",
            SourceLabel::River => "river",
            SourceLabel::Sea => "sea",
            SourceLabel::Contaminated => "contaminated",
            SourceLabel::SuspectedContamination => "suspected contamination",
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, SourceLabel::None)
    }

    /// Returns the label if it is set, `InputError::UnsetLabel` otherwise.
    pub fn require_set(self) -> Result<Self, InputError> {
        if self.is_set() {
            Ok(self)
        } else {
            Err(InputError::UnsetLabel)
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceLabel {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();

        match normalized.as_str() {
            "" | "none" => Ok(SourceLabel::None),
            "clean" => Ok(SourceLabel::Clean),
            "river" => Ok(SourceLabel::River),
            "sea" => Ok(SourceLabel::Sea),
            "contaminated" => Ok(SourceLabel::Contaminated),
            "suspected contamination" => Ok(SourceLabel::SuspectedContamination),
            _ => Err(InputError::UnknownLabel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_loosely() {
        assert_eq!("River".parse::<SourceLabel>(), Ok(SourceLabel::River));
        assert_eq!(
            "suspected-contamination".parse::<SourceLabel>(),
            Ok(SourceLabel::SuspectedContamination)
        );
        assert_eq!(
            " Suspected_Contamination ".parse::<SourceLabel>(),
            Ok(SourceLabel::SuspectedContamination)
        );
        assert_eq!("none".parse::<SourceLabel>(), Ok(SourceLabel::None));
        assert_eq!("".parse::<SourceLabel>(), Ok(SourceLabel::None));
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert_eq!(
            "lake".parse::<SourceLabel>(),
            Err(InputError::UnknownLabel("lake".to_string()))
        );
    }

    #[test]
    fn unset_label_is_refused() {
        assert_eq!(SourceLabel::default().require_set(), Err(InputError::UnsetLabel));
        assert_eq!(SourceLabel::Sea.require_set(), Ok(SourceLabel::Sea));
    }

    #[test]
    fn names_round_trip_through_parse() {
        for label in SourceLabel::ALL {
            assert_eq!(label.name().parse::<SourceLabel>(), Ok(label));
        }
    }
}
