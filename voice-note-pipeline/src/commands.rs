//! Fixed-vocabulary command detection for spoken notes.
//!
//! Matching runs in two phases, evaluated in [`Phase::ORDER`]. The first phase
//! with a matching rule decides the command; within a phase, rules are tried
//! in declaration order.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ambiguity::intentions;
use crate::normalize::normalize;

/// Command carried by an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    /// Navigate to the patient in the given bed. `bed` is always >= 1.
    SelectPatient { bed: u32 },
    /// Record or update a clinical opinion for the focused patient.
    UpdateOpinion,
    /// No command; the utterance is a free clinical note.
    None,
}

impl Command {
    /// Wire name used by the command vocabulary.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::SelectPatient { .. } => "select-patient",
            Command::UpdateOpinion => "update-opinion",
            Command::None => "none",
        }
    }

    /// Intention label recorded in session memory.
    pub fn intention(&self) -> &'static str {
        match self {
            Command::SelectPatient { .. } => intentions::SELECT_PATIENT,
            Command::UpdateOpinion => intentions::UPDATE_OPINION,
            Command::None => intentions::FALLBACK,
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Command::SelectPatient { .. })
    }
}

/// Matching phase. Opinion updates outrank patient selection so that
/// "parecer do paciente 5" is an opinion, not a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    OpinionUpdate,
    PatientSelection,
}

impl Phase {
    pub const ORDER: [Phase; 2] = [Phase::OpinionUpdate, Phase::PatientSelection];

    pub fn rules(self) -> &'static [CommandRule] {
        match self {
            Phase::OpinionUpdate => patterns::OPINION_RULES.as_slice(),
            Phase::PatientSelection => patterns::SELECTION_RULES.as_slice(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extractor {
    Opinion,
    Bed,
}

/// One entry of the ordered cascade: a pattern plus what to build from a match.
#[derive(Debug)]
pub struct CommandRule {
    name: &'static str,
    pattern: Regex,
    extractor: Extractor,
}

impl CommandRule {
    fn new(name: &'static str, pattern: Regex, extractor: Extractor) -> Self {
        Self {
            name,
            pattern,
            extractor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the rule to normalized text. Bed captures that are zero or do not
    /// fit a `u32` count as no match.
    pub fn apply(&self, normalized: &str) -> Option<Command> {
        match self.extractor {
            Extractor::Opinion => self
                .pattern
                .is_match(normalized)
                .then_some(Command::UpdateOpinion),
            Extractor::Bed => {
                let captures = self.pattern.captures(normalized)?;
                let bed = captures.get(1)?.as_str().parse::<u32>().ok()?;
                (bed > 0).then_some(Command::SelectPatient { bed })
            }
        }
    }
}

#[allow(clippy::unwrap_used)]
mod patterns {
    use super::{CommandRule, Extractor};
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref OPINION_RULES: [CommandRule; 5] = [
            CommandRule::new(
                "parecer",
                Regex::new(r"^(?:o\s+)?parecer\b").unwrap(),
                Extractor::Opinion,
            ),
            CommandRule::new(
                "atualizar-parecer",
                Regex::new(r"^atualizar\s+(?:o\s+)?parecer\b").unwrap(),
                Extractor::Opinion,
            ),
            CommandRule::new(
                "dar-parecer",
                Regex::new(r"^dar\s+(?:o\s+)?parecer\b").unwrap(),
                Extractor::Opinion,
            ),
            CommandRule::new(
                "fazer-parecer",
                Regex::new(r"^fazer\s+(?:o\s+)?parecer\b").unwrap(),
                Extractor::Opinion,
            ),
            CommandRule::new(
                "registrar-parecer",
                Regex::new(r"^registrar\s+(?:o\s+)?parecer\b").unwrap(),
                Extractor::Opinion,
            ),
        ];

        pub static ref SELECTION_RULES: [CommandRule; 6] = [
            CommandRule::new(
                "mostrar-paciente",
                Regex::new(r"(?:mostrar|mostra|ver)\s+(?:o\s+)?(?:paciente|leito)\s+([0-9]+)").unwrap(),
                Extractor::Bed,
            ),
            CommandRule::new(
                "abrir-leito",
                Regex::new(r"(?:abre|abrir)\s+(?:o\s+)?leito\s+([0-9]+)").unwrap(),
                Extractor::Bed,
            ),
            CommandRule::new(
                "leito",
                Regex::new(r"^leito\s+([0-9]+)$").unwrap(),
                Extractor::Bed,
            ),
            CommandRule::new(
                "focar-leito",
                Regex::new(r"focar\s+(?:no\s+)?leito\s+([0-9]+)").unwrap(),
                Extractor::Bed,
            ),
            CommandRule::new(
                "me-mostra",
                Regex::new(r"me\s+mostra\s+(?:o\s+)?(?:paciente|leito)\s+([0-9]+)").unwrap(),
                Extractor::Bed,
            ),
            CommandRule::new(
                "paciente",
                Regex::new(r"^paciente\s+([0-9]+)$").unwrap(),
                Extractor::Bed,
            ),
        ];
    }
}

/// Map already-normalized text to a command. Pure and deterministic.
pub fn detect(normalized: &str) -> Command {
    for phase in Phase::ORDER {
        for rule in phase.rules() {
            if let Some(command) = rule.apply(normalized) {
                return command;
            }
        }
    }
    Command::None
}

/// Normalize raw text, then [`detect`].
pub fn detect_command(raw: &str) -> Command {
    detect(&normalize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(bed: u32) -> Command {
        Command::SelectPatient { bed }
    }

    #[test]
    fn test_selection_phrasings() {
        let cases = [
            ("me mostra o paciente 5", select(5)),
            ("mostrar paciente 3", select(3)),
            ("mostra paciente 1", select(1)),
            ("ver o leito 4", select(4)),
            ("abre o leito 3", select(3)),
            ("abrir leito 8", select(8)),
            ("leito 5", select(5)),
            ("focar no leito 8", select(8)),
            ("focar leito 2", select(2)),
            ("paciente 01", select(1)),
            ("mostrar o leito 01", select(1)),
        ];
        for (input, expected) in cases {
            assert_eq!(detect_command(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_free_notes_are_not_commands() {
        for input in [
            "nota de voz clinica normal",
            "Estou avaliando aqui o Joãozinho do leito 8",
            "paciente estável",
            "mostrar paciente",
            "",
        ] {
            assert_eq!(detect_command(input), Command::None, "input: {input:?}");
        }
    }

    #[test]
    fn test_bed_boundaries() {
        assert_eq!(detect("leito 0"), Command::None);
        assert_eq!(detect("leito 99"), select(99));
        assert_eq!(detect("paciente 00"), Command::None);
        assert_eq!(detect("leito 99999999999999999999"), Command::None);
    }

    #[test]
    fn test_zero_bed_falls_through_to_later_rules() {
        // "mostrar leito 0" rejects the first rule; no later rule matches either.
        assert_eq!(detect("mostrar leito 0"), Command::None);
        // First rule captures 0, the "focar" rule later in the cascade still applies.
        assert_eq!(detect("mostrar leito 0 focar no leito 7"), select(7));
    }

    #[test]
    fn test_opinion_phase_wins() {
        assert_eq!(detect("parecer do paciente 5"), Command::UpdateOpinion);
        assert_eq!(detect("o parecer do leito 2"), Command::UpdateOpinion);
        assert_eq!(detect("atualizar o parecer"), Command::UpdateOpinion);
        assert_eq!(detect("dar parecer"), Command::UpdateOpinion);
        assert_eq!(detect("fazer   parecer cardiologia"), Command::UpdateOpinion);
        assert_eq!(detect("registrar parecer"), Command::UpdateOpinion);
    }

    #[test]
    fn test_opinion_patterns_are_anchored() {
        assert_eq!(detect("sem parecer ainda"), Command::None);
        assert_eq!(detect("pareceres antigos"), Command::None);
    }

    #[test]
    fn test_phase_order_is_explicit() {
        assert_eq!(Phase::ORDER[0], Phase::OpinionUpdate);
        assert_eq!(Phase::ORDER[1], Phase::PatientSelection);
        assert_eq!(Phase::OpinionUpdate.rules().len(), 5);
        assert_eq!(Phase::PatientSelection.rules().len(), 6);

        let text = "parecer: mostrar paciente 5";
        let selection_hit = Phase::PatientSelection
            .rules()
            .iter()
            .find_map(|rule| rule.apply(text).map(|command| (rule.name(), command)));
        assert_eq!(selection_hit, Some(("mostrar-paciente", select(5))));
        assert_eq!(detect(text), Command::UpdateOpinion);
    }

    #[test]
    fn test_accent_and_whitespace_tolerance() {
        assert_eq!(detect_command("MOSTRAR   PACIENTE   5"), select(5));
        assert_eq!(detect("mostrar   paciente   5"), select(5));
        assert_eq!(detect_command("  mostrar  paciente  5  "), select(5));
        assert_eq!(detect_command("Dár parecer"), detect_command("dar parecer"));
        assert_eq!(detect_command("Paciénte 7"), detect_command("paciente 7"));
    }

    #[test]
    fn test_detect_is_deterministic() {
        for input in ["leito 12", "parecer", "nada aqui", "paciente 01"] {
            assert_eq!(detect(input), detect(input));
        }
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(select(5)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "select-patient", "bed": 5}));
        let json = serde_json::to_value(Command::UpdateOpinion).unwrap();
        assert_eq!(json, serde_json::json!({"type": "update-opinion"}));
        assert_eq!(Command::None.kind(), "none");
    }
}
