//! Inbound message classification.
//!
//! Maps raw WhatsApp text to one of five intents using token counts and keyword sets.
//! Checks run in a fixed order and the first match wins: exact greeting/help phrases,
//! support keywords, the full-brief length gate, then the ambiguous-idea fallback.

/// Messages with at least this many whitespace-separated tokens go to the brief crew.
pub const FULL_BRIEF_MIN_WORDS: usize = 15;

/// Exact-match phrases are only considered for messages this short.
const EXACT_MATCH_MAX_WORDS: usize = 3;

const GREETINGS: &[&str] = &["ola", "olá", "oi", "bom dia", "boa tarde", "boa noite", "hi"];

const START_COMMANDS: &[&str] = &["começar", "iniciar projeto", "novo projeto", "criar projeto"];

const HELP_COMMANDS: &[&str] = &["ajuda", "suporte", "dúvida", "duvida"];

/// Substrings that mark a short message as a support question.
const SUPPORT_KEYWORDS: &[&str] = &[
    "erro",
    "bug",
    "funciona",
    "problema no código",
    "executar",
    "link",
    "tutorial",
    "documentação",
    "corrigir",
    "implementar",
    "instalar",
];

/// Which response path a message takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    Help,
    SupportQuestion,
    AmbiguousIdea,
    FullBrief,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Help => "help",
            Intent::SupportQuestion => "support_question",
            Intent::AmbiguousIdea => "ambiguous_idea",
            Intent::FullBrief => "full_brief",
        }
    }

    /// True when the reply is produced by the background crew rather than inline.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Intent::FullBrief)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of whitespace-separated tokens.
pub fn word_count(body: &str) -> usize {
    body.split_whitespace().count()
}

/// Classify a message body. Pure and total: the same text always yields the same intent.
pub fn classify(body: &str) -> Intent {
    let words = word_count(body);
    let lowered = body.trim().to_lowercase();

    if words <= EXACT_MATCH_MAX_WORDS {
        let is = |set: &[&str]| set.iter().any(|p| *p == lowered);
        if is(HELP_COMMANDS) {
            return Intent::Help;
        }
        if is(GREETINGS) || is(START_COMMANDS) {
            return Intent::Greeting;
        }
    }

    if words < FULL_BRIEF_MIN_WORDS && SUPPORT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return Intent::SupportQuestion;
    }

    if words >= FULL_BRIEF_MIN_WORDS {
        return Intent::FullBrief;
    }

    Intent::AmbiguousIdea
}
