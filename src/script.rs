//! The fixed, ordered text shown over the spiral.
//!
//! A `Script` is built once at startup and never mutated. Indexing wraps modulo its
//! length, so a non-empty script can be cycled forever.

/// Errors building a script.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("a script needs at least one line")]
    Empty,
}

/// An immutable, non-empty sequence of text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    lines: Box<[String]>,
}

impl Script {
    /// Build a script from owned lines. Fails on an empty list.
    pub fn new<I, S>(lines: I) -> Result<Self, ScriptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Box<[String]> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            return Err(ScriptError::Empty);
        }
        Ok(Self { lines })
    }

    /// The built-in relaxation session.
    pub fn session() -> Self {
        Self {
            lines: SESSION_LINES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of lines (always >= 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, wrapping modulo `len()`.
    #[inline]
    pub fn line(&self, index: usize) -> &str {
        &self.lines[index % self.lines.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::session()
    }
}

/// Session content, in presentation order.
pub const SESSION_LINES: &[&str] = &[
    // Introduction
    "This simulation is based on common clinical techniques. Please get comfortable and ensure you will not be disturbed.",
    "The goal is simply to achieve a state of deep physical and mental relaxation. Let's begin.",
    // Eye fixation
    "Please allow your eyes to focus on the very center of the spiral on the screen.",
    "As you focus, just allow your eyes to relax. You don't need to stare intently, just rest your gaze there.",
    "As you continue to watch, you may notice your eyelids are beginning to feel heavy... pleasantly heavy and relaxed.",
    "It's a perfectly natural feeling, like at the end of a long day when you are ready for a restful sleep.",
    "Allow them to feel so heavy that they just want to close. And when you are ready, you can let them close.",
    "Or you can continue to watch the screen, whichever feels more comfortable for you.",
    // Progressive relaxation
    "Now, bring your awareness to the muscles in your face and jaw. Allow them to become soft and limp.",
    "Let that feeling of relaxation flow down into your neck and shoulders... letting go of all the tension.",
    "The relaxation flows down your arms, all the way to your fingertips.",
    "Notice your breathing... slow, calm, and regular. Each breath you exhale carries away any remaining tension.",
    "This pleasant feeling of heaviness flows down through your body... down into your legs... all the way to your toes.",
    // Staircase
    "Now, imagine you are standing at the top of a short, comfortable staircase.",
    "There are ten steps leading down to a place of even deeper, more profound relaxation.",
    "In a moment, I will count down from ten to one, and with each number, you will take a step down.",
    "Ten... taking the first step down, feeling yourself drifting twice as deep.",
    "Nine... each muscle in your body becoming even more relaxed.",
    "Eight... deeper and deeper with every step.",
    "Seven... just letting go completely.",
    "Six... halfway there now.",
    "Five... every sound around you only helps you to relax even more.",
    "Four... more and more calm and peaceful.",
    "Three... almost at the bottom now.",
    "Two... deeper and deeper still.",
    "One... step off the bottom step into a state of wonderful, deep relaxation.",
    // Re-alerting
    "Now it is time to return to your normal, fully alert state of awareness.",
    "I will count from one to five. At the count of five, you will be fully awake, feeling calm, refreshed, and alert.",
    "One... slowly, calmly, easily, you are returning.",
    "Two... feeling the energy returning to your arms and legs.",
    "Three... becoming more aware of the room around you.",
    "Four... your eyes are ready to open, feeling clear and refreshed.",
    "Five. Eyes open, fully awake, feeling wonderful. The session is complete.",
];
