//! Canned dialogue per (persona, context) pair.
//!
//! Every pool is a fixed, non-empty list of literal lines. A line is only
//! ever returned for the pair whose pool contains it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use worldline_types::{NarrativeContext, Persona};

use crate::selector::{AgentSelector, DEFAULT_PERSONA};

/// Line used when the context is not recognised.
pub const GENERIC_LINE: &str = "The Organization is watching. Stay focused, lab member.";

// ---------------------------------------------------------------------------
// Pools
// ---------------------------------------------------------------------------

const OKABE_GREETING: &[&str] = &[
    "Welcome back to the Future Gadget Lab. The Organization won't stop us today!",
    "Hououin Kyouma has returned. Let today's operation begin!",
    "The worldline awaits your choices, lab member. El Psy Kongroo.",
];

const OKABE_SUCCESS: &[&str] = &[
    "Excellent! Another step toward Steins Gate!",
    "Muhahaha! The Organization trembles before our progress!",
    "This is the choice of Steins Gate!",
];

const OKABE_FAILURE: &[&str] = &[
    "A minor setback. Even the mad scientist stumbles.",
    "The Organization interfered. We regroup and strike again.",
    "This is not the worldline we want. We change it tomorrow.",
];

const OKABE_LEVEL_UP: &[&str] = &[
    "Your rank in the Future Gadget Lab has risen! Hououin Kyouma approves.",
    "A new level! The divergence meter itself salutes you.",
];

const KURISU_GREETING: &[&str] = &[
    "Oh, you're here. Let's get some actual work done today.",
    "Good. I was starting to think you'd forgotten about your goals.",
    "Hello. Try to be productive, not just busy.",
];

const KURISU_SUCCESS: &[&str] = &[
    "Not bad. Your consistency is statistically significant.",
    "Well done. I suppose I can admit that was impressive.",
    "Good work. The data supports your progress.",
];

const KURISU_FAILURE: &[&str] = &[
    "Hmph. You'll need more discipline than that.",
    "Setbacks are data too. Analyse what went wrong.",
    "That's not going to cut it. Try again, properly this time.",
];

const KURISU_LEVEL_UP: &[&str] = &[
    "Level up, huh. Don't let it go to your head.",
    "Measurable improvement. I'll note it in the lab records.",
];

const DARU_GREETING: &[&str] = &[
    "Yo, Okarin's buddy! Ready to grind some XP?",
    "Super hacker Daru is online. Let's boot up today's quests.",
    "Sup. Servers are up, snacks are ready, let's go.",
];

const DARU_SUCCESS: &[&str] = &[
    "Nice! That's some pro-level grinding right there.",
    "XP acquired! You're speedrunning life, dude.",
    "Achievement unlocked. Totally legit, no hacks.",
];

const DARU_FAILURE: &[&str] = &[
    "Oof. Even the best players lose a round sometimes.",
    "Lag spike. Respawn and try again, man.",
    "That one's a bug, not a feature. We'll patch it.",
];

const DARU_LEVEL_UP: &[&str] = &[
    "Ding! Level up! Stats going brrr.",
    "New level reached. Time to flex on the leaderboard.",
];

const MAYURI_GREETING: &[&str] = &[
    "Tutturu~! Mayushii is here! Let's do our best today!",
    "Tutturu~! Good morning! Did you eat breakfast?",
    "Mayushii made a wish for your day to go well~",
];

const MAYURI_SUCCESS: &[&str] = &[
    "Yay! Mayushii is so proud of you~!",
    "Tutturu~! You did it! That deserves a banana~",
    "Wow, amazing! Keep going, keep going~",
];

const MAYURI_FAILURE: &[&str] = &[
    "It's okay~ Mayushii believes in you!",
    "Don't be sad! Tomorrow will be better, Mayushii promises~",
    "Everyone has off days. Let's rest and try again~",
];

const MAYURI_LEVEL_UP: &[&str] = &[
    "Tutturu~! You leveled up! Mayushii will make you a cosplay to celebrate~",
    "A new level! Mayushii is cheering super loud~",
];

/// The line pool for `persona` in `context`.
pub const fn lines_for(persona: Persona, context: NarrativeContext) -> &'static [&'static str] {
    match (persona, context) {
        (Persona::Okabe, NarrativeContext::Greeting) => OKABE_GREETING,
        (Persona::Okabe, NarrativeContext::Success) => OKABE_SUCCESS,
        (Persona::Okabe, NarrativeContext::Failure) => OKABE_FAILURE,
        (Persona::Okabe, NarrativeContext::LevelUp) => OKABE_LEVEL_UP,
        (Persona::Kurisu, NarrativeContext::Greeting) => KURISU_GREETING,
        (Persona::Kurisu, NarrativeContext::Success) => KURISU_SUCCESS,
        (Persona::Kurisu, NarrativeContext::Failure) => KURISU_FAILURE,
        (Persona::Kurisu, NarrativeContext::LevelUp) => KURISU_LEVEL_UP,
        (Persona::Daru, NarrativeContext::Greeting) => DARU_GREETING,
        (Persona::Daru, NarrativeContext::Success) => DARU_SUCCESS,
        (Persona::Daru, NarrativeContext::Failure) => DARU_FAILURE,
        (Persona::Daru, NarrativeContext::LevelUp) => DARU_LEVEL_UP,
        (Persona::Mayuri, NarrativeContext::Greeting) => MAYURI_GREETING,
        (Persona::Mayuri, NarrativeContext::Success) => MAYURI_SUCCESS,
        (Persona::Mayuri, NarrativeContext::Failure) => MAYURI_FAILURE,
        (Persona::Mayuri, NarrativeContext::LevelUp) => MAYURI_LEVEL_UP,
    }
}

/// Pick one line from the pool for `persona` in `context`.
///
/// Never returns an empty string.
pub fn generate_message(
    persona: Persona,
    context: NarrativeContext,
    rng: &mut impl Rng,
) -> &'static str {
    let pool = lines_for(persona, context);
    if pool.is_empty() {
        return GENERIC_LINE;
    }
    let idx: usize = rng.random_range(0..pool.len());
    pool.get(idx).copied().unwrap_or(GENERIC_LINE)
}

// ---------------------------------------------------------------------------
// Narrator
// ---------------------------------------------------------------------------

/// A narrator's reaction, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Who is speaking.
    pub persona: Persona,
    /// The context the line was chosen for (`None` for the generic fallback).
    pub context: Option<NarrativeContext>,
    /// The line itself.
    pub text: String,
}

/// Selects a persona and a line in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narrator {
    /// Persona selection weights.
    selector: AgentSelector,
}

impl Narrator {
    /// Create a narrator over the given selector.
    pub const fn new(selector: AgentSelector) -> Self {
        Self { selector }
    }

    /// The underlying selector.
    pub const fn selector(&self) -> &AgentSelector {
        &self.selector
    }

    /// Select a persona for `context` and one of its lines.
    pub fn speak(&self, context: NarrativeContext, rng: &mut impl Rng) -> AgentMessage {
        let persona = self.selector.select(context, rng);
        let text = generate_message(persona, context, rng);
        AgentMessage {
            persona,
            context: Some(context),
            text: text.to_owned(),
        }
    }

    /// Like [`speak`](Self::speak), but with the context given by label.
    ///
    /// Unknown labels produce the default narrator with [`GENERIC_LINE`].
    pub fn speak_label(&self, label: &str, rng: &mut impl Rng) -> AgentMessage {
        match NarrativeContext::from_label(label) {
            Some(context) => self.speak(context, rng),
            None => {
                tracing::debug!(label, "unknown narrative context, using generic line");
                AgentMessage {
                    persona: DEFAULT_PERSONA,
                    context: None,
                    text: GENERIC_LINE.to_owned(),
                }
            }
        }
    }
}
