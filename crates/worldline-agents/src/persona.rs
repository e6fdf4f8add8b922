//! Presentation data for the four narrator personas.

use serde::Serialize;

use worldline_types::Persona;

/// How a persona is shown next to its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersonaProfile {
    /// Which persona this describes.
    pub persona: Persona,
    /// Name shown in the message header.
    pub display_name: &'static str,
    /// Colour tag used by the dashboard theme.
    pub color: &'static str,
    /// Avatar emoji.
    pub emoji: &'static str,
}

/// Presentation data for `persona`.
pub const fn profile(persona: Persona) -> PersonaProfile {
    let (display_name, color, emoji) = match persona {
        Persona::Okabe => ("Okabe Rintaro", "sg-green", "\u{1f97c}"),
        Persona::Kurisu => ("Makise Kurisu", "sg-red", "\u{1f9e0}"),
        Persona::Daru => ("Hashida Itaru", "sg-blue", "\u{1f4bb}"),
        Persona::Mayuri => ("Shiina Mayuri", "sg-amber", "\u{1f338}"),
    };
    PersonaProfile {
        persona,
        display_name,
        color,
        emoji,
    }
}
