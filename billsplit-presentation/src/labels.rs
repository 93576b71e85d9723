use billsplit_domain::{Participant, SummaryParticipant};
use billsplit_i18n as i18n;

/// Anything shown under a participant's name.
pub trait Labelled {
    fn display_name(&self) -> &str;
    fn is_me(&self) -> bool;
}

impl Labelled for Participant {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn is_me(&self) -> bool {
        self.is_me
    }
}

impl Labelled for SummaryParticipant {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn is_me(&self) -> bool {
        self.is_me
    }
}

/// `position` is the 1-based roster index.
pub fn participant_label(
    participant: &impl Labelled,
    position: usize,
    local_name: &str,
) -> String {
    let name = participant.display_name().trim();
    if !name.is_empty() {
        return name.to_owned();
    }
    if participant.is_me() {
        let local_name = local_name.trim();
        return if local_name.is_empty() {
            i18n::ME.to_owned()
        } else {
            local_name.to_owned()
        };
    }
    i18n::guest_label(position).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use billsplit_domain::ParticipantId;
    use rstest::rstest;

    #[rstest]
    #[case::named_guest(Participant::guest(ParticipantId(2), " Ana "), "", "Ana")]
    #[case::named_me(Participant::me(ParticipantId(1), "Kai"), "Local", "Kai")]
    #[case::me_with_local_name(Participant::me(ParticipantId(1), ""), "Sam", "Sam")]
    #[case::me_fallback(Participant::me(ParticipantId(1), ""), "  ", "Me")]
    #[case::guest_fallback(Participant::guest(ParticipantId(3), ""), "Sam", "Guest 3")]
    fn labels(#[case] participant: Participant, #[case] local: &str, #[case] expected: &str) {
        let position = participant.id.0 as usize;
        assert_eq!(participant_label(&participant, position, local), expected);
    }
}
