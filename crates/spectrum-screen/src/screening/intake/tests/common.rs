use crate::screening::intake::questionnaire::keys;
use crate::screening::intake::IntakeWizard;

pub(super) const PERSONAL_ANSWERS: [(&str, &str); 4] = [
    (keys::AGE, "34"),
    (keys::GENDER, "f"),
    (keys::ETHNICITY, "White-European"),
    (keys::COUNTRY, "United Kingdom"),
];

pub(super) const BACKGROUND_ANSWERS: [(&str, &str); 4] = [
    (keys::JAUNDICE, "no"),
    (keys::FAMILY_HISTORY, "yes"),
    (keys::USED_APP_BEFORE, "no"),
    (keys::RELATION, "Self"),
];

pub(super) fn answer_behavioral(wizard: &mut IntakeWizard, scores: [&str; 10]) {
    for (key, score) in keys::BEHAVIORAL.into_iter().zip(scores) {
        wizard.set_field_value(key, score).expect("known behavioural key");
    }
}

pub(super) fn answer_all(wizard: &mut IntakeWizard, answers: &[(&str, &str)]) {
    for (key, value) in answers {
        wizard.set_field_value(key, *value).expect("known key");
    }
}

/// Wizard with every section answered and positioned on the final section.
pub(super) fn completed_wizard() -> IntakeWizard {
    let mut wizard = IntakeWizard::standard();
    answer_behavioral(
        &mut wizard,
        ["1", "0", "1", "1", "0", "1", "1", "1", "0", "1"],
    );
    wizard.advance().expect("behavioural section valid");
    answer_all(&mut wizard, &PERSONAL_ANSWERS);
    wizard.advance().expect("personal section valid");
    answer_all(&mut wizard, &BACKGROUND_ANSWERS);
    wizard
}
