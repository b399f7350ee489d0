use proptest::prelude::*;
use sheetstorm_wizard::{allowed_transitions, validate_transition, StateMachineError, WizardStep};

#[test]
fn test_forward_transitions() {
    assert!(validate_transition(WizardStep::Upload, WizardStep::Mapping).is_ok());
    assert!(validate_transition(WizardStep::Mapping, WizardStep::Preview).is_ok());
    assert!(validate_transition(WizardStep::Preview, WizardStep::Success).is_ok());
    assert!(validate_transition(WizardStep::Success, WizardStep::Upload).is_ok());

    // Invalid
    assert!(validate_transition(WizardStep::Upload, WizardStep::Preview).is_err());
    assert!(validate_transition(WizardStep::Mapping, WizardStep::Success).is_err());
    assert!(validate_transition(WizardStep::Success, WizardStep::Preview).is_err());
}

#[test]
fn test_back_transitions() {
    assert!(validate_transition(WizardStep::Preview, WizardStep::Mapping).is_ok());
    assert!(validate_transition(WizardStep::Mapping, WizardStep::Upload).is_ok());
    assert!(validate_transition(WizardStep::Success, WizardStep::Preview).is_err());
}

#[test]
fn test_close_from_any_step() {
    for step in WizardStep::ALL {
        assert!(validate_transition(step, WizardStep::Upload).is_ok(), "{step}");
    }
}

#[test]
fn test_error_names_both_steps() {
    let err = validate_transition(WizardStep::Upload, WizardStep::Success).unwrap_err();
    assert_eq!(
        err,
        StateMachineError::IllegalTransition {
            from: WizardStep::Upload,
            to: WizardStep::Success,
        }
    );
    assert_eq!(err.to_string(), "illegal step transition: upload -> success");
}

proptest! {
    #[test]
    fn prop_all_transitions_are_subset_of_allowed(
        from in prop::sample::select(WizardStep::ALL.to_vec()),
        to in prop::sample::select(WizardStep::ALL.to_vec()),
    ) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }
}
