use pretty_assertions::assert_eq;

use super::*;

fn message(text: &str, iid: u32, severity: Severity) -> CheckMessage {
    CheckMessage {
        message: text.to_owned(),
        iid: Iid::from_raw(iid),
        function_iid: None,
        severity,
        kind: ConstraintKind::IsObject,
    }
}

#[test]
fn identical_messages_are_reported_once() {
    let mut log = MessageLog::default();
    log.report(message("Is not an object type", 3, Severity::Error));
    log.report(message("Is not an object type", 3, Severity::Error));
    log.report(message("Is not an object type", 4, Severity::Error));
    log.report(message("Is not an object type", 3, Severity::Warning));

    assert_eq!(log.errors(), 2);
    assert_eq!(log.warnings(), 1);
    let iids: Vec<_> = log.into_messages().iter().map(|m| m.iid.raw()).collect();
    assert_eq!(iids, vec![3, 4, 3]);
}

#[test]
fn function_iid_distinguishes_messages() {
    let mut log = MessageLog::default();
    let mut inner = message("Should not be Top", 1, Severity::Warning);
    log.report(inner.clone());
    inner.function_iid = Some(Iid::from_raw(9));
    log.report(inner);
    assert_eq!(log.warnings(), 2);
}

#[test]
fn messages_display_site_and_kind() {
    let mut m = message("Is not an object type", 12, Severity::Error);
    assert_eq!(m.to_string(), "error [IsObject] at #12: Is not an object type");
    m.function_iid = Some(Iid::from_raw(2));
    assert_eq!(
        m.to_string(),
        "error [IsObject] at #12 in #2: Is not an object type"
    );
}
