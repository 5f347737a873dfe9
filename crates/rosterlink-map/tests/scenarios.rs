use rosterlink_map::{
    Classification, Command, MatchResolver, MatchSessionState, MatchThresholds, ReconcileSession,
    SessionError, SourceStatus, TransitionError, normalize, score,
};

#[test]
fn diacritics_are_ignored() {
    let name = normalize("João Félix");
    assert_eq!(name.tokens, vec!["joao", "felix"]);
    assert_eq!(score("João Félix", "Joao Felix"), 1.0);
}

#[test]
fn reversed_order_is_a_certain_match() {
    assert_eq!(score("Kevin De Bruyne", "De Bruyne Kevin"), 1.0);
}

#[test]
fn generational_suffixes_are_stripped() {
    assert!(score("Vinícius Júnior", "Vinicius Jr.") >= 0.85);
}

#[test]
fn abbreviated_first_name_resolves_automatically() {
    let resolver = MatchResolver::new(MatchThresholds::new(0.65, 0.4).unwrap());
    let batch = resolver.resolve_all(&["Mohamed Salah"], &["Mo Salah"]);
    let resolution = &batch.resolutions[0];
    assert_eq!(resolution.classification, Classification::Auto);
    assert_eq!(resolution.best_match.as_deref(), Some("Mo Salah"));
}

#[test]
fn target_cannot_be_double_booked() {
    let mut state = MatchSessionState::new();
    state.confirm("A", "X").unwrap();
    let err = state.confirm("B", "X").unwrap_err();
    assert!(matches!(err, TransitionError::TargetAlreadyConsumed { .. }));
    assert_eq!(state.owner_of("X"), Some("A"));
    assert_eq!(state.status("B"), SourceStatus::Pending);

    // Once A moves elsewhere, X is free for B.
    state.confirm("A", "Y").unwrap();
    state.confirm("B", "X").unwrap();
    assert_eq!(state.owner_of("X"), Some("B"));
    assert!(state.is_consistent());
}

#[test]
fn undo_with_empty_history_is_refused() {
    let mut state = MatchSessionState::new();
    assert_eq!(state.undo(), Err(TransitionError::EmptyHistory));
    assert_eq!(state.summary().confirmed, 0);
}

#[test]
fn full_review_session() {
    let sources: Vec<String> = ["Mo Salah", "Vinicius Jr.", "K. De Bruyne", "Trialist 7"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let targets: Vec<String> = [
        "Mohamed Salah",
        "Vinícius Júnior",
        "Kevin De Bruyne",
        "Kyle Walker",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let mut session = ReconcileSession::new(
        "physical",
        sources,
        "wyscout",
        targets,
        MatchResolver::default(),
    );
    let applied = session.auto_match().unwrap();
    assert!(applied.len() >= 2);
    assert_eq!(
        session.status("Mo Salah"),
        SourceStatus::Confirmed("Mohamed Salah".to_string())
    );

    while let Some(source) = session.next_pending().map(str::to_string) {
        let resolution = session.suggest(&source).unwrap();
        let command = match resolution.best_match {
            Some(_) if source != "Trialist 7" => Command::AcceptSuggestion { source },
            _ => Command::Reject { source },
        };
        session.apply(command).unwrap();
    }

    let mapping = session.snapshot();
    assert_eq!(mapping.target_for("K. De Bruyne"), Some("Kevin De Bruyne"));
    assert_eq!(mapping.rejected, vec!["Trialist 7".to_string()]);
    assert_eq!(session.available_targets(), vec!["Kyle Walker"]);

    let err = session
        .apply(Command::Confirm {
            source: "Trialist 7".to_string(),
            target: "Mohamed Salah".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, SessionError::Transition(_)));
}
