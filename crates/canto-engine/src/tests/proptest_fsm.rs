//! Property-based tests for the bilingual engine state machine.
//!
//! Generates random keystroke/backspace/caret/select sequences and verifies
//! structural invariants after every action.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use crate::BilingualEngine;

use super::{cand, make_dicts, make_engine, FakeProvider, FakeProxy, FakeSpellChecker, SessionScript};

#[derive(Debug, Clone)]
enum Action {
    TypeLetter(char),
    TypeDelimiter,
    Backspace,
    CaretLeft,
    CaretRight,
    SelectFirst,
    LoadMore,
    Clear,
}

fn arb_letter() -> impl Strategy<Value = char> {
    // Biased towards letters that form scripted jyutping readings.
    prop_oneof![
        3 => prop::sample::select(vec!['n', 'e', 'i', 'h', 'o', 'u']),
        1 => prop::sample::select(vec!['a', 'b', 'k', 'm', 'Z', 'Q']),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        45 => arb_letter().prop_map(Action::TypeLetter),
        5 => Just(Action::TypeDelimiter),
        15 => Just(Action::Backspace),
        5 => Just(Action::CaretLeft),
        5 => Just(Action::CaretRight),
        10 => Just(Action::SelectFirst),
        8 => Just(Action::LoadMore),
        4 => Just(Action::Clear),
    ]
}

fn make_fsm_engine() -> BilingualEngine {
    let script = SessionScript::new()
        .page_size(2)
        .on("nei", vec![cand("你", "nei", 3), cand("妳", "nei", 3)])
        .on(
            "neihou",
            vec![cand("你好", "nei hou", 6), cand("你", "nei", 3)],
        )
        .on("hou", vec![cand("好", "hou", 3)])
        .preedit_for("neihou", "nei hou");
    let provider = FakeProvider::ready(script);
    let spell = FakeSpellChecker::new().guess("helo", &["hello"]);
    make_engine(
        provider,
        make_dicts(&[("hello", "hello"), ("nei", "nei")]),
        Arc::new(spell),
        Arc::new(FakeProxy::new()),
    )
}

fn execute(engine: &mut BilingualEngine, action: &Action) {
    match action {
        Action::TypeLetter(ch) => {
            engine.process_char(*ch);
        }
        Action::TypeDelimiter => {
            engine.process_char('\'');
        }
        Action::Backspace => {
            engine.process_backspace();
        }
        Action::CaretLeft => {
            engine.move_caret(-1);
        }
        Action::CaretRight => {
            engine.move_caret(1);
        }
        Action::SelectFirst => {
            if engine.candidate_count() > 0 {
                engine.select_candidate(0);
            }
        }
        Action::LoadMore => {
            engine.load_more_candidates();
        }
        Action::Clear => {
            engine.clear_input();
        }
    }
}

fn assert_invariants(engine: &mut BilingualEngine, action: &Action) {
    // 1. Composition caret stays within the composition text.
    if let Some(composition) = engine.composition() {
        let chars = composition.text.chars().count();
        assert!(
            composition.caret_index <= chars,
            "caret {} beyond {} chars after {:?}",
            composition.caret_index,
            chars,
            action,
        );
        assert!(
            !composition.text.is_empty(),
            "composing with empty composition text after {:?}",
            action,
        );
    }

    // 2. Merged candidates are unique and fully addressable.
    let count = engine.candidate_count();
    let mut seen = HashSet::new();
    for i in 0..count {
        let text = engine
            .get_candidate(i)
            .unwrap_or_else(|| panic!("candidate {i} of {count} missing after {action:?}"));
        assert!(
            seen.insert(text.clone()),
            "duplicate candidate {:?} after {:?}",
            text,
            action,
        );
        assert!(
            engine.get_candidate_source(i).is_some(),
            "candidate {} has no source after {:?}",
            i,
            action,
        );
    }

    // 3. Clearing always lands in the idle state.
    if matches!(action, Action::Clear) {
        assert!(
            !engine.is_composing(),
            "still composing after clear_input"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_action_sequences_hold_invariants(
        actions in prop::collection::vec(arb_action(), 0..40)
    ) {
        let mut engine = make_fsm_engine();
        for action in &actions {
            execute(&mut engine, action);
            assert_invariants(&mut engine, action);
        }
    }

    #[test]
    fn prop_typing_then_clearing_is_idle(
        letters in prop::collection::vec(arb_letter(), 0..12)
    ) {
        let mut engine = make_fsm_engine();
        for ch in &letters {
            engine.process_char(*ch);
        }
        engine.clear_input();
        prop_assert!(!engine.is_composing());
        prop_assert_eq!(engine.candidate_count(), 0);
    }
}
