//! Property-based tests for domain logic
//!
//! These tests use proptest to verify invariants across many random inputs.

#[cfg(test)]
mod tests {
    use crate::domain::{
        detect_pipeline_position, detect_work_streams, evaluate_rules, Command, PipelinePhase,
        SemanticIntent, StateMachine,
    };
    use crate::schemas::{
        Estimate, IssueContext, IssueFileOwnership, IssueState, LabelMatch, MatchCriteria,
        RoutingAction, RoutingConfig, RoutingRule, WorkflowState,
    };
    use proptest::prelude::*;

    // ===== STRATEGY HELPERS =====

    fn any_workflow_state() -> impl Strategy<Value = WorkflowState> {
        proptest::sample::select(WorkflowState::ALL.to_vec())
    }

    fn any_command() -> impl Strategy<Value = Command> {
        proptest::sample::select(Command::ALL.to_vec())
    }

    fn any_estimate() -> impl Strategy<Value = Option<Estimate>> {
        prop_oneof![
            Just(None),
            Just(Some(Estimate::Xs)),
            Just(Some(Estimate::S)),
            Just(Some(Estimate::M)),
            Just(Some(Estimate::L)),
            Just(Some(Estimate::Xl)),
        ]
    }

    /// Mostly board states, occasionally something the board does not know
    fn any_state_name() -> impl Strategy<Value = String> {
        prop_oneof![
            8 => any_workflow_state().prop_map(|s| s.to_string()),
            1 => "[a-z ]{0,12}",
        ]
    }

    fn any_issue_state() -> impl Strategy<Value = IssueState> {
        (1u64..50, any_state_name(), any_estimate(), 0u32..3).prop_map(
            |(number, state, estimate, subs)| {
                IssueState::new(number, format!("Issue {}", number), state)
                    .with_estimate(estimate)
                    .with_sub_issue_count(subs)
            },
        )
    }

    fn any_ownership() -> impl Strategy<Value = IssueFileOwnership> {
        (
            1u64..30,
            prop::collection::vec("[a-e]\\.rs", 0..4),
            prop::collection::vec(1u64..30, 0..2),
        )
            .prop_map(|(number, files, blocked_by)| IssueFileOwnership {
                number,
                files,
                blocked_by,
            })
    }

    fn any_label_match() -> impl Strategy<Value = Option<LabelMatch>> {
        let labels = prop::collection::vec("(bug|feature|ops)", 0..3);
        prop_oneof![
            Just(None),
            (
                proptest::option::of(labels.clone()),
                proptest::option::of(labels)
            )
                .prop_map(|(any, all)| Some(LabelMatch { any, all })),
        ]
    }

    fn any_rule() -> impl Strategy<Value = RoutingRule> {
        (
            proptest::option::of("(org|other)/(\\*|\\*\\*|app)"),
            any_label_match(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(repo, labels, negate, enabled)| RoutingRule {
                name: None,
                criteria: MatchCriteria {
                    repo,
                    labels,
                    issue_type: None,
                    negate,
                },
                action: RoutingAction {
                    project_number: Some(1),
                    ..Default::default()
                },
                enabled,
            })
    }

    fn any_issue_context() -> impl Strategy<Value = IssueContext> {
        (
            "(org|other)/(app|lib/core)",
            prop::collection::vec("(bug|feature|ops)", 0..3),
        )
            .prop_map(|(repo, labels)| IssueContext {
                repo,
                labels,
                issue_type: None,
            })
    }

    // ===== STATE MACHINE =====

    proptest! {
        /// Property: a transition is valid exactly when it is listed for the source state
        #[test]
        fn test_transition_validity_matches_table(
            from in any_workflow_state(),
            to in any_workflow_state()
        ) {
            let sm = StateMachine::canonical();
            let listed = sm.allowed_transitions(from).contains(&to);
            prop_assert_eq!(sm.is_valid_transition(from, to), listed);
            prop_assert_eq!(sm.is_valid_transition_str(from.as_str(), to.as_str()), listed);
        }

        /// Property: terminal states have no way out
        #[test]
        fn test_terminal_states_are_dead_ends(from in any_workflow_state(), to in any_workflow_state()) {
            let sm = StateMachine::canonical();
            if sm.is_terminal(from) {
                prop_assert!(!sm.is_valid_transition(from, to));
            }
        }

        /// Property: escalation is available from every command
        #[test]
        fn test_escalate_resolves_for_every_command(cmd in any_command()) {
            let resolved = StateMachine::canonical()
                .resolve_state(SemanticIntent::Escalate.token(), cmd.as_str())
                .unwrap();
            prop_assert_eq!(resolved.resolved_state, WorkflowState::HumanNeeded);
            prop_assert!(resolved.was_intent);
        }

        /// Property: an accepted direct state is always a valid output of the command
        #[test]
        fn test_direct_resolution_respects_outputs(
            cmd in any_command(),
            state in any_workflow_state()
        ) {
            let sm = StateMachine::canonical();
            match sm.resolve_state(state.as_str(), cmd.as_str()) {
                Ok(resolved) => {
                    prop_assert_eq!(resolved.resolved_state, state);
                    prop_assert!(sm.valid_direct_states(cmd).contains(&state));
                }
                Err(e) => prop_assert_eq!(e.code(), "INVALID_DIRECT_STATE"),
            }
        }

        /// Property: resolution is deterministic
        #[test]
        fn test_resolve_state_is_idempotent(input in "(__[A-Z]{3,8}__|[A-Za-z ]{0,16})", cmd in any_command()) {
            let sm = StateMachine::canonical();
            let first = sm.resolve_state(&input, cmd.as_str()).map_err(|e| e.to_string());
            let second = sm.resolve_state(&input, cmd.as_str()).map_err(|e| e.to_string());
            prop_assert_eq!(first, second);
        }
    }

    // ===== WORK STREAMS =====

    proptest! {
        /// Property: input order never changes the clustering
        #[test]
        fn test_work_streams_permutation_invariant(
            issues in prop::collection::vec(any_ownership(), 0..12),
            seed in any::<u64>()
        ) {
            let mut shuffled = issues.clone();
            // deterministic Fisher-Yates driven by the seed
            let mut state = seed;
            for i in (1..shuffled.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                shuffled.swap(i, j);
            }
            prop_assert_eq!(detect_work_streams(&issues), detect_work_streams(&shuffled));
        }

        /// Property: every distinct issue lands in exactly one stream
        #[test]
        fn test_work_streams_partition_issues(issues in prop::collection::vec(any_ownership(), 0..12)) {
            let result = detect_work_streams(&issues);
            let mut seen: Vec<u64> = result.streams.iter().flat_map(|s| s.issues.clone()).collect();
            seen.sort_unstable();
            let mut expected: Vec<u64> = issues.iter().map(|i| i.number).collect();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(seen, expected);
            prop_assert_eq!(result.total_streams, result.streams.len());
        }

        /// Property: two issues naming the same file share a stream
        #[test]
        fn test_shared_file_implies_same_stream(issues in prop::collection::vec(any_ownership(), 0..12)) {
            let result = detect_work_streams(&issues);
            for a in &issues {
                for b in &issues {
                    if a.files.iter().any(|f| b.files.contains(f)) {
                        let stream = result.streams.iter().find(|s| s.contains(a.number));
                        prop_assert!(stream.map(|s| s.contains(b.number)).unwrap_or(false));
                    }
                }
            }
        }

        /// Property: detection is idempotent
        #[test]
        fn test_work_streams_idempotent(issues in prop::collection::vec(any_ownership(), 0..12)) {
            prop_assert_eq!(detect_work_streams(&issues), detect_work_streams(&issues));
        }
    }

    // ===== PIPELINE =====

    proptest! {
        /// Property: any input yields a position whose remaining phases match the phase
        #[test]
        fn test_pipeline_always_decides(
            issues in prop::collection::vec(any_issue_state(), 0..10),
            is_group in any::<bool>()
        ) {
            let pos = detect_pipeline_position(&issues, is_group, issues.first().map(|i| i.number));
            let expected: Vec<String> =
                pos.phase.remaining_phases().iter().map(|p| p.to_string()).collect();
            prop_assert_eq!(&pos.remaining_phases, &expected);
            prop_assert_eq!(pos.convergence.required, is_group);
            prop_assert!(pos.suggested_roster.validator == 1 && pos.suggested_roster.integrator == 1);
        }

        /// Property: convergence is met only when nothing blocks
        #[test]
        fn test_met_means_no_blockers(issues in prop::collection::vec(any_issue_state(), 0..10)) {
            let pos = detect_pipeline_position(&issues, true, None);
            if pos.convergence.met {
                prop_assert!(pos.convergence.blocking.is_empty());
                prop_assert_ne!(pos.phase, PipelinePhase::Research);
            }
        }

        /// Property: any oversized issue without sub-issues forces SPLIT
        #[test]
        fn test_needs_split_dominates(issues in prop::collection::vec(any_issue_state(), 1..10)) {
            let pos = detect_pipeline_position(&issues, issues.len() > 1, None);
            if issues.iter().any(|i| i.needs_split()) {
                prop_assert_eq!(pos.phase, PipelinePhase::Split);
            }
        }

        /// Property: detection is idempotent
        #[test]
        fn test_pipeline_idempotent(issues in prop::collection::vec(any_issue_state(), 0..10)) {
            prop_assert_eq!(
                detect_pipeline_position(&issues, true, Some(1)),
                detect_pipeline_position(&issues, true, Some(1))
            );
        }
    }

    // ===== ROUTING =====

    proptest! {
        /// Property: stop-on-first-match returns the first of the full match list
        #[test]
        fn test_first_match_is_prefix_of_all_matches(
            rules in prop::collection::vec(any_rule(), 0..6),
            issue in any_issue_context()
        ) {
            let first = evaluate_rules(
                &RoutingConfig { version: 1, stop_on_first_match: true, rules: rules.clone() },
                &issue,
            );
            let all = evaluate_rules(
                &RoutingConfig { version: 1, stop_on_first_match: false, rules },
                &issue,
            );
            prop_assert!(first.matched_rules.len() <= 1);
            prop_assert_eq!(first.matched_rules.first(), all.matched_rules.first());
            prop_assert!(all.matched_rules.iter().all(|m| m.rule.enabled));
        }

        /// Property: evaluation is idempotent
        #[test]
        fn test_routing_idempotent(
            rules in prop::collection::vec(any_rule(), 0..6),
            issue in any_issue_context()
        ) {
            let config = RoutingConfig { version: 1, stop_on_first_match: false, rules };
            prop_assert_eq!(evaluate_rules(&config, &issue), evaluate_rules(&config, &issue));
        }
    }
}
