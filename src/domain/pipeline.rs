//! Pipeline position detection
//!
//! Given the current states of one issue or a group of related issues,
//! decide which phase of work applies next, whether the group has converged
//! enough to advance together, and how many workers of each role to staff.
//!
//! The decision is a priority-ordered table (`PHASE_RULES`). The first rule
//! that fires wins; later rules are never consulted.

use serde::{Deserialize, Serialize};

use crate::schemas::{IssueState, WorkflowState};

use super::work_streams::WorkStream;

/// Phase of work a set of issues is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelinePhase {
    Split,
    Triage,
    Research,
    Plan,
    Review,
    HumanGate,
    Implement,
    Terminal,
}

impl PipelinePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelinePhase::Split => "SPLIT",
            PipelinePhase::Triage => "TRIAGE",
            PipelinePhase::Research => "RESEARCH",
            PipelinePhase::Plan => "PLAN",
            PipelinePhase::Review => "REVIEW",
            PipelinePhase::HumanGate => "HUMAN_GATE",
            PipelinePhase::Implement => "IMPLEMENT",
            PipelinePhase::Terminal => "TERMINAL",
        }
    }

    /// Steps still ahead once this phase is done
    pub fn remaining_phases(&self) -> &'static [&'static str] {
        match self {
            PipelinePhase::Split => &[
                "triage", "research", "plan", "review", "implement", "pr", "merge",
            ],
            PipelinePhase::Triage => &["research", "plan", "review", "implement", "pr", "merge"],
            PipelinePhase::Research => &["plan", "review", "implement", "pr", "merge"],
            PipelinePhase::Plan => &["review", "implement", "pr", "merge"],
            PipelinePhase::Review => &["implement", "pr", "merge"],
            PipelinePhase::Implement => &["pr", "merge"],
            PipelinePhase::HumanGate | PipelinePhase::Terminal => &[],
        }
    }

    fn staffs_analysts(&self) -> bool {
        matches!(
            self,
            PipelinePhase::Research | PipelinePhase::Split | PipelinePhase::Triage
        )
    }
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Proceed,
    Wait,
    Escalate,
}

/// An issue holding the group back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingIssue {
    pub number: u64,
    pub title: String,
    pub workflow_state: String,
}

impl From<&IssueState> for BlockingIssue {
    fn from(issue: &IssueState) -> Self {
        BlockingIssue {
            number: issue.number,
            title: issue.title.clone(),
            workflow_state: issue.workflow_state.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Convergence {
    /// Whether the issues must advance together
    pub required: bool,
    pub met: bool,
    pub blocking: Vec<BlockingIssue>,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestedRoster {
    pub analyst: u32,
    pub builder: u32,
    pub validator: u32,
    pub integrator: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePosition {
    pub phase: PipelinePhase,
    pub reason: String,
    pub remaining_phases: Vec<String>,
    pub convergence: Convergence,
    pub suggested_roster: SuggestedRoster,
    pub is_group: bool,
    pub group_primary: Option<u64>,
}

struct PhaseContext<'a> {
    issues: &'a [IssueState],
}

impl PhaseContext<'_> {
    fn count(&self) -> usize {
        self.issues.len()
    }

    fn matching(&self, pred: impl Fn(&IssueState) -> bool) -> Vec<&IssueState> {
        self.issues.iter().filter(|&i| pred(i)).collect()
    }

    fn in_any(&self, states: &[WorkflowState]) -> Vec<&IssueState> {
        self.matching(|i| i.state().map(|s| states.contains(&s)).unwrap_or(false))
    }

    fn not_in(&self, states: &[WorkflowState]) -> Vec<&IssueState> {
        self.matching(|i| !i.state().map(|s| states.contains(&s)).unwrap_or(false))
    }

    fn all_in(&self, states: &[WorkflowState]) -> bool {
        !self.issues.is_empty() && self.not_in(states).is_empty()
    }
}

/// What a rule decided, before convergence and staffing are attached
struct PhaseDecision {
    phase: PipelinePhase,
    reason: String,
    blocking: Vec<BlockingIssue>,
}

impl PhaseDecision {
    fn converged(phase: PipelinePhase, reason: String) -> Self {
        PhaseDecision {
            phase,
            reason,
            blocking: Vec::new(),
        }
    }

    fn blocked_by(phase: PipelinePhase, reason: String, blocking: &[&IssueState]) -> Self {
        PhaseDecision {
            phase,
            reason,
            blocking: blocking.iter().map(|i| BlockingIssue::from(*i)).collect(),
        }
    }
}

/// One row of the phase decision table
pub struct PhaseRule {
    pub name: &'static str,
    decide: fn(&PhaseContext<'_>) -> Option<PhaseDecision>,
}

/// Phase rules in priority order
pub const PHASE_RULES: &[PhaseRule] = &[
    PhaseRule { name: "empty", decide: rule_empty },
    PhaseRule { name: "needs-split", decide: rule_needs_split },
    PhaseRule { name: "unknown-state", decide: rule_unknown_state },
    PhaseRule { name: "research", decide: rule_research },
    PhaseRule { name: "all-ready-for-plan", decide: rule_all_ready_for_plan },
    PhaseRule { name: "plan-in-progress", decide: rule_plan_in_progress },
    PhaseRule { name: "all-plan-in-review", decide: rule_all_plan_in_review },
    PhaseRule { name: "some-plan-in-review", decide: rule_some_plan_in_review },
    PhaseRule { name: "in-progress", decide: rule_in_progress },
    PhaseRule { name: "all-terminal", decide: rule_all_terminal },
    PhaseRule { name: "human-needed", decide: rule_human_needed },
    PhaseRule { name: "backlog", decide: rule_backlog },
    PhaseRule { name: "fallback", decide: rule_fallback },
];

fn numbers(issues: &[&IssueState]) -> String {
    issues
        .iter()
        .map(|i| format!("#{}", i.number))
        .collect::<Vec<_>>()
        .join(", ")
}

fn rule_empty(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    if ctx.count() > 0 {
        return None;
    }
    Some(PhaseDecision::converged(
        PipelinePhase::Triage,
        "No issues provided; defaulting to triage".to_string(),
    ))
}

fn rule_needs_split(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let oversized = ctx.matching(|i| i.needs_split());
    if oversized.is_empty() {
        return None;
    }
    Some(PhaseDecision::blocked_by(
        PipelinePhase::Split,
        format!(
            "{} estimated M or larger with no sub-issues; split before continuing",
            numbers(&oversized)
        ),
        &oversized,
    ))
}

fn rule_unknown_state(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let unknown = ctx.matching(|i| i.state().is_none());
    if unknown.is_empty() {
        return None;
    }
    Some(PhaseDecision::blocked_by(
        PipelinePhase::Triage,
        format!(
            "{} {} no recognized workflow state; triage required",
            numbers(&unknown),
            if unknown.len() == 1 { "has" } else { "have" }
        ),
        &unknown,
    ))
}

fn rule_research(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let researching = ctx.in_any(&[
        WorkflowState::ResearchNeeded,
        WorkflowState::ResearchInProgress,
    ]);
    if researching.is_empty() {
        return None;
    }
    Some(PhaseDecision::blocked_by(
        PipelinePhase::Research,
        format!(
            "{} of {} issues still in research ({})",
            researching.len(),
            ctx.count(),
            numbers(&researching)
        ),
        &researching,
    ))
}

fn rule_all_ready_for_plan(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    if !ctx.all_in(&[WorkflowState::ReadyForPlan]) {
        return None;
    }
    Some(PhaseDecision::converged(
        PipelinePhase::Plan,
        format!("All {} issues ready for planning", ctx.count()),
    ))
}

fn rule_plan_in_progress(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let planning = ctx.in_any(&[WorkflowState::PlanInProgress]);
    if planning.is_empty() {
        return None;
    }
    Some(PhaseDecision::blocked_by(
        PipelinePhase::Review,
        format!("Plan in progress for {}", numbers(&planning)),
        &planning,
    ))
}

fn rule_all_plan_in_review(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    if !ctx.all_in(&[WorkflowState::PlanInReview]) {
        return None;
    }
    Some(PhaseDecision::converged(
        PipelinePhase::HumanGate,
        format!("All {} issues have plans awaiting human approval", ctx.count()),
    ))
}

fn rule_some_plan_in_review(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let in_review = ctx.in_any(&[WorkflowState::PlanInReview]);
    if in_review.is_empty() {
        return None;
    }
    let rest = ctx.not_in(&[WorkflowState::PlanInReview]);
    Some(PhaseDecision::blocked_by(
        PipelinePhase::Review,
        format!(
            "{} of {} issues in plan review; waiting on {}",
            in_review.len(),
            ctx.count(),
            numbers(&rest)
        ),
        &rest,
    ))
}

fn rule_in_progress(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let building = ctx.in_any(&[WorkflowState::InProgress]);
    if building.is_empty() {
        return None;
    }
    let behind = ctx.not_in(&[
        WorkflowState::InProgress,
        WorkflowState::InReview,
        WorkflowState::Done,
        WorkflowState::Canceled,
    ]);
    Some(PhaseDecision::blocked_by(
        PipelinePhase::Implement,
        format!("Implementation in progress for {}", numbers(&building)),
        &behind,
    ))
}

fn rule_all_terminal(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    if !ctx.all_in(&[
        WorkflowState::InReview,
        WorkflowState::Done,
        WorkflowState::Canceled,
    ]) {
        return None;
    }
    Some(PhaseDecision::converged(
        PipelinePhase::Terminal,
        format!("All {} issues are in review, done or canceled", ctx.count()),
    ))
}

fn rule_human_needed(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let stuck = ctx.in_any(&[WorkflowState::HumanNeeded]);
    if stuck.is_empty() {
        return None;
    }
    Some(PhaseDecision::blocked_by(
        PipelinePhase::Terminal,
        format!("{} need human intervention", numbers(&stuck)),
        &stuck,
    ))
}

fn rule_backlog(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let backlog = ctx.in_any(&[WorkflowState::Backlog]);
    if backlog.is_empty() {
        return None;
    }
    let reason = format!("{} in Backlog need triage", numbers(&backlog));
    if backlog.len() == ctx.count() {
        return Some(PhaseDecision::converged(PipelinePhase::Triage, reason));
    }
    Some(PhaseDecision::blocked_by(PipelinePhase::Triage, reason, &backlog))
}

fn rule_fallback(ctx: &PhaseContext<'_>) -> Option<PhaseDecision> {
    let ready = ctx.in_any(&[WorkflowState::ReadyForPlan]);
    if ready.is_empty() {
        return Some(PhaseDecision::converged(
            PipelinePhase::Triage,
            "No phase matched the current states; defaulting to triage".to_string(),
        ));
    }
    let rest = ctx.not_in(&[WorkflowState::ReadyForPlan]);
    Some(PhaseDecision::blocked_by(
        PipelinePhase::Plan,
        format!(
            "{} of {} issues ready for planning; waiting on {}",
            ready.len(),
            ctx.count(),
            numbers(&rest)
        ),
        &rest,
    ))
}

/// Staffing for a phase.
///
/// Analysts scale 1/2/3 with the number of issues still needing research
/// (≤1, ≤5, >5) and are only staffed for RESEARCH, SPLIT and TRIAGE. Two
/// builders once five or more issues are sized M or larger.
pub fn suggested_roster(phase: PipelinePhase, issues: &[IssueState]) -> SuggestedRoster {
    let analyst = if phase.staffs_analysts() {
        let needing_research = issues
            .iter()
            .filter(|i| match i.state() {
                None => true,
                Some(s) => matches!(
                    s,
                    WorkflowState::Backlog
                        | WorkflowState::ResearchNeeded
                        | WorkflowState::ResearchInProgress
                ),
            })
            .count();
        match needing_research {
            0..=1 => 1,
            2..=5 => 2,
            _ => 3,
        }
    } else {
        0
    };

    let oversized = issues.iter().filter(|i| i.is_oversized()).count();
    let builder = if oversized >= 5 { 2 } else { 1 };

    SuggestedRoster {
        analyst,
        builder,
        validator: 1,
        integrator: 1,
    }
}

fn recommendation(met: bool, blocking: &[BlockingIssue]) -> Recommendation {
    if met {
        return Recommendation::Proceed;
    }
    let escalated = blocking
        .iter()
        .any(|b| b.workflow_state == WorkflowState::HumanNeeded.as_str());
    if escalated {
        Recommendation::Escalate
    } else {
        Recommendation::Wait
    }
}

/// Decide the pipeline phase for one issue or a group of related issues.
///
/// Never fails: empty or unrecognized input lands in TRIAGE.
pub fn detect_pipeline_position(
    issues: &[IssueState],
    is_group: bool,
    group_primary: Option<u64>,
) -> PipelinePosition {
    let ctx = PhaseContext { issues };

    let (rule, decision) = PHASE_RULES
        .iter()
        .find_map(|rule| (rule.decide)(&ctx).map(|d| (rule.name, d)))
        .unwrap_or_else(|| {
            (
                "default",
                PhaseDecision::converged(PipelinePhase::Triage, String::new()),
            )
        });

    let met = decision.blocking.is_empty() && decision.phase != PipelinePhase::Research;
    let recommendation = recommendation(met, &decision.blocking);

    let reason = match (is_group, group_primary) {
        (true, Some(primary)) => format!("Group #{}: {}", primary, decision.reason),
        (true, None) => format!("Group: {}", decision.reason),
        (false, _) => decision.reason,
    };

    tracing::debug!(
        phase = %decision.phase,
        rule,
        issues = issues.len(),
        met,
        "pipeline position detected"
    );

    PipelinePosition {
        phase: decision.phase,
        reason,
        remaining_phases: decision
            .phase
            .remaining_phases()
            .iter()
            .map(|p| p.to_string())
            .collect(),
        convergence: Convergence {
            required: is_group,
            met,
            blocking: decision.blocking,
            recommendation,
        },
        suggested_roster: suggested_roster(decision.phase, issues),
        is_group,
        group_primary,
    }
}

/// Pipeline position of one work stream's members
pub fn detect_stream_position(stream: &WorkStream, issues: &[IssueState]) -> PipelinePosition {
    let members: Vec<IssueState> = issues
        .iter()
        .filter(|i| stream.contains(i.number))
        .cloned()
        .collect();
    detect_pipeline_position(&members, stream.issues.len() > 1, Some(stream.primary_issue))
}
