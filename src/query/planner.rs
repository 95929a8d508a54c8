use crate::query::probability::ProbabilityWindow;
use crate::query::spec::{SearchCondition, SearchSet, SearchSpec};
use tracing::debug;

/// Where a condition is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionPhase {
    /// Answered by walking the word graph
    Graph,
    /// Answered by the attribute index
    Index,
    /// Checked word by word after the other phases
    Local,
}

/// Phase of a single condition.
///
/// Without an attribute index, wide patterns and length fall back to the
/// graph and hook sets to local checks. Everything else that needs the index
/// stays in the index phase and makes the search come back empty.
pub fn condition_phase(condition: &SearchCondition, index_available: bool) -> ConditionPhase {
    match condition {
        SearchCondition::AnagramMatch { .. }
        | SearchCondition::SubanagramMatch { .. }
        | SearchCondition::ConsistOf { .. } => ConditionPhase::Graph,

        SearchCondition::PatternMatch { pattern, .. } => {
            if index_available && is_wide_pattern(pattern) {
                ConditionPhase::Index
            } else {
                ConditionPhase::Graph
            }
        }

        SearchCondition::Length(_) => {
            if index_available {
                ConditionPhase::Index
            } else {
                ConditionPhase::Graph
            }
        }

        SearchCondition::InWordList { .. }
        | SearchCondition::NumVowels(_)
        | SearchCondition::IncludeLetters { .. }
        | SearchCondition::ProbabilityOrder { .. }
        | SearchCondition::NumUniqueLetters(_)
        | SearchCondition::PointValue(_)
        | SearchCondition::NumAnagrams(_) => ConditionPhase::Index,

        SearchCondition::BelongToGroup { set, .. } => match set {
            SearchSet::HookWords | SearchSet::FrontHooks | SearchSet::BackHooks
                if index_available =>
            {
                ConditionPhase::Index
            }
            _ => ConditionPhase::Local,
        },

        SearchCondition::Prefix { .. }
        | SearchCondition::Suffix { .. }
        | SearchCondition::LimitByProbabilityOrder { .. } => ConditionPhase::Local,
    }
}

/// `*text*` over letters and wildcards only: a substring test the index
/// answers with `LIKE`
fn is_wide_pattern(pattern: &str) -> bool {
    pattern.len() >= 2
        && pattern.starts_with('*')
        && pattern.ends_with('*')
        && pattern
            .bytes()
            .all(|b| b.is_ascii_alphabetic() || matches!(b, b'*' | b'?' | b'.'))
}

/// Search execution plan
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub steps: Vec<PlanStep>,
}

/// Individual plan step
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    /// Walk the word graph; also carries length conditions for pruning
    GraphSearch(Vec<SearchCondition>),
    /// Query the attribute index, restricted to earlier results if any
    IndexSearch(Vec<SearchCondition>),
    /// Per-word checks on the current results
    LocalFilter(Vec<SearchCondition>),
    /// Merge results of independent sub-plans
    Union(Vec<QueryPlan>),
    /// Keep a slice of the results in probability order
    RankWindow(ProbabilityWindow),
    /// Nothing can match
    Empty,
}

impl QueryPlan {
    /// Create a plan from a search specification
    pub fn from_spec(spec: &SearchSpec, index_available: bool) -> Self {
        let planner = QueryPlanner { index_available };
        planner.plan(spec)
    }

    fn empty() -> Self {
        Self {
            steps: vec![PlanStep::Empty],
        }
    }

    /// True if the plan can only produce nothing
    pub fn is_empty(&self) -> bool {
        self.steps.iter().any(|step| matches!(step, PlanStep::Empty))
    }

    /// Rank window applied at the end, if any
    pub fn rank_window(&self) -> Option<&ProbabilityWindow> {
        self.steps.iter().find_map(|step| match step {
            PlanStep::RankWindow(window) => Some(window),
            _ => None,
        })
    }
}

struct QueryPlanner {
    index_available: bool,
}

impl QueryPlanner {
    fn plan(&self, spec: &SearchSpec) -> QueryPlan {
        if !spec.conjunction {
            let disjuncts: Vec<&SearchCondition> = spec
                .conditions
                .iter()
                .filter(|c| !c.is_word_list() && !c.is_rank_window())
                .collect();
            if !disjuncts.is_empty() {
                return self.plan_union(spec, &disjuncts);
            }
        }

        let mut plan = self.plan_conjunction(spec);
        if !plan.is_empty()
            && let Some(window) = ProbabilityWindow::from_conditions(&spec.conditions)
        {
            plan.steps.push(PlanStep::RankWindow(window));
        }
        plan
    }

    /// One AND sub-plan per disjunct, each also bound by the word lists
    fn plan_union(&self, spec: &SearchSpec, disjuncts: &[&SearchCondition]) -> QueryPlan {
        let word_lists: Vec<SearchCondition> = spec
            .conditions
            .iter()
            .filter(|c| c.is_word_list())
            .cloned()
            .collect();

        let branches: Vec<QueryPlan> = disjuncts
            .iter()
            .map(|condition| {
                let mut conditions = vec![(*condition).clone()];
                conditions.extend(word_lists.iter().cloned());
                self.plan_conjunction(&SearchSpec::from_conditions(conditions))
            })
            .filter(|branch| !branch.is_empty())
            .collect();

        if branches.is_empty() {
            return QueryPlan::empty();
        }
        debug!(branches = branches.len(), "planned disjunction");

        let mut steps = vec![PlanStep::Union(branches)];
        if let Some(window) = ProbabilityWindow::from_conditions(&spec.conditions) {
            steps.push(PlanStep::RankWindow(window));
        }
        QueryPlan { steps }
    }

    fn plan_conjunction(&self, spec: &SearchSpec) -> QueryPlan {
        let Some(optimized) = spec.optimize() else {
            debug!("conditions contradict each other");
            return QueryPlan::empty();
        };

        let mut graph = Vec::new();
        let mut index = Vec::new();
        let mut local = Vec::new();
        let mut lengths = Vec::new();

        for condition in optimized.conditions {
            if condition.is_rank_window() {
                continue;
            }
            if matches!(condition, SearchCondition::Length(_)) {
                lengths.push(condition.clone());
            }
            match condition_phase(&condition, self.index_available) {
                ConditionPhase::Graph => graph.push(condition),
                ConditionPhase::Index => index.push(condition),
                ConditionPhase::Local => local.push(condition),
            }
        }

        let has_graph_phase = graph.iter().any(|c| !matches!(c, SearchCondition::Length(_)));

        // Length alone is already enforced by the graph walk
        if has_graph_phase
            && !index.is_empty()
            && index.iter().all(|c| matches!(c, SearchCondition::Length(_)))
        {
            index.clear();
        }

        if !index.is_empty() && !self.index_available {
            debug!("index conditions without an attribute index");
            return QueryPlan::empty();
        }

        let mut steps = Vec::new();
        if has_graph_phase || index.is_empty() {
            for length in lengths {
                if !graph.contains(&length) {
                    graph.push(length);
                }
            }
            steps.push(PlanStep::GraphSearch(graph));
        }
        if !index.is_empty() {
            steps.push(PlanStep::IndexSearch(index));
        }
        if !local.is_empty() {
            steps.push(PlanStep::LocalFilter(local));
        }

        debug!(steps = steps.len(), "planned conjunction");
        QueryPlan { steps }
    }
}
