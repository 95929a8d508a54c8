use crate::index::IndexQuery;
use crate::lexicon::Lexicon;
use crate::query::planner::{PlanStep, QueryPlan};
use crate::query::spec::{SearchCondition, SearchSpec};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Runs search plans against one lexicon
pub struct SearchExecutor<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> SearchExecutor<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Plan and run a search.
    ///
    /// Results carry no duplicates. They are alphabetical, or in probability
    /// order when a rank window was applied. Graph matches spell letters
    /// filled in by wildcards in lower case unless `all_caps` is set.
    pub fn execute(&self, spec: &SearchSpec, all_caps: bool) -> Vec<String> {
        let plan = QueryPlan::from_spec(spec, self.lexicon.has_index());
        let mut results = self.run(&plan);
        if all_caps {
            for word in &mut results {
                word.make_ascii_uppercase();
            }
        }
        results
    }

    fn run(&self, plan: &QueryPlan) -> Vec<String> {
        let mut current: Option<Vec<String>> = None;

        for step in &plan.steps {
            let next = match step {
                PlanStep::Empty => return Vec::new(),
                PlanStep::GraphSearch(conditions) => self.lexicon.graph().search_marked(conditions),
                PlanStep::IndexSearch(conditions) => self.index_search(conditions, current.as_deref()),
                PlanStep::LocalFilter(conditions) => current
                    .take()
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|word| self.matches_local(word, conditions))
                    .collect(),
                PlanStep::Union(branches) => {
                    let mut merged: Vec<String> =
                        branches.iter().flat_map(|branch| self.run(branch)).collect();
                    merged.sort_by_cached_key(|word| word.to_ascii_uppercase());
                    merged.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
                    merged
                }
                PlanStep::RankWindow(window) => {
                    window.apply(current.take().unwrap_or_default(), self.lexicon.bag())
                }
            };

            debug!(step = step_name(step), results = next.len(), "search step");
            if next.is_empty() {
                return next;
            }
            current = Some(next);
        }

        current.unwrap_or_default()
    }

    /// Index phase; the graph stays the authority on which words exist
    fn index_search(&self, conditions: &[SearchCondition], candidates: Option<&[String]>) -> Vec<String> {
        let Some(index) = self.lexicon.index() else {
            return Vec::new();
        };

        let query = IndexQuery::from_conditions(conditions);
        let rows = match index.search(&query, candidates) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "attribute index search failed");
                return Vec::new();
            }
        };

        match candidates {
            Some(candidates) => {
                let by_upper: FxHashMap<String, &String> = candidates
                    .iter()
                    .map(|word| (word.to_ascii_uppercase(), word))
                    .collect();
                rows.iter()
                    .filter_map(|row| by_upper.get(&row.to_ascii_uppercase()))
                    .map(|word| (*word).clone())
                    .collect()
            }
            None => rows
                .into_iter()
                .filter(|row| self.lexicon.is_acceptable(row))
                .collect(),
        }
    }

    fn matches_local(&self, word: &str, conditions: &[SearchCondition]) -> bool {
        let upper = word.to_ascii_uppercase();
        conditions.iter().all(|condition| match condition {
            SearchCondition::Prefix { prefix, negated } => {
                self.lexicon.is_acceptable(&format!("{prefix}{upper}")) != *negated
            }
            SearchCondition::Suffix { suffix, negated } => {
                self.lexicon.is_acceptable(&format!("{upper}{suffix}")) != *negated
            }
            SearchCondition::BelongToGroup { set, negated } => {
                self.lexicon.is_set_member(&upper, *set) != *negated
            }
            _ => true,
        })
    }
}

fn step_name(step: &PlanStep) -> &'static str {
    match step {
        PlanStep::GraphSearch(_) => "graph",
        PlanStep::IndexSearch(_) => "index",
        PlanStep::LocalFilter(_) => "local",
        PlanStep::Union(_) => "union",
        PlanStep::RankWindow(_) => "window",
        PlanStep::Empty => "empty",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, SqliteIndex};
    use crate::query::spec::{SearchSet, ValueRange};
    use crate::utils::EngineConfig;
    use std::sync::Arc;

    fn lexicon(words: &[&str]) -> Lexicon {
        let mut lexicon = Lexicon::new("TEST", &EngineConfig::default()).unwrap();
        lexicon.import_words(words.iter().map(|w| w.to_string()));
        lexicon
    }

    fn indexed(words: &[&str]) -> Lexicon {
        let mut lexicon = lexicon(words);
        let index = SqliteIndex::open_in_memory().unwrap();
        IndexBuilder::new(lexicon.graph(), lexicon.bag().clone())
            .write_to(&index)
            .unwrap();
        lexicon.attach_index(Arc::new(index));
        lexicon
    }

    fn run(lexicon: &Lexicon, spec: SearchSpec) -> Vec<String> {
        SearchExecutor::new(lexicon).execute(&spec, true)
    }

    #[test]
    fn test_graph_only_search() {
        let lex = lexicon(&["CAT", "COT", "CUT", "CATS"]);
        let results = run(&lex, SearchSpec::new().with(SearchCondition::pattern("C?T")));
        assert_eq!(results, vec!["CAT", "COT", "CUT"]);
    }

    #[test]
    fn test_wide_pattern_same_with_and_without_index() {
        let words = ["CAT", "BATS", "ATE", "DOG", "SPAT"];
        let spec = SearchSpec::new().with(SearchCondition::pattern("*AT*"));
        let plain = run(&lexicon(&words), spec.clone());
        let with_index = run(&indexed(&words), spec);
        assert_eq!(plain, vec!["ATE", "BATS", "CAT", "SPAT"]);
        assert_eq!(plain, with_index);
    }

    #[test]
    fn test_literal_sql_wildcards_same_with_and_without_index() {
        let words = ["CAT", "DOG", "EAT"];
        for pattern in ["*_*", "*%*", "*A_*", "*\\*"] {
            let spec = SearchSpec::new().with(SearchCondition::pattern(pattern));
            let plain = run(&lexicon(&words), spec.clone());
            let with_index = run(&indexed(&words), spec);
            assert!(plain.is_empty(), "{}", pattern);
            assert_eq!(plain, with_index, "{}", pattern);
        }
    }

    #[test]
    fn test_graph_then_index_phase() {
        let lex = indexed(&["EAT", "ATE", "TEA", "EATS", "TAE"]);
        let spec = SearchSpec::new()
            .with(SearchCondition::anagram("AET"))
            .with(SearchCondition::in_set(SearchSet::BackHooks).negate());
        assert_eq!(run(&lex, spec), vec!["ATE", "EAT", "TAE", "TEA"]);

        let spec = SearchSpec::new()
            .with(SearchCondition::pattern("????"))
            .with(SearchCondition::in_set(SearchSet::BackHooks));
        assert_eq!(run(&lex, spec), vec!["EATS"]);
    }

    #[test]
    fn test_index_conditions_without_index_are_empty() {
        let lex = lexicon(&["CAT", "DOG"]);
        let spec = SearchSpec::new().with(SearchCondition::NumVowels(ValueRange::exact(1)));
        assert!(run(&lex, spec).is_empty());
    }

    #[test]
    fn test_prefix_and_suffix_filters() {
        let lex = lexicon(&["AT", "CAT", "ATE", "BAT"]);
        let spec = SearchSpec::new()
            .with(SearchCondition::pattern("??"))
            .with(SearchCondition::Prefix {
                prefix: "c".to_string(),
                negated: false,
            });
        assert_eq!(run(&lex, spec), vec!["AT"]);

        let spec = SearchSpec::new()
            .with(SearchCondition::pattern("?AT"))
            .with(SearchCondition::Suffix {
                suffix: "E".to_string(),
                negated: true,
            });
        assert_eq!(run(&lex, spec), vec!["BAT", "CAT"]);
    }

    #[test]
    fn test_disjunction_union() {
        let lex = lexicon(&["CAT", "COT", "EAT", "TEA", "DOG"]);
        let spec = SearchSpec::new()
            .with(SearchCondition::anagram("TEA"))
            .with(SearchCondition::pattern("C?T"))
            .any();
        assert_eq!(run(&lex, spec), vec!["CAT", "COT", "EAT", "TEA"]);
    }

    #[test]
    fn test_all_caps() {
        let lex = lexicon(&["cat", "cot"]);
        let spec = SearchSpec::new().with(SearchCondition::pattern("c?t"));
        let executor = SearchExecutor::new(&lex);
        assert_eq!(executor.execute(&spec, true), vec!["CAT", "COT"]);
        assert_eq!(executor.execute(&spec, false), vec!["CaT", "CoT"]);
    }

    #[test]
    fn test_wildcard_casing_survives_index_and_local_phases() {
        let lex = indexed(&["EAT", "ATE", "TEA", "EATS", "SEAT", "AT"]);
        let spec = SearchSpec::new()
            .with(SearchCondition::anagram("AT?"))
            .with(SearchCondition::NumVowels(ValueRange::exact(2)))
            .with(SearchCondition::in_set(SearchSet::BackHooks).negate());
        assert_eq!(
            SearchExecutor::new(&lex).execute(&spec, false),
            vec!["eAT", "TeA"]
        );
    }

    #[test]
    fn test_union_ignores_case_when_merging() {
        let lex = lexicon(&["CAT", "COT"]);
        let spec = SearchSpec::new()
            .with(SearchCondition::pattern("CAT"))
            .with(SearchCondition::pattern("C?T"))
            .any();
        let results = SearchExecutor::new(&lex).execute(&spec, false);
        assert_eq!(results.len(), 2);
        assert!(results[0].eq_ignore_ascii_case("CAT"));
        assert_eq!(results[1], "CoT");
    }
}
