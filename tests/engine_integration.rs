//! End-to-end tests of the word engine over a small fixture lexicon.
//!
//! Each test loads `tests/fixtures/words.txt` into a fresh engine; tests that
//! need the attribute index build one into a temporary SQLite file.

use lexdex::graph::{WordGraph, checksum};
use lexdex::index::{AttributeIndex, IndexBuilder, SqliteIndex};
use lexdex::lexicon::{Lexicon, WordEngine, import};
use lexdex::query::{SearchCondition, SearchSet, SearchSpec, ValueRange, parse_search};
use lexdex::utils::EngineConfig;
use std::path::{Path, PathBuf};

const LEXICON: &str = "FIXTURE";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_words() -> Vec<String> {
    import::read_word_list(&fixture("words.txt"))
        .unwrap()
        .into_iter()
        .map(|entry| entry.word)
        .collect()
}

fn engine() -> WordEngine {
    let engine = WordEngine::new(EngineConfig::default());
    let imported = engine
        .import_text_file(LEXICON, &fixture("words.txt"), true)
        .unwrap();
    assert_eq!(imported, 17);
    engine
}

/// Engine plus an attribute database built from the same word list
fn indexed_engine() -> (WordEngine, tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("fixture.db");

    let config = EngineConfig::default();
    let mut lexicon = Lexicon::new(LEXICON, &config).unwrap();
    lexicon.import_entries(import::read_word_list(&fixture("words.txt")).unwrap(), true);
    let index = SqliteIndex::create(&db).unwrap();
    IndexBuilder::new(lexicon.graph(), config.letter_bag().unwrap())
        .with_definitions(lexicon.definitions())
        .write_to(&index)
        .unwrap();
    drop(index);

    let engine = engine();
    engine.connect_database(LEXICON, &db).unwrap();
    (engine, dir, db)
}

fn search(engine: &WordEngine, spec: SearchSpec) -> Vec<String> {
    engine.search(LEXICON, &spec, true)
}

#[test]
fn test_membership() {
    let engine = engine();
    for word in fixture_words() {
        assert!(engine.is_acceptable(LEXICON, &word), "{word} should be acceptable");
    }
    assert!(engine.is_acceptable(LEXICON, "seating"));
    for word in ["CA", "DOG", "CATSS", ""] {
        assert!(!engine.is_acceptable(LEXICON, word), "{word} should not be acceptable");
    }
    assert_eq!(engine.num_words(LEXICON), 17);
}

#[test]
fn test_serialized_round_trip() {
    let engine = engine();
    let bytes = engine.export_graph(LEXICON).unwrap();

    let copy = WordEngine::new(EngineConfig::default());
    copy.import_serialized("COPY", &bytes, false, Some(checksum(&bytes)))
        .unwrap();
    assert_eq!(copy.num_words("COPY"), engine.num_words(LEXICON));
    for word in fixture_words() {
        assert!(copy.is_acceptable("COPY", &word));
    }
    assert_eq!(copy.num_anagrams("COPY", "TEA"), 3);
}

#[test]
fn test_corrupt_graph_rejected() {
    let engine = engine();
    let mut bytes = engine.export_graph(LEXICON).unwrap();
    let expected = checksum(&bytes);
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;

    let err = engine
        .import_serialized(LEXICON, &bytes, false, Some(expected))
        .unwrap_err();
    assert!(err.to_string().contains("checksum"));
    assert_eq!(engine.num_words(LEXICON), 17);
}

#[test]
fn test_reversed_graph_matches_forward() {
    let engine = engine();
    let mut reversed = WordGraph::new();
    reversed.import_words(
        fixture_words()
            .iter()
            .map(|w| w.chars().rev().collect::<String>()),
    );
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reversed.dawg");
    std::fs::write(&path, reversed.to_bytes().unwrap()).unwrap();
    engine.import_serialized_file("REV", &path, true, None).unwrap();

    for query in ["*AT", "*ING", "C?T", "*A*"] {
        let spec = SearchSpec::new().with(SearchCondition::pattern(query));
        assert_eq!(
            engine.search("REV", &spec, false),
            engine.search(LEXICON, &spec, false),
            "pattern {query}"
        );
    }
    assert_eq!(
        search(&engine, SearchSpec::new().with(SearchCondition::pattern("*ING"))),
        vec!["EATING", "SEATING"]
    );
}

#[test]
fn test_pattern_search() {
    let engine = engine();
    assert_eq!(
        search(&engine, SearchSpec::new().with(SearchCondition::pattern("C?T"))),
        vec!["CAT", "COT", "CUT"]
    );

    let mut expected: Vec<String> = fixture_words()
        .into_iter()
        .filter(|w| w.contains("AT"))
        .collect();
    expected.sort();
    assert_eq!(
        search(&engine, SearchSpec::new().with(SearchCondition::pattern("*AT*"))),
        expected
    );
}

#[test]
fn test_wide_pattern_through_index() {
    let (engine, _dir, _db) = indexed_engine();
    let plain = self::engine();
    let spec = SearchSpec::new().with(SearchCondition::pattern("*AT*"));
    assert_eq!(search(&engine, spec.clone()), search(&plain, spec));
}

#[test]
fn test_anagram_search() {
    let engine = engine();
    assert_eq!(
        search(&engine, SearchSpec::new().with(SearchCondition::anagram("TEA"))),
        vec!["ATE", "EAT", "TEA"]
    );
    assert_eq!(
        search(&engine, SearchSpec::new().with(SearchCondition::subanagram("STAE"))),
        vec!["AT", "ATE", "EAT", "EATS", "TEA"]
    );
}

#[test]
fn test_probability_window() {
    let mut config = EngineConfig {
        letter_distribution: "A:10 B:9 C:8 D:7 E:6 F:5 G:4 H:3 I:2 J:1 K:1 _:0".to_string(),
        ..EngineConfig::default()
    };
    let words = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
    let spec = SearchSpec::new()
        .with(SearchCondition::pattern("?"))
        .with(SearchCondition::limit(3, 5, false));

    let engine = WordEngine::new(config.clone());
    engine.import_words(LEXICON, words).unwrap();
    assert_eq!(search(&engine, spec.clone()), vec!["C", "D", "E"]);

    // K draws as often as E, so the fifth place is shared. A lax edge takes
    // in the tie; a strict edge holds.
    config.letter_distribution = "A:10 B:9 C:8 D:7 E:6 F:5 G:4 H:3 I:2 J:1 K:6 _:0".to_string();
    let engine = WordEngine::new(config);
    engine.import_words(LEXICON, words).unwrap();
    engine.import_words(LEXICON, ["K"]).unwrap();
    assert_eq!(search(&engine, spec), vec!["C", "D", "E"]);

    let lax = SearchSpec::new()
        .with(SearchCondition::pattern("?"))
        .with(SearchCondition::limit(3, 5, true));
    assert_eq!(search(&engine, lax), vec!["C", "D", "E", "K"]);
}

#[test]
fn test_hooks() {
    let engine = engine();
    assert_eq!(engine.back_hook_letters(LEXICON, "CAT"), "s");
    assert_eq!(engine.front_hook_letters(LEXICON, "CAT"), "s");
    assert!(engine.is_set_member(LEXICON, "CATS", SearchSet::BackHooks));
    assert!(!engine.is_set_member(LEXICON, "CAT", SearchSet::BackHooks));

    let spec = SearchSpec::new()
        .with(SearchCondition::pattern("????"))
        .with(SearchCondition::in_set(SearchSet::BackHooks));
    assert_eq!(search(&engine, spec), vec!["CATS", "EATS"]);
}

#[test]
fn test_hooks_through_index() {
    let (engine, _dir, _db) = indexed_engine();
    assert_eq!(engine.back_hook_letters(LEXICON, "CAT"), "s");
    assert!(engine.is_back_hook(LEXICON, "CATS"));
    assert!(!engine.is_back_hook(LEXICON, "CAT"));

    let spec = SearchSpec::new()
        .with(SearchCondition::anagram("AET"))
        .with(SearchCondition::in_set(SearchSet::FrontHooks));
    assert_eq!(search(&engine, spec), vec!["EAT"]);

    let spec = SearchSpec::new().with(SearchCondition::in_set(SearchSet::HookWords));
    assert_eq!(
        search(&engine, spec),
        vec!["ATE", "CAT", "CATS", "EAT", "EATS", "SCAT", "SEATING"]
    );
}

#[test]
fn test_readding_is_idempotent() {
    let engine = engine();
    let before: Vec<bool> = SearchSet::ALL
        .iter()
        .map(|set| engine.is_set_member(LEXICON, "CATS", *set))
        .collect();
    engine.import_words(LEXICON, ["CAT", "CATS"]).unwrap();
    let after: Vec<bool> = SearchSet::ALL
        .iter()
        .map(|set| engine.is_set_member(LEXICON, "CATS", *set))
        .collect();
    assert_eq!(engine.num_words(LEXICON), 17);
    assert_eq!(before, after);
    assert_eq!(engine.num_anagrams(LEXICON, "ACT"), 1);
}

#[test]
fn test_cache_matches_index() {
    let (engine, _dir, db) = indexed_engine();
    let results = search(&engine, SearchSpec::new().with(SearchCondition::anagram("AET")));
    assert_eq!(results, vec!["ATE", "EAT", "TEA"]);

    let direct = SqliteIndex::open(&db).unwrap();
    for word in &results {
        let uncached = direct.word_info(word).unwrap().unwrap();
        assert_eq!(engine.word_info(LEXICON, word), uncached);
    }
}

#[test]
fn test_index_phase_conditions() {
    let (engine, _dir, _db) = indexed_engine();

    let spec = SearchSpec::new()
        .with(SearchCondition::length(3, 3))
        .with(SearchCondition::NumVowels(ValueRange::exact(2)));
    assert_eq!(search(&engine, spec), vec!["ATE", "EAT", "TEA"]);

    let spec = SearchSpec::new()
        .with(SearchCondition::pattern("C?T"))
        .with(SearchCondition::IncludeLetters {
            letters: "o".to_string(),
            negated: true,
        });
    assert_eq!(search(&engine, spec), vec!["CAT", "CUT"]);

    let spec = SearchSpec::new().with(SearchCondition::NumAnagrams(ValueRange::at_least(3)));
    assert_eq!(search(&engine, spec), vec!["ATE", "EAT", "TEA"]);

    // Without a database the same conditions find nothing
    let plain = self::engine();
    let spec = SearchSpec::new().with(SearchCondition::NumVowels(ValueRange::exact(2)));
    assert!(search(&plain, spec).is_empty());
}

#[test]
fn test_disjunction() {
    let engine = engine();
    let spec = parse_search("anagram:TEA | pattern:C?T").unwrap();
    assert_eq!(search(&engine, spec), vec!["ATE", "CAT", "COT", "CUT", "EAT", "TEA"]);

    // Word lists bind every branch; they need the attribute index
    let spec = parse_search("anagram:TEA | pattern:C?T list:CAT,EAT,DOG").unwrap();
    assert!(search(&engine, spec.clone()).is_empty());
    let (indexed, _dir, _db) = indexed_engine();
    assert_eq!(search(&indexed, spec), vec!["CAT", "EAT"]);
}

#[test]
fn test_definitions() {
    let engine = engine();
    assert_eq!(
        engine.definition(LEXICON, "CAT", false).unwrap(),
        "a small feline [n CATS] / to vomit [v CATTED, CATTING, CATS]"
    );
    assert_eq!(
        engine.definition(LEXICON, "KITTY", true).unwrap(),
        "CAT, a small feline [n CATS] [n KITTIES]"
    );
    assert!(engine.definition(LEXICON, "EATING", false).is_none());
}

#[test]
fn test_stem_sets() {
    let engine = engine();
    assert_eq!(engine.import_stems(LEXICON, &fixture("stems6.txt")).unwrap(), 2);
    assert_eq!(engine.import_stems(LEXICON, &fixture("stems7.txt")).unwrap(), 1);

    assert!(engine.is_set_member(LEXICON, "BAITERS", SearchSet::TypeOneSevens));
    assert!(engine.is_set_member(LEXICON, "STRAINED", SearchSet::EightsFromSevenLetterStems));
    assert!(engine.is_set_member(LEXICON, "STRAINED", SearchSet::TypeOneEights));
    assert!(engine.is_set_member(LEXICON, "TOENAIL", SearchSet::TypeTwoSevens));

    let spec = parse_search("set:type-one-sevens").unwrap();
    assert_eq!(search(&engine, spec), vec!["BAITERS"]);

    let spec = parse_search("set:high-fives").unwrap();
    assert_eq!(search(&engine, spec), vec!["HEART", "KITTY"]);
}

#[test]
fn test_word_list_search() {
    let engine = engine();
    let spec = parse_search("list:cat,eat,zzz,tea anagrams:2-").unwrap();
    assert_eq!(engine.word_list_search(LEXICON, &spec), vec!["EAT", "TEA"]);
}
