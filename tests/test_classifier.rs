//! Property-style tests for the ballot classifier

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use slate_stats::pipeline::{Category, SlateClassifier, SlateTable};

fn random_name(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..12);
    (0..len)
        .map(|_| *[b'a', b'Z', b' ', b'&', b'.', b'7'].choose(rng).unwrap() as char)
        .collect()
}

#[test]
fn test_classifier_is_total_and_deterministic() {
    let classifier = SlateClassifier::builtin().unwrap();
    let table = SlateTable::builtin().unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    let mut known: Vec<String> = table.left.clone();
    known.extend(table.moderate.clone());
    known.push("Aaron Berger".to_string());

    for _ in 0..2000 {
        let first = if rng.gen_bool(0.5) {
            known.choose(&mut rng).unwrap().clone()
        } else {
            random_name(&mut rng)
        };
        let second = if rng.gen_bool(0.5) {
            Some(random_name(&mut rng))
        } else {
            None
        };

        let a = classifier.classify(&first, second.as_deref());
        let b = classifier.classify(&first, second.as_deref());
        assert_eq!(a, b, "Classification of {:?} must be deterministic", first);
    }
}

#[test]
fn test_every_listed_slate_resolves_to_its_category() {
    let classifier = SlateClassifier::builtin().unwrap();
    let table = SlateTable::builtin().unwrap();

    for name in &table.left {
        assert_eq!(classifier.classify(name, None), Category::Left, "{}", name);
    }
    for name in &table.moderate {
        assert_eq!(classifier.classify(name, None), Category::Moderate, "{}", name);
    }
}

#[test]
fn test_tie_break_uses_second_choice() {
    let classifier = SlateClassifier::builtin().unwrap();
    let table = SlateTable::builtin().unwrap();
    let rule = table.tie_break.as_ref().unwrap();

    for name in &rule.left {
        assert_eq!(
            classifier.classify(&rule.candidate, Some(name)),
            Category::Left
        );
    }
    for name in &rule.moderate {
        assert_eq!(
            classifier.classify(&rule.candidate, Some(name)),
            Category::Moderate
        );
    }
    assert_eq!(
        classifier.classify(&rule.candidate, None),
        Category::Excluded
    );
    assert_eq!(
        classifier.classify(&rule.candidate, Some("Somebody Else")),
        Category::Excluded
    );
}

#[test]
fn test_unknown_slates_are_excluded() {
    let classifier = SlateClassifier::builtin().unwrap();

    assert_eq!(classifier.classify("Write-In", None), Category::Excluded);
    assert_eq!(classifier.classify("", None), Category::Excluded);
    assert_eq!(classifier.classify("red star", None), Category::Excluded);
}
