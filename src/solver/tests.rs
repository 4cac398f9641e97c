use super::*;
use crate::alphabet::Decipherment;

fn index(words: &[&str]) -> PatternIndex {
    PatternIndex::from_words(words.iter())
}

fn hello_index() -> PatternIndex {
    index(&["HELLO", "WORLD", "JELLY", "WORDS", "PLANT", "CAT"])
}

fn solve(index: &PatternIndex, message: &str, order: ExamineOrder) -> Deduction {
    Solver::new(index, SolverConfig::new(order))
        .deduce(message)
        .unwrap()
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|&w| w.to_owned()).collect()
}

/// Reference narrowing: every tuple of the full product, compared by combined pattern.
fn brute_force<'w>(encrypted: &[&str], lists: &[&[&'w str]]) -> Vec<Vec<&'w str>> {
    fn product<'w>(lists: &[&[&'w str]], prefix: &mut Vec<&'w str>, out: &mut Vec<Vec<&'w str>>) {
        if prefix.len() == lists.len() {
            out.push(prefix.clone());
            return;
        }
        for &word in lists[prefix.len()] {
            prefix.push(word);
            product(lists, prefix, out);
            prefix.pop();
        }
    }

    let mut tuples = Vec::new();
    product(lists, &mut Vec::new(), &mut tuples);

    let combined = Pattern::of(encrypted.concat());
    let mut kept: Vec<Vec<&'w str>> = vec![Vec::new(); lists.len()];
    for tuple in tuples {
        if Pattern::of(tuple.concat()) == combined {
            for (position, word) in tuple.into_iter().enumerate() {
                if !kept[position].contains(&word) {
                    kept[position].push(word);
                }
            }
        }
    }
    kept
}

#[test]
fn decodes_fully_determined_message() {
    let index = hello_index();
    for &order in &ExamineOrder::ALL {
        let deduction = solve(&index, "Xippe, Ketpq!", order);

        assert_eq!(deduction.matched, owned(&["XIPPE", "KETPQ"]), "{}", order);
        assert!(deduction.unmatched.is_empty());
        assert_eq!(deduction.alphabet.render("Xippe, Ketpq!"), "Hello, World!");

        for cipher in "XIPPEKETPQ".chars() {
            assert!(deduction.alphabet.get(cipher).unwrap().is_resolved());
        }
    }
}

#[test]
fn final_hypothesis_is_keyed_by_position() {
    let deduction = solve(&hello_index(), "xippe ketpq", ExamineOrder::LongestToShortest);
    let keys: Vec<String> = deduction
        .hypothesis
        .iter()
        .map(|(key, _)| key.to_string())
        .collect();
    assert_eq!(keys, vec!["1-5-ABCCD", "2-5-ABCDE"]);
    assert_eq!(deduction.hypothesis[0].1, owned(&["HELLO"]));
    assert_eq!(deduction.hypothesis[1].1, owned(&["WORLD"]));
}

#[test]
fn counts_visited_tuples() {
    // HELLO and JELLY, each tried against WORLD, WORDS and PLANT.
    let deduction = solve(&hello_index(), "xippe ketpq", ExamineOrder::LongestToShortest);
    assert_eq!(deduction.tuples_compared, 8);
}

#[test]
fn tuple_ceiling_is_enforced() {
    let index = hello_index();
    let config = SolverConfig::new(ExamineOrder::LongestToShortest).with_max_tuples_per_step(Some(7));
    match Solver::new(&index, config).deduce("xippe ketpq") {
        Err(DeduceError::TupleLimitExceeded { word, limit }) => {
            assert_eq!(word, "KETPQ");
            assert_eq!(limit, 7);
        }
        other => panic!("expected tuple limit error, got {:?}", other),
    }

    let config = SolverConfig::new(ExamineOrder::LongestToShortest).with_max_tuples_per_step(Some(8));
    assert!(Solver::new(&index, config).deduce("xippe ketpq").is_ok());

    let config = SolverConfig::new(ExamineOrder::LongestToShortest).with_max_tuples_per_step(None);
    assert!(Solver::new(&index, config).deduce("xippe ketpq").is_ok());
}

#[test]
fn symmetric_words_stay_ambiguous() {
    let index = index(&["FOX", "DOG"]);
    let deduction = solve(&index, "qrs tru", ExamineOrder::LongestToShortest);

    assert_eq!(deduction.hypothesis[0].1, owned(&["FOX", "DOG"]));
    assert_eq!(deduction.hypothesis[1].1, owned(&["DOG", "FOX"]));
    assert_eq!(
        deduction.alphabet.get('Q'),
        Some(&Decipherment::Candidates(vec!['F', 'D']))
    );
    assert_eq!(
        deduction.alphabet.render("qrs tru"),
        "[f,d]o[x,g] [d,f]o[g,x]"
    );
}

#[test]
fn deduction_is_deterministic() {
    let index = index(&["FOX", "DOG", "HELLO", "WORLD", "JELLY"]);
    for &order in &ExamineOrder::ALL {
        let first = solve(&index, "qrs tru xippe ketpq", order);
        let second = solve(&index, "qrs tru xippe ketpq", order);
        assert_eq!(first, second);
    }
}

#[test]
fn words_without_candidates_are_unknown() {
    let deduction = solve(&hello_index(), "xippe ketpq zzv", ExamineOrder::LongestToShortest);

    assert_eq!(deduction.unmatched, owned(&["ZZV"]));
    assert_eq!(deduction.alphabet.get('Z'), Some(&Decipherment::Unknown));
    assert_eq!(deduction.alphabet.get('V'), Some(&Decipherment::Unknown));
    assert_eq!(deduction.alphabet.render("xippe ketpq zzv"), "hello world ???");
}

#[test]
fn inconsistent_word_is_evicted() {
    let index = index(&["HELLO", "WORLD", "CATS"]);
    let deduction = solve(&index, "xippe ketpq xiqz", ExamineOrder::LongestToShortest);

    assert_eq!(deduction.matched, owned(&["XIPPE", "KETPQ"]));
    assert_eq!(deduction.unmatched, owned(&["XIQZ"]));
    assert_eq!(deduction.hypothesis.len(), 2);
    // Letters shared with matched words keep their deduction.
    assert_eq!(deduction.alphabet.render("xiqz"), "hed?");
}

#[test]
fn unmatched_keeps_the_order_words_were_set_aside() {
    let index = index(&["HELLO", "WORLD", "CATS"]);
    let deduction = solve(&index, "zzv xippe ketpq xiqz vvvz", ExamineOrder::LongestToShortest);

    // Examined as XIPPE KETPQ XIQZ VVVZ ZZV.
    assert_eq!(deduction.unmatched, owned(&["XIQZ", "VVVZ", "ZZV"]));
}

#[test]
fn stops_early_once_every_letter_is_pinned() {
    let index = index(&["HELLO", "WORLD", "HEL", "ELH"]);
    let deduction = solve(&index, "xippe ketpq xip", ExamineOrder::LongestToShortest);

    assert_eq!(deduction.matched, owned(&["XIPPE", "KETPQ"]));
    assert!(deduction.unmatched.is_empty());
    assert_eq!(deduction.alphabet.render("xip"), "hel");
}

#[test]
fn tokens_with_digits_are_ignored() {
    let deduction = solve(&hello_index(), "AB12 xippe ketpq", ExamineOrder::LongestToShortest);

    assert_eq!(deduction.matched, owned(&["XIPPE", "KETPQ"]));
    assert_eq!(deduction.alphabet.get('A'), Some(&Decipherment::Absent));
    assert_eq!(deduction.alphabet.render("AB12 xippe ketpq"), "--12 hello world");
}

#[test]
fn message_without_words_is_fully_padded() {
    let deduction = solve(&hello_index(), "1,000 ... 42", ExamineOrder::FewestToMostMatches);

    assert!(deduction.matched.is_empty());
    assert!(deduction.unmatched.is_empty());
    assert_eq!(deduction.tuples_compared, 0);
    assert_eq!(deduction.alphabet.len(), 26);
    assert!(deduction
        .alphabet
        .iter()
        .all(|(_, d)| *d == Decipherment::Absent));
}

#[test]
fn alphabet_always_has_every_letter() {
    let index = hello_index();
    for message in &["", "xippe", "zzv qq", "xippe ketpq", "The quick brown fox"] {
        for &order in &ExamineOrder::ALL {
            assert_eq!(solve(&index, message, order).alphabet.len(), 26);
        }
    }
}

#[test]
fn orders_words_by_strategy() {
    let index = index(&["WORLD", "PLANT", "AT"]);
    let words = owned(&["ABCDE", "XY", "QQ"]);
    let order_of = |order| {
        Solver::new(&index, SolverConfig::new(order))
            .order_words(&words)
            .into_iter()
            .map(|(word, _)| word)
            .collect::<Vec<&str>>()
    };

    assert_eq!(order_of(ExamineOrder::LongestToShortest), vec!["ABCDE", "XY", "QQ"]);
    assert_eq!(order_of(ExamineOrder::FewestToMostMatches), vec!["QQ", "XY", "ABCDE"]);
    assert_eq!(order_of(ExamineOrder::MatchesDividedByLength), vec!["QQ", "ABCDE", "XY"]);
}

#[test]
fn only_longest_first_defers_lookups() {
    let index = index(&["AT"]);
    let words = owned(&["XY"]);

    let lazy = Solver::new(&index, SolverConfig::new(ExamineOrder::LongestToShortest)).order_words(&words);
    assert!(lazy[0].1.is_none());

    let eager = Solver::new(&index, SolverConfig::new(ExamineOrder::FewestToMostMatches)).order_words(&words);
    assert_eq!(eager[0].1.map(|c| c.len()), Some(1));
}

#[test]
fn narrowing_agrees_with_full_enumeration() {
    let hello: &[&str] = &["HELLO", "JELLY"];
    let world: &[&str] = &["WORLD", "WORDS", "PLANT"];
    let three: &[&str] = &["FOX", "DOG", "CAT", "ART", "TAR", "RAT"];
    let two: &[&str] = &["AT", "TO", "OF", "XD", "GO"];

    let cases: Vec<(Vec<&str>, Vec<&[&str]>)> = vec![
        (vec!["XIPPE", "KETPQ"], vec![hello, world]),
        (vec!["QRS", "TRU"], vec![three, three]),
        (vec!["QRS", "TRU", "SQ"], vec![three, three, two]),
        (vec!["QRS", "SRQ", "RU"], vec![three, three, two]),
    ];

    for (encrypted, lists) in cases {
        let narrowed = narrow(&encrypted, &lists, None);
        assert_eq!(narrowed.kept, Some(brute_force(&encrypted, &lists)), "{:?}", encrypted);
    }
}

#[test]
fn bijection_rolls_back_failed_extension() {
    let mut letters = Bijection::default();
    assert_eq!(letters.extend("AB", "XY"), Some(2));
    assert_eq!(letters.extend("BC", "YX"), None);
    assert_eq!(letters.trail.len(), 2);
    assert_eq!(letters.extend("BC", "YZ"), Some(1));
    letters.retract(1);
    assert!(!letters.forward.contains_key(&'C'));
    assert!(!letters.backward.contains_key(&'Z'));
}

#[test]
fn examine_order_names_round_trip() {
    for &order in &ExamineOrder::ALL {
        assert_eq!(order.to_string().parse::<ExamineOrder>().unwrap(), order);
    }
    assert_eq!(
        "fewest_to_most_matches".parse::<ExamineOrder>().unwrap(),
        ExamineOrder::FewestToMostMatches
    );
    assert!("SHORTEST_FIRST".parse::<ExamineOrder>().is_err());
}
