use anyhow::Result;
use ironfold::testing::*;
use ironfold::*;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

#[test]
fn numeric_aggregators_over_standard_datasets() {
    for (name, data) in standard_datasets() {
        let n = assert_modes_agree(&counting(), &data);
        assert_eq!(n as usize, data.len(), "{name}");

        let sum = assert_modes_agree(&summing(|x: i32| i64::from(x)), &data);
        assert_eq!(sum, data.iter().map(|x| i64::from(*x)).sum::<i64>(), "{name}");

        let min = assert_modes_agree(&minimum(), &data);
        let max = assert_modes_agree(&maximum(), &data);
        assert_eq!(min, data.iter().copied().min(), "{name}");
        assert_eq!(max, data.iter().copied().max(), "{name}");
    }
}

#[test]
fn averaging_and_summarizing() -> Result<()> {
    assert_eq!(averaging(|x: i32| x).aggregate(vec![1, 2, 3, 6])?, 3.0);
    assert_eq!(averaging(|x: i32| x).aggregate(empty_data())?, 0.0);

    let summary = summarizing(|x: i32| x).aggregate(vec![4, -2, 7])?;
    assert_eq!(summary.count, 3);
    assert_eq!(summary.sum, 9.0);
    assert_eq!(summary.min, -2.0);
    assert_eq!(summary.max, 7.0);
    assert_eq!(summary.average(), 3.0);

    let empty = summarizing(|x: i32| x).aggregate(empty_data())?;
    assert_eq!(empty, Summary::default());
    assert_eq!(empty.average(), 0.0);
    Ok(())
}

#[test]
fn averaging_wide_integers() -> Result<()> {
    let big = u64::from(u32::MAX) * 8;
    assert_eq!(averaging(|x: u64| x).aggregate(vec![big, 0])?, (big / 2) as f64);
    assert_eq!(averaging(|x: i64| x - 10).aggregate(vec![4, 6, 8])?, -4.0);

    let summary = summarizing(|x: i64| x).aggregate(vec![i64::from(i32::MIN) * 2, 5])?;
    assert_eq!(summary.min, f64::from(i32::MIN) * 2.0);
    assert_eq!(summary.max, 5.0);
    Ok(())
}

#[test]
fn min_by_and_max_by_keep_the_first_of_equals() -> Result<()> {
    let words = vec!["bb", "a", "cc", "d"];
    let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());

    assert_eq!(min_by(by_len).aggregate(words.clone())?, Some("a"));
    assert_eq!(max_by(by_len).aggregate(words.clone())?, Some("bb"));
    assert_eq!(min_by(by_len).aggregate(Vec::<&str>::new())?, None);

    let reversed = max_by(|a: &i32, b: &i32| b.cmp(a));
    assert_eq!(assert_modes_agree(&reversed, &descending_data(20)), Some(0));
    Ok(())
}

#[test]
fn reducing_with_and_without_identity() -> Result<()> {
    let product = reducing(1i64, |a: i64, b: i64| a * b);
    assert_eq!(product.aggregate(vec![1, 2, 3, 4, 5])?, 120);
    assert_eq!(product.aggregate(Vec::new())?, 1);
    assert!(product.has(Characteristics::IDENTITY_FINISH));

    let longest = reducing_opt(|a: String, b: String| if b.len() > a.len() { b } else { a });
    let words: Vec<String> = ["to", "be", "or", "not"].map(String::from).to_vec();
    assert_eq!(assert_modes_agree(&longest, &words), Some("not".to_string()));
    assert_eq!(longest.aggregate(Vec::new())?, None);

    let total_len = reducing_mapped(0usize, |s: String| s.len(), |a: usize, b: usize| a + b);
    assert_eq!(assert_modes_agree(&total_len, &words), 9);
    Ok(())
}

#[test]
fn collections_keep_their_contracts() -> Result<()> {
    let data = duplicated_data(50);

    let list = assert_modes_agree(&to_list(), &data);
    assert_collections_equal(&list, &data);

    let set = assert_modes_agree(&to_set(), &data);
    assert_eq!(set, (0..50).collect::<HashSet<_>>());

    let sorted = assert_modes_agree(&to_collection(BTreeSet::new), &data);
    assert_eq!(sorted.into_iter().collect::<Vec<_>>(), ascending_data(50));
    Ok(())
}

#[test]
fn joining_with_prefix_and_suffix() -> Result<()> {
    let list = joining_full(",", "[", "]");
    assert_eq!(list.aggregate(["a", "b", "c"])?, "[a,b,c]");
    assert_eq!(list.aggregate(Vec::<&str>::new())?, "[]");
    assert_eq!(list.aggregate([""])?, "[]");
    assert_eq!(list.aggregate(["", ""])?, "[,]");
    Ok(())
}

#[test]
fn joining_agrees_across_modes() {
    let words: Vec<String> = (0..200).map(|i| format!("w{i}")).collect();
    let expected = format!("<{}>", words.join(", "));

    let joined = assert_modes_agree(&joining_full(", ", "<", ">"), &words);
    assert_eq!(joined, expected);
    assert_eq!(assert_modes_agree(&joining(), &words), words.concat());
    assert_eq!(assert_modes_agree(&joining_with("-"), &words), words.join("-"));
}

#[test]
fn mapping_is_pre_transformed_input() {
    for (name, data) in standard_datasets() {
        let mapped = assert_modes_agree(&mapping(|x: i32| x * 3 - 1, to_list()), &data);
        let expected: Vec<i32> = data.iter().map(|x| x * 3 - 1).collect();
        assert_eq!(mapped, expected, "{name}");
    }
}

#[test]
fn try_mapping_stops_at_first_error() {
    let parse = try_mapping(|s: &str| Ok(s.parse::<i32>()?), summing(|x: i32| x));
    let ok = parse.aggregate(["1", "2", "39"]);
    assert_eq!(ok.ok(), Some(42));

    let err = parse.aggregate(["1", "x", "3"]).expect_err("\"x\" is not a number");
    assert!(err.downcast_ref::<std::num::ParseIntError>().is_some());
}

#[test]
fn filtering_drops_rejected_elements() {
    let evens = filtering(|x: &i32| x % 2 == 0, to_list());
    let out = assert_modes_agree(&evens, &ascending_data(10));
    assert_eq!(out, vec![0, 2, 4, 6, 8]);

    let none = filtering(|_: &i32| false, counting());
    assert_eq!(assert_modes_agree(&none, &ascending_data(10)), 0);
}

#[test]
fn flat_mapping_is_concatenation() {
    for (name, data) in standard_datasets() {
        let agg = flat_mapping(|x: i32| (0..x.rem_euclid(4)).map(move |i| x * 10 + i), to_list());
        let out = assert_modes_agree(&agg, &data);
        let expected: Vec<i32> = data
            .iter()
            .flat_map(|&x| (0..x.rem_euclid(4)).map(move |i| x * 10 + i))
            .collect();
        assert_eq!(out, expected, "{name}");
    }
}

#[test]
fn flat_mapping_treats_missing_as_empty() -> Result<()> {
    let letters = flat_mapping(
        |s: &str| {
            let letters = (!s.is_empty()).then(|| s.chars().map(String::from).collect::<Vec<_>>());
            Expansion::from(letters)
        },
        joining_with("."),
    );
    assert_eq!(letters.aggregate(["ab", "", "c"])?, "a.b.c");
    assert_eq!(letters.aggregate(["", ""])?, "");
    Ok(())
}

#[test]
fn adapters_keep_downstream_characteristics() {
    let set = to_set::<i32>();
    assert!(mapping(|x: u8| i32::from(x), set.clone()).is_unordered());
    assert!(filtering(|_: &i32| true, set.clone()).has(Characteristics::IDENTITY_FINISH));
    assert!(flat_mapping(|x: i32| [x, x], set).is_unordered());

    assert_eq!(
        mapping(|x: i32| x, to_list()).characteristics(),
        to_list::<i32>().characteristics()
    );
}

#[test]
fn custom_aggregator_from_closures() {
    // sum of squares and element count in one pass
    let agg = Aggregator::of(
        || (0i64, 0u64),
        |acc: &mut (i64, u64), x: i32| {
            acc.0 += i64::from(x) * i64::from(x);
            acc.1 += 1;
        },
        |acc, other| {
            acc.0 += other.0;
            acc.1 += other.1;
        },
        |acc| acc,
        Characteristics::empty(),
    );
    let (squares, n) = assert_modes_agree(&agg, &ascending_data(10));
    assert_eq!(squares, 285);
    assert_eq!(n, 10);
}

#[test]
fn ordering_helpers_are_total() {
    let cmp = |a: &f64, b: &f64| a.partial_cmp(b).unwrap_or(Ordering::Equal);
    let out = min_by(cmp).aggregate(vec![2.5, -1.0, 3.0]).ok().flatten();
    assert_eq!(out, Some(-1.0));
}
