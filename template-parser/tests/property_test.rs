//! Property tests: memoized parses must agree with plain ones.

use proptest::prelude::*;
use regex::Regex;
use template_parser::{
    any, end, find, next, optional, recursive, repeat, required, sequence, Fragments, ParseError,
    ParseOptions, Parser,
};

#[derive(Debug, Clone)]
enum Token {
    Text(String),
    Slot(usize),
    Group(Vec<Token>),
}

fn render(tokens: &[Token], values: &[u32], out: &mut String) {
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Slot(index) => out.push_str(&format!("${}", values[*index])),
            Token::Group(inner) => {
                out.push('[');
                render(inner, values, out);
                out.push(']');
            }
        }
    }
}

/// A small grammar over `a`, `b`, `-`, spaces and parentheses with slots in
/// between. Letter pairs, letters and groups are cached; `a-` followed by
/// anything but a letter is fatal, as is an unclosed group. Values are only
/// read by the root transform, which runs on every parse.
fn grammar() -> Parser<String, u32> {
    let letter: Parser<Token, u32> = find(Regex::new("^[ab]").unwrap())
        .then(|text, _| Token::Text(text))
        .use_cache(true);
    let pair = sequence((letter.clone(), find("-"), required(letter.clone())))
        .then(|(left, _, right), _| Token::Group(vec![left, Token::Text("-".into()), right]))
        .use_cache(true);
    let slot = next().then(|index, _| Token::Slot(index));
    let space = find(" ").then(|_, _| Token::Text("_".into()));

    let item = recursive(move |item: Parser<Token, u32>| {
        let group = sequence((find("("), optional(repeat(item)), required(find(")"))))
            .then(|(_, items, _), _| Token::Group(items.unwrap_or_default()))
            .use_cache(true);
        any([group, pair, letter, slot, space])
    });

    sequence((optional(repeat(item)), end())).then(|(items, _), values: &[u32]| {
        let mut out = String::new();
        render(&items.unwrap_or_default(), values, &mut out);
        out
    })
}

fn fragments_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[ab\\- ()]{0,6}", 1..4)
}

type Outcome = Result<Option<String>, ParseError>;

fn parse(root: &Parser<String, u32>, parts: &[String], values: &[u32], cache: bool) -> Outcome {
    let options = ParseOptions::default().with_cache(cache);
    root.parse_with(Fragments::from(parts.to_vec()), values, &options)
}

proptest! {
    #[test]
    fn prop_cached_parse_matches_uncached(parts in fragments_strategy()) {
        let values: Vec<u32> = (0..parts.len() as u32).collect();
        let root = grammar();

        let plain = parse(&root, &parts, &values, false);
        let built = parse(&root, &parts, &values, true);
        let replayed = parse(&root, &parts, &values, true);

        prop_assert_eq!(&built, &plain);
        prop_assert_eq!(&replayed, &plain);
    }

    #[test]
    fn prop_replay_sees_new_values(parts in fragments_strategy(), offset in 1u32..100) {
        let first: Vec<u32> = (0..parts.len() as u32).collect();
        let second: Vec<u32> = first.iter().map(|value| value + offset).collect();
        let root = grammar();

        let _ = parse(&root, &parts, &first, true);
        let replayed = parse(&root, &parts, &second, true);
        let plain = parse(&root, &parts, &second, false);

        prop_assert_eq!(replayed, plain);
    }

    #[test]
    fn prop_literal_match_is_anchored(text in "[a-c]{0,8}", literal in "[a-c]{1,3}") {
        let pattern: Parser<String> = find(literal.as_str());
        let expected = text.starts_with(&literal).then(|| literal.clone());
        prop_assert_eq!(pattern.parse(text.as_str(), &[]).unwrap(), expected);
    }
}
