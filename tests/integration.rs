//! End-to-end tests for the kbwire codec.
//!
//! These exercise the reader, writer, registry, tree algebra and caches
//! together, the way a client session uses them around remote round trips.

use std::collections::HashMap;

use kbwire::algebra::{
    find_free_variables, get_arg_positions_for_term, get_specified_object, set_specified_object,
    substitute_destructive, substitute_non_destructive, tree_contains, tree_gather, tree_substitute,
};
use kbwire::cache::{BoundedCache, TermPairCache};
use kbwire::error::{ParseError, WireError};
use kbwire::registry::ConstantRegistry;
use kbwire::term::{Constant, Guid, LogicalOperator, Nart, Sentence, Symbol, Term, Variable};
use kbwire::wire::{Codec, NamedFunctions, Reader, Writer};

fn roundtrip(registry: &ConstantRegistry, oracle: &NamedFunctions, term: &Term) -> Term {
    let text = Writer::default().write(term).unwrap();
    Reader::new(registry)
        .with_oracle(oracle)
        .read(&text)
        .unwrap_or_else(|e| panic!("failed to read back {text:?}: {e}"))
}

#[test]
fn round_trip_preserves_structure() {
    let registry = ConstantRegistry::new();
    let dog = registry.intern("Dog", Guid::from_u128(0x10)).unwrap();
    let france = registry.intern("France", Guid::from_u128(0x11)).unwrap();
    let oracle: NamedFunctions = ["GovernmentFn"].into_iter().collect();

    let government = Term::Nart(Nart::new(
        Term::symbol("GovernmentFn"),
        vec![Term::Constant(france.clone())],
    ));
    let samples = vec![
        Term::int(-42),
        Term::float(2.5),
        Term::float(1e-7),
        Term::text("plain \"quoted\" \\ text"),
        Term::text("naïve café ☕ & more"),
        Term::keyword("TRUE"),
        Term::var("X"),
        Term::Variable(Variable::dont_care("Y")),
        Term::Symbol(Symbol::qualified("CYC", "foo")),
        Term::Constant(dog.clone()),
        Term::nil(),
        Term::list(vec![Term::nil(), Term::list(vec![Term::nil()])]),
        Term::dotted(vec![Term::int(10)], Term::Constant(france.clone())),
        Term::quote(Term::list(vec![Term::symbol("a"), Term::var("B")])),
        government.clone(),
        Term::Sentence(Sentence::for_all(
            Variable::new("X"),
            Term::list(vec![
                Term::symbol("implies"),
                Term::list(vec![Term::symbol("isa"), Term::var("X"), Term::Constant(dog)]),
                Term::list(vec![Term::symbol("controls"), government, Term::var("X")]),
            ]),
        )),
    ];

    for term in &samples {
        assert_eq!(&roundtrip(&registry, &oracle, term), term, "round trip of {term}");
    }
}

#[test]
fn big_integers_round_trip() {
    let registry = ConstantRegistry::new();
    let oracle = NamedFunctions::new();
    let big: num_bigint::BigInt = "-98765432109876543210987654321".parse().unwrap();
    let term = Term::Number(big.into());
    assert_eq!(roundtrip(&registry, &oracle, &term), term);
}

#[test]
fn scenario_simple_list() {
    let registry = ConstantRegistry::new();
    let term = Reader::new(&registry).read("(1 2 3 4 5)").unwrap();
    let list = term.as_list().unwrap();
    assert!(list.is_proper());
    assert_eq!(list.elements().len(), 5);
    assert!(list.elements().iter().all(|t| matches!(t, Term::Number(_))));
    assert_eq!(Writer::default().write(&term).unwrap(), "(1 2 3 4 5)");
}

#[test]
fn scenario_dotted_pair() {
    let registry = ConstantRegistry::new();
    let brazil = registry.intern("Brazil", Guid::from_u128(0xb2)).unwrap();
    let term = Reader::new(&registry).read("(10 . Brazil)").unwrap();
    let list = term.as_list().unwrap();
    assert_eq!(list.elements(), &[Term::int(10)]);
    assert_eq!(list.tail(), Some(&Term::Constant(brazil)));
    assert_eq!(term.size(), 2);
}

#[test]
fn scenario_nested_structure() {
    let registry = ConstantRegistry::new();
    let reader = Reader::new(&registry);
    let tree = reader.read("((A) (B C) (((D))))").unwrap();
    let first = get_specified_object(&tree, &[0]).unwrap();
    assert_eq!(first, &reader.read("(A)").unwrap());
    assert_eq!(
        get_specified_object(&tree, &[2, 0, 0, 0]).unwrap(),
        &Term::symbol("D")
    );
}

#[test]
fn scenario_cache_capacity() {
    let cache: TermPairCache<bool> = BoundedCache::new(2, None).unwrap();
    let key = |a: &str, b: &str| (Term::symbol(a), Term::symbol(b));
    cache.put(key("Dog", "Animal"), true);
    cache.put(key("Cat", "Animal"), true);
    cache.put(key("Rock", "Animal"), false);
    assert_eq!(cache.get(&key("Dog", "Animal")), None);
    assert_eq!(cache.get(&key("Rock", "Animal")), Some(false));
}

#[test]
fn interning_is_idempotent_across_threads() {
    let registry = ConstantRegistry::new();
    let guid = Guid::from_u128(0xabc);
    let instances: Vec<Constant> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| registry.intern("Thing", guid).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(instances.iter().all(|c| c.ptr_eq(&instances[0])));
    assert_eq!(registry.len(), 1);
}

#[test]
fn reset_clears_resolution() {
    let registry = ConstantRegistry::new();
    registry.intern("Dog", Guid::from_u128(1)).unwrap();
    let reader = Reader::new(&registry);
    assert!(matches!(reader.read("Dog").unwrap(), Term::Constant(_)));
    registry.reset();
    assert_eq!(reader.read("Dog").unwrap(), Term::symbol("Dog"));
}

#[test]
fn indexed_narts_resolve_from_registry() {
    let registry = ConstantRegistry::new();
    let france = registry.intern("France", Guid::from_u128(5)).unwrap();
    let indexed = registry
        .intern_nart(
            Term::symbol("GovernmentFn"),
            vec![Term::Constant(france)],
            Guid::from_u128(6),
        )
        .unwrap();
    let oracle: NamedFunctions = ["GovernmentFn"].into_iter().collect();
    let term = Reader::new(&registry)
        .with_oracle(&oracle)
        .read("(GovernmentFn France)")
        .unwrap();
    match term {
        Term::Nart(nart) => {
            assert!(nart.is_indexed());
            assert_eq!(nart, indexed);
        }
        other => panic!("expected nart, got {other:?}"),
    }
}

#[test]
fn parse_errors_carry_offsets() {
    let registry = ConstantRegistry::new();
    let reader = Reader::new(&registry);
    let cases = [
        ("(a b", 0),
        ("(a . b c)", 7),
        ("( . a)", 2),
        ("(a))", 3),
    ];
    for (text, expected) in cases {
        match reader.read(text) {
            Err(WireError::Parse(e)) => assert_eq!(e.offset(), Some(expected), "{text}"),
            other => panic!("expected parse error for {text:?}, got {other:?}"),
        }
    }
    assert!(matches!(
        reader.read("  ;; nothing here\n"),
        Err(WireError::Parse(ParseError::EmptyInput))
    ));
    assert!(matches!(reader.read("\"open"), Err(WireError::Lex(_))));
}

#[test]
fn substitution_removes_old_term() {
    let registry = ConstantRegistry::new();
    let tree = Reader::new(&registry)
        .read("(and (isa ?X Dog) (not (owns Joe ?X)) '(?X))")
        .unwrap();
    let old = Term::var("X");
    let new = Term::symbol("Rex");

    let copied = substitute_non_destructive(&tree, &old, &new);
    assert!(!tree_contains(&copied, &old));
    assert!(tree_contains(&tree, &old));

    let mut edited = tree.clone();
    assert_eq!(substitute_destructive(&mut edited, &old, &new), 3);
    assert_eq!(edited, copied);
    assert!(get_arg_positions_for_term(&edited, &old).is_empty());
}

#[test]
fn tree_substitute_resolves_indexicals() {
    let registry = ConstantRegistry::new();
    let oracle: NamedFunctions = ["CapitalFn"].into_iter().collect();
    let reader = Reader::new(&registry).with_oracle(&oracle);
    let tree = reader.read("(and (visits TheUser (CapitalFn ThisCountry)) (at Now))").unwrap();
    let map = HashMap::from([
        (Term::symbol("TheUser"), Term::symbol("Joe")),
        (Term::symbol("ThisCountry"), Term::symbol("France")),
        (Term::symbol("Now"), Term::int(2026)),
    ]);
    let resolved = tree_substitute(&tree, &map);
    assert_eq!(
        Writer::default().write(&resolved).unwrap(),
        "(and (visits Joe (CapitalFn France)) (at 2026))"
    );
    assert_eq!(tree_gather::<Nart>(&resolved).len(), 1);
}

#[test]
fn free_variables_respect_quantifiers() {
    let registry = ConstantRegistry::new();
    let sentence = Reader::new(&registry)
        .read("(forAll ?X (implies (isa ?X Dog) (thereExists ?Y (owns ?Y ?X ?Z))))")
        .unwrap();
    assert!(matches!(sentence, Term::Sentence(_)));
    let free: Vec<Variable> = find_free_variables(&sentence).into_iter().collect();
    assert_eq!(free, vec![Variable::new("Z")]);
}

#[test]
fn set_specified_object_then_write() {
    let registry = ConstantRegistry::new();
    let mut tree = Reader::new(&registry).read("(isa Rex Dog)").unwrap();
    set_specified_object(&mut tree, &[2], Term::symbol("Cat")).unwrap();
    assert_eq!(Writer::default().write(&tree).unwrap(), "(isa Rex Cat)");
    assert!(set_specified_object(&mut tree, &[3], Term::nil()).is_err());
}

#[test]
fn codec_call_with_closure_transport() {
    let registry = ConstantRegistry::new();
    registry.intern("Dog", Guid::from_u128(9)).unwrap();
    let codec = Codec::new(Reader::new(&registry), Writer::default());
    let request = Term::Sentence(Sentence::compose(
        LogicalOperator::Not,
        vec![Term::list(vec![Term::symbol("isa"), Term::symbol("Rex"), Term::symbol("Cat")])],
    ));
    let reply = codec
        .call(
            &|text: &str| -> kbwire::WireResult<String> {
                assert_eq!(text, "(not (isa Rex Cat))");
                Ok("(Dog Dog)".to_string())
            },
            &request,
        )
        .unwrap();
    assert_eq!(tree_gather::<Constant>(&reply).len(), 1);
}

#[test]
fn read_all_splits_concatenated_replies() {
    let registry = ConstantRegistry::new();
    let reader = Reader::new(&registry);
    let forms = reader.read_all("(a) ;; first\n(b c) 42 \"x\"").unwrap();
    assert_eq!(forms.len(), 4);
    let (first, rest) = reader.read_one("(a) (b)").unwrap();
    assert_eq!(first, Term::list(vec![Term::symbol("a")]));
    assert_eq!(rest.trim(), "(b)");
}
