//! Walk through insert, replace, remove, traverse and find on an order-2
//! tree, once with integer keys and once with string keys.
//!
//! Run with `cargo run --example walkthrough`.

use std::ops::ControlFlow;

use ane_rs::{AneTree, StringTree};

fn main() {
    int_tree();
    string_tree();
}

fn int_tree() {
    println!("=== Integer keys ===\n");

    let mut t: AneTree<i32, &str, 2> = AneTree::new();
    t.insert(4, "Vier").unwrap();
    t.insert(1, "Ein").unwrap();
    t.insert(9000, "Neuntausend").unwrap();
    if let Err(e) = t.insert(9000, "Das ist kaputt") {
        println!("insert 9000 again: {e}");
    }
    t.insert(2300, "Nein!").unwrap();
    t.insert_or_replace(2300, "Two dreihundert").unwrap();

    t.remove(&1).unwrap();
    t.remove(&9000).unwrap();
    t.insert(1, "Klein bottle").unwrap();

    let _ = t.traverse_with(|node| {
        println!("Visit node '{}' (level {})", node.value(), node.level());
        ControlFlow::Continue(())
    });

    for key in [1, 15, 2300, 4, 9000] {
        match t.find(&key) {
            Ok(value) => println!("Node {key} found: {value}"),
            Err(_) => println!("Node {key} not found"),
        }
    }
    println!("Stats: {:?}\n", t.stats());
}

fn string_tree() {
    println!("=== String keys ===\n");

    let mut t: StringTree<&str, 2> = AneTree::new();
    t.insert("quatro".into(), "Vier").unwrap();
    t.insert("um".into(), "Ein").unwrap();
    t.insert("nove mil".into(), "Neuntausend").unwrap();
    if let Err(e) = t.insert("nove mil".into(), "Das ist kaputt") {
        println!("insert 'nove mil' again: {e}");
    }
    t.insert("dois mil e trezentos".into(), "Nein!").unwrap();
    t.insert_or_replace("dois mil e trezentos".into(), "Two dreihundert")
        .unwrap();

    t.remove("um").unwrap();
    t.remove("nove mil").unwrap();
    t.insert("um".into(), "Klein bottle").unwrap();

    let _ = t.traverse_with(|node| {
        println!("Visit node '{}' (level {})", node.value(), node.level());
        ControlFlow::Continue(())
    });

    for key in ["um", "quinze", "dois mil e trezentos", "quatro", "nove mil"] {
        match t.find(key) {
            Ok(value) => println!("Node {key} found: {value}"),
            Err(_) => println!("Node {key} not found"),
        }
    }
    println!("Stats: {:?}", t.stats());
}
