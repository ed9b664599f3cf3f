// SPDX-License-Identifier: Apache-2.0

// Heap-backed documents that grow when full
#![cfg(feature = "alloc")]

use arenajson::{Content, Document, Doubling, Error, Fixed, KeyKind, SLOT_SIZE};

type Growable<'a> = Document<'a, Vec<u8>, Doubling>;

#[test_log::test]
fn test_grows_on_demand() {
    let mut document = Growable::with_policy(Vec::new());
    let start = document.capacity();
    let root = document.root().unwrap();
    document.to_array(root).unwrap();
    let mut handles = Vec::new();
    for i in 0..200 {
        let element = document.add_element(root).unwrap();
        document.set_integer(element, i).unwrap();
        handles.push(element);
    }
    assert!(document.capacity() > start);
    assert!(document.capacity() >= 200 * SLOT_SIZE);
    // Handles taken before any growth still resolve
    for (i, handle) in handles.iter().enumerate() {
        assert_eq!(handle.as_integer(document.pool()), Some(i as arenajson::Integer));
    }
}

#[test_log::test]
fn test_strings_survive_growth() {
    let mut document = Growable::with_policy(vec![0u8; 64]);
    let root = document.root().unwrap();
    document.to_object(root).unwrap();
    let mut names = Vec::new();
    for i in 0..40 {
        let name = format!("member-{i}");
        let member = document.add_member(root, &name).unwrap();
        document.set_string(member, &name.repeat(2)).unwrap();
        names.push(name);
    }
    for name in &names {
        let member = document.get_member(root, name).unwrap();
        assert_eq!(document.content(member), Content::String(&name.repeat(2)));
    }
}

#[test_log::test]
fn test_linked_content_survives_growth() {
    let owner = String::from("borrowed text");
    let mut document = Growable::with_policy(Vec::new());
    let root = document.root().unwrap();
    document.to_object(root).unwrap();
    let member = document
        .add_linked_member(root, "linked", KeyKind::Static)
        .unwrap();
    document.set_linked_string(member, &owner).unwrap();
    for _ in 0..100 {
        document.add_member(root, "filler").unwrap();
    }
    assert_eq!(document.content(member), Content::String("borrowed text"));
    assert!(document.get_member(root, "linked").is_some());
}

#[test_log::test]
fn test_single_large_string_triggers_growth() {
    let mut document = Growable::with_policy(Vec::new());
    let root = document.root().unwrap();
    let text = "x".repeat(5000);
    document.set_string(root, &text).unwrap();
    assert_eq!(document.content(root), Content::String(text.as_str()));
}

#[test_log::test]
fn test_fixed_vec_does_not_grow() {
    let mut document: Document<'_, Vec<u8>, Fixed> = Document::new(vec![0u8; 128]);
    let root = document.root().unwrap();
    let text = "x".repeat(500);
    assert_eq!(document.set_string(root, &text), Err(Error::NoMemory));
    assert_eq!(document.capacity(), 128);
}

#[test_log::test]
fn test_shrink_then_grow_again() {
    let mut document = Growable::with_policy(vec![0u8; 4096]);
    let root = document.root().unwrap();
    document.to_array(root).unwrap();
    let first = document.add_element(root).unwrap();
    document.set_string(first, "kept").unwrap();

    document.shrink_to_fit();
    assert!(document.capacity() < 4096);
    assert_eq!(document.pool().buffer_len(), document.capacity());

    for _ in 0..10 {
        document.add_element(root).unwrap();
    }
    assert_eq!(document.size(root), 11);
    assert_eq!(document.content(first), Content::String("kept"));
}
