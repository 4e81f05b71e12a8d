use ordered_sync_map::SyncMap;

fn ordered<K: Clone, V: Clone>(map: &SyncMap<K, V>) -> Vec<(K, V)> {
    let mut out = Vec::new();
    map.ordered_range(|k, v| out.push((k.clone(), v.clone())));
    out
}

#[test]
fn test_get_after_put() {
    let map = SyncMap::new();
    map.put("k".to_owned(), 7);

    assert_eq!(Some(7), map.get("k"));
    assert_eq!(None, map.get("never"));
}

#[test]
fn test_put_overwrites_without_moving() {
    let map = SyncMap::new();
    map.put(1, "one");
    map.put(2, "two");
    map.put(3, "three");

    map.put(2, "deux");
    // same value again still counts as a put, nothing moves
    map.put(1, "one");

    assert_eq!(3, map.len());
    assert_eq!(vec![(1, "one"), (2, "deux"), (3, "three")], ordered(&map));
}

#[test]
fn test_delete_once_per_insertion() {
    let map = SyncMap::new();
    map.put(1, 1);
    map.put(2, 2);

    assert!(map.delete(&1));
    assert_eq!(1, map.len());
    assert_eq!(None, map.get(&1));

    assert!(!map.delete(&1));
    assert!(!map.delete(&1));
    assert_eq!(1, map.len());

    // back in, and now it's the newest
    map.put(1, 10);
    assert_eq!(vec![(2, 2), (1, 10)], ordered(&map));
    assert!(map.delete(&1));
}

#[test]
fn test_get_or_put_inserts_when_absent() {
    let map = SyncMap::new();

    assert_eq!((5, false), map.get_or_put("k", 5));
    assert_eq!(Some(5), map.get("k"));
    assert_eq!(1, map.len());
}

#[test]
fn test_get_or_put_overwrites_when_present() {
    let map = SyncMap::new();
    map.put("old", 1);
    map.put("k", 1);

    assert_eq!((2, true), map.get_or_put("k", 2));

    // the previous value is gone and the key didn't move
    assert_eq!(Some(2), map.get("k"));
    assert_eq!(vec![("old", 1), ("k", 2)], ordered(&map));
}

#[test]
fn test_get_and_delete() {
    let map = SyncMap::new();
    map.put("a", vec![1, 2]);
    map.put("b", vec![3]);

    let before = map.len();
    assert_eq!(Some(vec![1, 2]), map.get_and_delete("a"));
    assert_eq!(before - 1, map.len());

    assert_eq!(None, map.get_and_delete("a"));
    assert_eq!(before - 1, map.len());
    assert_eq!(vec![("b", vec![3])], ordered(&map));
}

#[test]
fn test_ordered_range_follows_insertion() {
    let map = SyncMap::new();
    for k in ["e", "b", "d", "a", "c"] {
        map.put(k, k.len());
    }

    let mut keys = Vec::new();
    map.ordered_range(|k, _| keys.push(*k));
    assert_eq!(vec!["e", "b", "d", "a", "c"], keys);

    let mut newest_first = Vec::new();
    map.ordered_range_rev(|k, _| newest_first.push(*k));
    assert_eq!(vec!["c", "a", "d", "b", "e"], newest_first);
}

#[test]
fn test_unordered_range_sees_same_entries() {
    let map: SyncMap<u32, String> =
        (0..100).map(|i| (i, i.to_string())).collect();
    for i in (0..100).step_by(3) {
        map.delete(&i);
    }

    let mut unordered = Vec::new();
    map.unordered_range(|k, v| unordered.push((*k, v.clone())));
    unordered.sort();

    assert_eq!(ordered(&map), unordered);
}

#[test]
fn test_empty_map() {
    let map: SyncMap<u8, u8> = SyncMap::default();

    assert!(map.is_empty());
    assert_eq!(0, map.len());
    assert!(!map.contains_key(&0));

    let mut visits = 0;
    map.ordered_range(|_, _| visits += 1);
    map.ordered_range_rev(|_, _| visits += 1);
    map.unordered_range(|_, _| visits += 1);
    assert_eq!(0, visits);
}

#[test]
fn test_readme_example() {
    let map = SyncMap::new();
    map.put("a", 1);
    map.put("b", 2);
    map.put("a", 3);

    assert_eq!(2, map.len());
    assert_eq!(vec![("a", 3), ("b", 2)], ordered(&map));

    assert_eq!(Some(2), map.get_and_delete("b"));
    assert_eq!(1, map.len());
}

#[test]
fn test_extend_behaves_like_put() {
    let mut map = SyncMap::new();
    map.put(1, 'a');
    map.extend(vec![(2, 'b'), (1, 'z'), (3, 'c')]);

    assert_eq!(vec![(1, 'z'), (2, 'b'), (3, 'c')], ordered(&map));
}

#[cfg(feature = "reentrancy_check")]
mod reentrancy {
    use ordered_sync_map::SyncMap;

    #[test]
    #[should_panic(expected = "`put` called on a map from inside")]
    fn test_put_from_ordered_range_panics() {
        let map = SyncMap::new();
        map.put(1, 1);
        map.ordered_range(|k, v| map.put(*k + 1, *v));
    }

    #[test]
    #[should_panic(expected = "`get` called on a map from inside")]
    fn test_get_from_unordered_range_panics() {
        let map = SyncMap::new();
        map.put(1, 1);
        map.unordered_range(|k, _| {
            map.get(k);
        });
    }

    #[test]
    fn test_other_map_is_fine_and_guard_is_released() {
        let source = SyncMap::new();
        let sink = SyncMap::new();
        source.put(1, 1);
        source.put(2, 2);

        source.ordered_range(|k, v| sink.put(*k, *v));
        assert_eq!(2, sink.len());

        // the traversal is over, so this no longer counts as re-entry
        source.put(3, 3);
        assert_eq!(3, source.len());
    }

    #[test]
    fn test_guard_is_released_after_callback_panics() {
        let map = SyncMap::new();
        map.put(1, 1);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
            || map.ordered_range(|_, _| panic!("callback blew up")),
        ));
        assert!(result.is_err());

        map.put(2, 2);
        assert_eq!(2, map.len());
    }
}
