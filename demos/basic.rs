//! Examples of using the radix trie and its cursors
use radix_index::{Position, Trie};

fn main() -> Result<(), radix_index::Error> {
    // Create a new trie and insert some keys
    let mut trie = Trie::new();
    trie.insert("hello", 1)?;
    trie.insert("help", 2)?;
    trie.insert("world", 3)?;

    // Inserting an existing key replaces its payload
    assert_eq!(trie.insert("world", 30)?, Some(3));

    // Check values
    assert_eq!(trie.get("hello"), Some(1));
    assert_eq!(trie.get("world"), Some(30));
    assert_eq!(trie.get("missing"), None);

    // Walk every key in order
    let mut cursor = trie.cursor();
    while let Some(payload) = cursor.next(&trie, "")? {
        let key = cursor.key().unwrap_or_default();
        println!("{} → {}", String::from_utf8_lossy(key), payload);
    }
    assert_eq!(cursor.position(), Position::AfterLast);

    // Scan the keys under "hel", starting just below the prefix
    cursor.seek_at_most(&trie, "hel")?;
    while let Some(payload) = cursor.next(&trie, "hel")? {
        println!("under hel: {}", payload);
    }
    cursor.stop();

    // Removing "help" folds "hel" + "lo" back into a single node
    println!("nodes before removal: {}", trie.node_count());
    assert_eq!(trie.remove("help"), Some(2));
    println!("nodes after removal: {}", trie.node_count());

    Ok(())
}

#[test]
fn test_prefix_view() {
    let trie: Trie = vec![("hello", 1), ("help", 2), ("world", 3)]
        .into_iter()
        .collect();

    // Create a view of the "hel" prefix
    let view = trie.view_subtrie("hel");

    assert!(view.exists());
    assert_eq!(view.len(), 2);
    assert!(!view.is_empty());

    assert!(view.contains_key("hello"));
    assert!(view.contains_key("help"));
    assert!(!view.contains_key("world"));

    assert_eq!(view.get("hello"), Some(1));
    assert_eq!(view.get("help"), Some(2));
    assert_eq!(view.get("world"), None);
}
