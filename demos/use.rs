use bstree::{AvlTree, BinarySearchTree, Error};

fn main() {
    let mut tree = AvlTree::new();
    tree.insert(0, "zero");
    tree.insert(1, "one");
    tree.insert(2, "two");
    tree.insert(2, "two");
    tree.insert(3, "three");
    tree.insert(4, "four");
    tree.insert(5, "five");
    assert_eq!(tree.get(&1), Some(&"one"));
    tree.remove(&1);
    assert!(tree.get(&1).is_none());
    assert_eq!(tree.at(&1), Err(Error::KeyNotFound));

    for (k, v) in &tree {
        println!("{k} => {v}");
    }
    println!("height: {}, balanced: {}", tree.height(), tree.is_balanced());

    let mut chain = BinarySearchTree::new();
    for x in 0..5 {
        chain.insert(x, ());
    }
    print!("{{ ");
    let mut cursor = chain.begin();
    while cursor != chain.end() {
        if let Some(x) = cursor.key() {
            print!("{x}, ");
        }
        cursor.move_next();
    }
    println!("}}");
    println!("height: {}, balanced: {}", chain.height(), chain.is_balanced());
}
