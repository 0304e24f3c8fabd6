use transactable::{MapChange, ObservableMap};

fn main() {
    let mut inventory = ObservableMap::new();

    let _sub = inventory.on_map_changed(|change: &MapChange<String, u32>| match change {
        MapChange::Add { key, value } => println!("stocked {value} x {key}"),
        MapChange::Replace {
            key,
            new_value,
            old_value,
        } => println!("{key}: {old_value} -> {new_value}"),
        MapChange::Remove { key, .. } => println!("sold out of {key}"),
        MapChange::Reset => println!("inventory cleared"),
    });

    inventory.insert("pears".to_string(), 12);
    inventory.insert("plums".to_string(), 4);
    inventory.insert("pears".to_string(), 9);
    inventory.remove("plums");
    inventory.clear();

    println!("\n{} products left", inventory.len());
}
