// crates/cmdstore-core/examples/playground.rs
// Run with: cargo run --example playground

use cmdstore_core::{CommandStore, DotenvBackend, MemoryBackend, QueryFilter};

fn main() {
    println!("🗂️ Command Store Playground\n");

    let mut store = CommandStore::with_backend(MemoryBackend);

    println!("=== Adding Commands ===");
    for text in ["git status", "ssh deploy@prod", "docker ps -a", "   "] {
        match store.create(text) {
            Some(record) => println!("Added {} -> {:?}", record.id(), record.text()),
            None => println!("Rejected blank input {:?}", text),
        }
    }

    let ids: Vec<_> = store.iter().map(|r| r.id().clone()).collect();

    println!("\n=== Privacy ===");
    if let Some(privacy) = store.cycle_privacy(&ids[1]) {
        println!("{} is now {}", ids[1], privacy);
    }

    println!("\n=== Filtering ===");
    for filter in [
        QueryFilter::default(),
        QueryFilter::new("ssh", true, false),
        QueryFilter::new("D", false, false),
    ] {
        let texts: Vec<_> = store.query(&filter).iter().map(|r| r.text()).collect();
        println!("{:?} -> {:?}", filter.search_text, texts);
    }

    println!("\n=== Usage ===");
    for _ in 0..3 {
        store.record_usage(&ids[0]);
    }
    if let Some(record) = store.get(&ids[0]) {
        println!(
            "{} used {} times, last at {:?}",
            record.text(),
            record.usage_count(),
            record.last_used_at()
        );
    }

    println!("\n=== Editing ===");
    store.begin_edit(&ids[2]);
    store.commit_edit("docker ps --format '{{.Names}}'");
    if let Some(record) = store.get(&ids[2]) {
        println!("Edited: {}", record.text());
    }

    println!("\n=== Dotenv Rendering ===");
    let path = std::env::temp_dir().join("cmdstore-playground.env");
    let mut dotenv = CommandStore::with_backend(DotenvBackend::new(&path));
    dotenv.create("echo \"quoted\" and C:\\path\nsecond line");
    match std::fs::read_to_string(&path) {
        Ok(content) => println!("{}", content),
        Err(e) => println!("Could not read {}: {}", path.display(), e),
    }
}
