//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lazytask_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use lazytask_core::{open_db_in_memory, SqliteTodoStore, TodoEngine};

fn main() {
    println!("lazytask_core ping={}", lazytask_core::ping());
    println!("lazytask_core version={}", lazytask_core::core_version());

    match open_db_in_memory() {
        Ok(conn) => match SqliteTodoStore::try_new(&conn) {
            Ok(store) => {
                let engine = TodoEngine::load(store);
                println!("lazytask_core engine_tasks={}", engine.len());
            }
            Err(err) => eprintln!("lazytask_core store_error={err}"),
        },
        Err(err) => eprintln!("lazytask_core db_error={err}"),
    }
}
