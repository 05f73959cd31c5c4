//! Todo list driven through adapters

use draftstore::adapter::{Adapter, SelectedSignal, VanillaStore};
use draftstore::StoreOptions;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TodoItem {
    id: usize,
    title: String,
    completed: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct AppState {
    todos: Vec<TodoItem>,
}

impl AppState {
    fn add_todo(&mut self, title: &str) {
        let id = self.todos.len();
        self.todos.push(TodoItem {
            id,
            title: title.to_string(),
            completed: false,
        });
    }

    fn toggle_todo(&mut self, id: usize) {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.completed = !todo.completed;
        }
    }

    fn stats(&self) -> (usize, usize) {
        let total = self.todos.len();
        let completed = self.todos.iter().filter(|t| t.completed).count();
        (total, completed)
    }
}

fn main() -> draftstore::Result<()> {
    println!("=== Todo App ===\n");

    let store = VanillaStore::new(AppState::default(), StoreOptions::default()).into_store();
    let stats = SelectedSignal::attach(store.clone(), AppState::stats);

    let _guard = stats.watch(|(total, completed)| {
        println!("   [Stats] Total: {}, Completed: {}", total, completed);
    });

    store.set_state(|s| s.add_todo("Learn Rust"))?;
    store.set_state(|s| s.add_todo("Build a store"))?;
    store.set_state(|s| s.add_todo("Write documentation"))?;
    store.set_state(|s| s.toggle_todo(0))?;

    // Edits that leave the stats alone do not reach the watcher.
    store.set_state(|s| s.todos[1].title.push_str(" (draft)"))?;

    for todo in &store.get_state().todos {
        let status = if todo.completed { "x" } else { " " };
        println!("   [{}] {}", status, todo.title);
    }

    Ok(())
}
