// ABOUTME: Output formatting for CLI results.
// ABOUTME: Supports human-readable tables and JSON documents.

use berth::model::{Classified, Container, FileEntry, Image, Network, Usage, Volume};
use serde::Serialize;

/// Output mode for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Columns for people
    Normal,
    /// One JSON document per result
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Print any serializable result as pretty JSON.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => self.error(&format!("cannot encode result: {e}")),
        }
    }

    /// Print a confirmation message (suppressed in JSON mode).
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("{message}"),
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "success",
                    message,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Error: {message}"),
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    pub fn containers(&self, containers: &[Container]) {
        if self.is_json() {
            return self.json(containers);
        }
        println!("{:<14}{:<28}{:<32}{:<10}STATUS", "ID", "NAME", "IMAGE", "STATE");
        for c in containers {
            println!(
                "{:<14}{:<28}{:<32}{:<10}{}",
                c.id.short(),
                c.name().trim_start_matches('/'),
                c.image,
                format!("{:?}", c.state).to_lowercase(),
                c.status
            );
        }
    }

    pub fn images(&self, images: &[Classified<Image>]) {
        if self.is_json() {
            return self.json(images);
        }
        println!("{:<14}{:<44}{:>12}  USAGE", "ID", "TAGS", "SIZE");
        for i in images {
            let tags = if i.resource.repo_tags.is_empty() {
                "<none>".to_string()
            } else {
                i.resource.repo_tags.join(",")
            };
            println!(
                "{:<14}{:<44}{:>12}  {}",
                i.resource.id.short(),
                tags,
                i.resource.size,
                usage(i.usage)
            );
        }
    }

    pub fn volumes(&self, volumes: &[Classified<Volume>]) {
        if self.is_json() {
            return self.json(volumes);
        }
        println!("{:<40}{:<12}USAGE", "NAME", "DRIVER");
        for v in volumes {
            println!("{:<40}{:<12}{}", v.resource.name, v.resource.driver, usage(v.usage));
        }
    }

    pub fn networks(&self, networks: &[Classified<Network>]) {
        if self.is_json() {
            return self.json(networks);
        }
        println!("{:<14}{:<28}{:<10}USAGE", "ID", "NAME", "DRIVER");
        for n in networks {
            let marker = if n.is_system == Some(true) { " (system)" } else { "" };
            println!(
                "{:<14}{:<28}{:<10}{}{}",
                n.resource.id.short(),
                n.resource.name,
                n.resource.driver,
                usage(n.usage),
                marker
            );
        }
    }

    pub fn files(&self, entries: &[FileEntry]) {
        if self.is_json() {
            return self.json(entries);
        }
        for e in entries {
            let name = match &e.target {
                Some(target) => format!("{} -> {target}", e.name),
                None => e.name.clone(),
            };
            println!("{:<12}{:>10}  {}  {}", e.permissions, e.size, e.modified, name);
        }
    }

    pub fn lines<S: AsRef<str>>(&self, items: &[S]) {
        if self.is_json() {
            let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
            return self.json(&items);
        }
        for item in items {
            println!("{}", item.as_ref());
        }
    }
}

fn usage(usage: Usage) -> &'static str {
    match usage {
        Usage::Used => "used",
        Usage::Orphaned => "orphaned",
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
}
