//! `pipewright transforms`.

use pipewright_runtime::registry::TransformRegistry;

/// Prints one `name  profile` line per registered transform.
pub fn execute(registry: &TransformRegistry) {
    for line in listing(registry) {
        println!("{line}");
    }
}

fn listing(registry: &TransformRegistry) -> Vec<String> {
    let width = registry.names().map(str::len).max().unwrap_or_default();
    registry
        .names()
        .filter_map(|name| {
            let profile = registry.profile(name)?;
            Some(format!("{name:<width$}  {profile}"))
        })
        .collect()
}
