//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskdeck_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("taskdeck_core version={}", taskdeck_core::core_version());
    println!(
        "taskdeck_core default_log_level={}",
        taskdeck_core::default_log_level()
    );
}
