//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pointstore_core` wiring.
//! - Keep output deterministic for quick local sanity checks.

use pointstore_core::{DiscourseService, Point, SearchOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("pointstore_core version={}", pointstore_core::core_version());

    let service = DiscourseService::open_in_memory("cli://local")?;
    service.init()?;

    let point_id = service.add_point(&Point::with_content("hello from the cli"))?;
    let hits = service.search_points_by_content("hello", &SearchOptions::default())?;
    println!("point={point_id} hits={}", hits.len());

    service.close()?;
    Ok(())
}
