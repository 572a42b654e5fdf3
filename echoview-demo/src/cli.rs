use anyhow::Result;
use echoview::math::DVec3;
use echoview::scene::{AcousticMaterial, Space};
use echoview::{AcousticWorld, ReceiverSearch, SearchEvent, WorldDesc};
use std::sync::Arc;

const GENERIC: u8 = 0;
const CARPET: u8 = 1;
const CONCRETE: u8 = 3;
const METAL: u8 = 4;
const GLASS: u8 = 5;
const SPEAKER: u8 = 6;

pub fn run_all() -> Result<()> {
    log::info!("=== Mirror hall ===");
    run_mirror_hall()?;

    log::info!("=== Glass partition ===");
    run_glass_partition()?;
    Ok(())
}

/// Concrete hall with a metal reflector and one loudspeaker, sampled by a
/// row of receivers.
pub fn run_mirror_hall() -> Result<()> {
    let mut space = Space::with_presets();
    space.add_box_room(DVec3::new(-4.0, -3.0, 0.0), DVec3::new(4.0, 3.0, 3.0), CONCRETE)?;

    // carpet patch just above the floor
    space.add_surface(
        &[
            DVec3::new(-2.0, -2.0, 0.01),
            DVec3::new(2.0, -2.0, 0.01),
            DVec3::new(2.0, 2.0, 0.01),
            DVec3::new(-2.0, 2.0, 0.01),
        ],
        CARPET,
    )?;
    // reflector in front of the +Y wall, facing into the hall
    space.add_surface(
        &[
            DVec3::new(-1.0, 2.9, 1.0),
            DVec3::new(1.0, 2.9, 1.0),
            DVec3::new(1.0, 2.9, 2.5),
            DVec3::new(-1.0, 2.9, 2.5),
        ],
        METAL,
    )?;
    // loudspeaker in front of the -X wall
    space.add_surface(
        &[
            DVec3::new(-3.9, -0.3, 1.2),
            DVec3::new(-3.9, -0.3, 1.8),
            DVec3::new(-3.9, 0.3, 1.8),
            DVec3::new(-3.9, 0.3, 1.2),
        ],
        SPEAKER,
    )?;

    let space = Arc::new(space);
    let desc = WorldDesc::default().max_rounds(2).worker_threads(4);
    let world = AcousticWorld::new(space.clone(), desc)?;

    let origins: Vec<DVec3> = (0..4)
        .map(|i| DVec3::new(-1.5 + i as f64, -0.5, 1.5))
        .collect();
    let results = world.search_receivers(&origins, GENERIC)?;
    for search in &results {
        report(search);
    }

    log::info!(
        "Illustration polygons added to the scene: {}",
        space.illustrations().len()
    );
    Ok(())
}

/// Two rooms separated by a glass panel; the source sits in the far room.
pub fn run_glass_partition() -> Result<()> {
    let mut space = Space::with_presets();
    let tinted = space.add_material(AcousticMaterial {
        transmission: [0.30, 0.20, 0.10],
        ..AcousticMaterial::GLASS
    })?;
    let absorber = space.add_material(AcousticMaterial {
        absorption: [0.40, 0.75, 0.85],
        ..AcousticMaterial::CARPET
    })?;
    log::debug!("Custom materials: tinted = {}, absorber = {}", tinted, absorber);

    space.add_box_room(DVec3::new(-3.0, -2.0, 0.0), DVec3::new(3.0, 2.0, 3.0), absorber)?;
    space.add_surface(
        &[
            DVec3::new(0.0, -1.0, 0.5),
            DVec3::new(0.0, 1.0, 0.5),
            DVec3::new(0.0, 1.0, 2.5),
            DVec3::new(0.0, -1.0, 2.5),
        ],
        GLASS,
    )?;
    space.add_surface(
        &[
            DVec3::new(0.5, -0.8, 0.8),
            DVec3::new(0.5, 0.8, 0.8),
            DVec3::new(0.5, 0.8, 2.2),
            DVec3::new(0.5, -0.8, 2.2),
        ],
        tinted,
    )?;
    space.add_surface(
        &[
            DVec3::new(2.5, -0.4, 1.2),
            DVec3::new(2.5, 0.4, 1.2),
            DVec3::new(2.5, 0.4, 1.8),
            DVec3::new(2.5, -0.4, 1.8),
        ],
        SPEAKER,
    )?;

    let space = Arc::new(space);
    let desc = WorldDesc::default().max_rounds(3).show_projections(true);
    let world = AcousticWorld::new(space.clone(), desc)?;

    let mut receiver = world.receiver(DVec3::new(-2.0, 0.0, 1.5), GENERIC)?;
    let search_report = receiver.search();
    let search = ReceiverSearch {
        receiver,
        report: search_report,
    };
    report(&search);

    for id in search.receiver.sources() {
        let strips = search.receiver.show_history(*id)?;
        log::debug!("History of {}: {} strips", id, strips);
    }
    log::info!(
        "Illustration polygons added to the scene: {}",
        space.take_illustrations().len()
    );

    Ok(())
}

fn report(search: &ReceiverSearch) {
    let receiver = &search.receiver;
    log::info!(
        "Receiver at {:?}: {} views resolved, {} sources{}",
        receiver.origin(),
        search.report.resolved_count,
        search.report.sources.len(),
        if search.report.truncated { " (truncated)" } else { "" }
    );

    for path in receiver.source_paths() {
        log::info!(
            "  {} hop(s) from image {:?}: distance {:.3} m, area {:.4} m², attenuation {:?}",
            path.hops,
            path.image_origin,
            path.distance,
            path.target.area(),
            path.attenuation
        );
    }

    for failure in &search.report.failures {
        log::warn!("  lost view: {}", failure);
    }
    for event in receiver.poll_events() {
        match event {
            SearchEvent::InteriorCoplanar { round, .. } => {
                log::warn!("  round {}: overlapping coplanar surfaces", round)
            }
            SearchEvent::IntersectingCandidates { round, .. } => {
                log::warn!("  round {}: intersecting surfaces", round)
            }
            other => log::debug!("  {:?}", other),
        }
    }
}
