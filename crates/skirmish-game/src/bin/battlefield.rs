//! Headless battlefield runner.
//!
//! Plays a scripted round against the scene so the whole stack can be
//! watched from the log output: spawn a few soldiers, raise a shield,
//! poison the target, and keep hitting until the queue advances.

use std::time::Duration;

use skirmish_game::{Action, Battlefield};
use tracing::info;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("battlefield=info".parse()?)
                .add_directive("skirmish_game=info".parse()?),
        )
        .init();

    info!("starting battlefield scene");

    let mut scene = Battlefield::new();
    let step = Duration::from_millis(600);

    let script = [
        Some(Action::Spawn),
        Some(Action::Spawn),
        Some(Action::Spawn),
        Some(Action::ShieldOn),
        Some(Action::PoisonOn),
        Some(Action::Hit),
        Some(Action::Hit),
        Some(Action::ShieldOff),
        None,
        None,
    ];
    for action in script {
        scene.update(step, action);
    }

    // Keep hitting until the first soldier falls and the queue advances.
    let first = scene.current_id();
    while scene.current_id() == first {
        scene.update(step, Some(Action::Hit));
    }

    info!(
        current = %scene.current_id(),
        pooled = scene.pool_len(),
        live = scene.world().entity_count(),
        "first soldier down"
    );

    Ok(())
}
