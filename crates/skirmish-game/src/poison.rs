//! Poison: periodic random damage to whoever carries the component.
//!
//! The system never touches health directly. Every tick of poison queues a
//! damage message; whether a shield absorbs it or the soldier dies is the
//! health system's business.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use skirmish_ecs::{ComponentKind, ComponentRef, Handle, System};
use skirmish_event::{Mediator, Message};
use tracing::warn;

use crate::components::PoisonComponent;
use crate::events::{DamageInfo, GameEvents, MessageInfo};

/// System driving every attached [`PoisonComponent`].
pub struct PoisonSystem {
    kinds: [ComponentKind; 1],
    components: Vec<Handle<PoisonComponent>>,
    mediator: Mediator,
    events: GameEvents,
    rng: SmallRng,
}

impl PoisonSystem {
    /// Build the system over a shared mediator and channel bundle.
    #[must_use]
    pub fn new(mediator: Mediator, events: GameEvents) -> Self {
        Self::with_rng(mediator, events, SmallRng::from_entropy())
    }

    /// Build with a caller-provided generator, for deterministic tests.
    #[must_use]
    pub fn with_rng(mediator: Mediator, events: GameEvents, rng: SmallRng) -> Self {
        Self {
            kinds: [ComponentKind::of::<PoisonComponent>()],
            components: Vec::new(),
            mediator,
            events,
            rng,
        }
    }

    fn roll(&mut self, poison: &PoisonComponent) -> i32 {
        if poison.max_damage > poison.min_damage {
            self.rng.gen_range(poison.min_damage..poison.max_damage)
        } else {
            poison.min_damage
        }
    }
}

impl System for PoisonSystem {
    fn name(&self) -> &str {
        "poison"
    }

    fn kinds(&self) -> &[ComponentKind] {
        &self.kinds
    }

    fn update(&mut self, elapsed: Duration) {
        for index in 0..self.components.len() {
            let handle = self.components[index].clone();
            let due = {
                let mut poison = handle.write();
                poison.last_damage = poison.last_damage.saturating_add(elapsed).min(poison.frequency);
                if poison.last_damage >= poison.frequency {
                    poison.last_damage = Duration::ZERO;
                    true
                } else {
                    false
                }
            };
            if !due {
                continue;
            }

            let damage = self.roll(&handle.read());
            self.mediator.queue(Message::new(
                self.events.show_message.clone(),
                MessageInfo::new(format!("The poison deals {damage} damage")),
            ));
            self.mediator.queue(Message::new(
                self.events.damage.clone(),
                DamageInfo {
                    target: handle.owner(),
                    amount: damage,
                },
            ));
        }
    }

    fn register(&mut self, component: &ComponentRef) {
        match component.handle::<PoisonComponent>() {
            Some(handle) => self.components.push(handle),
            None => warn!(kind = component.kind().name(), "unexpected component kind"),
        }
    }

    fn unregister(&mut self, component: &ComponentRef) -> bool {
        let before = self.components.len();
        self.components
            .retain(|handle| !handle.raw().same_cell(component));
        self.components.len() != before
    }
}
