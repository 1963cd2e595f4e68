//! Headless Pong wired onto the engine

use std::cell::RefCell;
use std::rc::Rc;

use engine2d::prelude::*;

use crate::entities::{Ball, Bat, Score, SharedScore, Side, Wall};

/// Totals gathered from the per-frame statistics
#[derive(Debug, Default, Clone, Copy)]
pub struct MatchSummary {
    pub frames: u64,
    pub peak_entities: usize,
    pub collisions: usize,
    pub collision_checks: usize,
}

/// A scripted key press or release at a given frame
type ScriptedInput = (u64, AppEvent);

pub struct PongGame {
    score: SharedScore,
    summary: Rc<RefCell<MatchSummary>>,
    script: Vec<ScriptedInput>,
    frame: u64,
}

impl PongGame {
    pub fn new() -> Self {
        Self {
            score: SharedScore::default(),
            summary: Rc::default(),
            script: Self::demo_script(),
            frame: 0,
        }
    }

    /// Both players wiggle their bats; F1 shows bounding boxes for a while
    fn demo_script() -> Vec<ScriptedInput> {
        let mut script = vec![
            (30, AppEvent::KeyPressed(KeyCode::F1)),
            (31, AppEvent::KeyReleased(KeyCode::F1)),
            (240, AppEvent::KeyPressed(KeyCode::F1)),
            (241, AppEvent::KeyReleased(KeyCode::F1)),
        ];
        for cycle in 0..10u64 {
            let start = cycle * 90;
            script.extend([
                (start + 5, AppEvent::KeyPressed(KeyCode::A)),
                (start + 35, AppEvent::KeyReleased(KeyCode::A)),
                (start + 40, AppEvent::KeyInput { key: KeyCode::Z, pressed: true }),
                (start + 70, AppEvent::KeyInput { key: KeyCode::Z, pressed: false }),
                (start + 20, AppEvent::KeyPressed(KeyCode::Down)),
                (start + 60, AppEvent::KeyReleased(KeyCode::Down)),
                (start + 65, AppEvent::KeyPressed(KeyCode::Up)),
                (start + 85, AppEvent::KeyReleased(KeyCode::Up)),
            ]);
        }
        script.sort_by_key(|(frame, _)| *frame);
        script.reverse();
        script
    }

    pub fn score(&self) -> Score {
        *self.score.borrow()
    }

    pub fn summary(&self) -> MatchSummary {
        *self.summary.borrow()
    }
}

impl Default for PongGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for PongGame {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let field = engine.config().size();
        log::info!("Setting up a {}x{} field", field.width, field.height);

        let summary = Rc::clone(&self.summary);
        let entities = engine.entities_mut();
        entities.register_observer(move |stats: &EntityCollectionStatistics| {
            let mut summary = summary.borrow_mut();
            summary.frames = stats.frame();
            summary.peak_entities = summary.peak_entities.max(stats.entity_count());
            summary.collisions += stats.collisions();
            summary.collision_checks += stats.collision_checks();
        });

        entities.register_event_handler(EventKind::Removed, |event: &EntityEvent| {
            if let EntityEvent::Removed { tag, .. } = event {
                log::debug!("Purged {tag}");
            }
            false
        });

        entities.register_supplier(
            OneShotSupplier::new(Vec::new())
                .with(Wall::top(field))
                .with(Wall::bottom(field))
                .with(Bat::new(Side::Left, field))
                .with(Bat::new(Side::Right, field))
                .with(Ball::serve(field, Rc::clone(&self.score))),
        );
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f64) -> Result<(), AppError> {
        self.frame += 1;
        while self.script.last().is_some_and(|(frame, _)| *frame <= self.frame) {
            if let Some((_, event)) = self.script.pop() {
                self.handle_event(engine, event)?;
            }
        }

        if self.frame % 120 == 0 {
            let drawn = engine.entities().draw_order().len();
            log::debug!("Frame {}: {drawn} entities to draw", self.frame);
        }
        Ok(())
    }

    fn cleanup(&mut self, _engine: &mut Engine) {
        let score = self.score();
        let summary = self.summary();
        log::info!(
            "Final score {} - {} after {} frames ({} collisions in {} checks, peak {} entities)",
            score.left,
            score.right,
            summary.frames,
            summary.collisions,
            summary.collision_checks,
            summary.peak_entities
        );
    }
}
