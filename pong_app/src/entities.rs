//! Pong entities: bats, the ball and the walls

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use engine2d::entities::bounding_box::BoundingBox;
use engine2d::prelude::*;
use rand::Rng;

pub const WALL_THICKNESS: f64 = 10.0;
pub const BAT_SIZE: Size = Size { width: 10.0, height: 80.0 };
pub const BALL_SIZE: f64 = 12.0;

const BAT_SPEED: f64 = 6.0;
const BALL_SPEED: f64 = 5.0;

/// Unit direction for a bearing measured clockwise from "up"
pub fn heading(bearing: f64, speed: f64) -> Coordinate2D {
    let radians = bearing.to_radians();
    Coordinate2D::new(radians.sin() * speed, radians.cos() * speed)
}

/// Points scored so far, shared between the balls and the game
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

pub type SharedScore = Rc<RefCell<Score>>;

/// Which side a bat defends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A bat steered by two keys
pub struct Bat {
    core: EntityCore,
    up: KeyCode,
    down: KeyCode,
    direction: f64,
    field: Size,
}

impl Bat {
    pub fn new(side: Side, field: Size) -> Self {
        let (x, up, down, layer) = match side {
            Side::Left => (WALL_THICKNESS * 2.0, KeyCode::A, KeyCode::Z, CollisionLayers::PLAYER),
            Side::Right => (
                field.width - WALL_THICKNESS * 2.0,
                KeyCode::Up,
                KeyCode::Down,
                CollisionLayers::OPPONENT,
            ),
        };
        let core = EntityCore::new(Coordinate2D::new(x, field.height / 2.0), BAT_SIZE)
            .with_anchor(Anchor::Center)
            .with_capabilities(
                Capabilities::UPDATABLE | Capabilities::COLLIDABLE | Capabilities::KEY_LISTENER | Capabilities::DRAWABLE,
            )
            .with_layers(layer, CollisionLayers::PROJECTILE)
            .with_tag("bat");

        Self {
            core,
            up,
            down,
            direction: 0.0,
            field,
        }
    }
}

impl Entity for Bat {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {
        if self.direction == 0.0 {
            return;
        }
        let half = BAT_SIZE.height / 2.0;
        let position = self.core.position();
        let y = (position.y + self.direction * BAT_SPEED)
            .clamp(WALL_THICKNESS + half, self.field.height - WALL_THICKNESS - half);
        self.core.set_position(Coordinate2D::new(position.x, y));
    }

    fn on_pressed_keys_change(&mut self, pressed_keys: &HashSet<KeyCode>) {
        self.direction = match (pressed_keys.contains(&self.up), pressed_keys.contains(&self.down)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
    }
}

/// The ball; leaves the field to score and serves its successor
pub struct Ball {
    core: EntityCore,
    velocity: Coordinate2D,
    field: Size,
    score: SharedScore,
}

impl Ball {
    /// A ball in the centre heading diagonally towards a random side
    pub fn serve(field: Size, score: SharedScore) -> Self {
        let mut rng = rand::thread_rng();
        let quadrant = [45.0, 135.0, 225.0, 315.0][rng.gen_range(0..4)];
        let bearing = quadrant + rng.gen_range(-15.0..15.0);
        Self::with_heading(field, score, bearing)
    }

    /// A ball in the centre moving along `bearing`
    pub fn with_heading(field: Size, score: SharedScore, bearing: f64) -> Self {
        let centre = Coordinate2D::new(field.width / 2.0, field.height / 2.0);
        let core = EntityCore::new(centre, Size::square(BALL_SIZE))
            .with_anchor(Anchor::Center)
            .collidable()
            .with_layers(CollisionLayers::PROJECTILE, CollisionLayers::ALL)
            .with_view_order(1.0)
            .with_tag("ball");

        log::debug!("Serving ball at bearing {bearing:.1}");
        Self {
            core,
            velocity: heading(bearing, BALL_SPEED),
            field,
            score,
        }
    }

    pub fn velocity(&self) -> Coordinate2D {
        self.velocity
    }

    fn bounce_off_bat(&mut self, bat: &BoundingBox) {
        let centre = self.core.bounding_box().centre();
        let towards_bat = (bat.centre().x - centre.x) * self.velocity.x > 0.0;
        if !towards_bat {
            return;
        }

        // Leave at the bearing from the bat centre, kept away from vertical
        let bearing = bat.centre().angle_to(centre);
        let bearing = if centre.x > bat.centre().x {
            bearing.clamp(45.0, 135.0)
        } else {
            bearing.clamp(225.0, 315.0)
        };
        self.velocity = heading(bearing, self.velocity.to_vector().norm());
    }

    fn bounce_off_wall(&mut self, wall: &BoundingBox) {
        let centre = self.core.bounding_box().centre();
        let towards_wall = (wall.centre().y - centre.y) * self.velocity.y > 0.0;
        if towards_wall {
            self.velocity = Coordinate2D::new(self.velocity.x, -self.velocity.y);
        }
    }
}

impl Entity for Ball {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        self.core.move_by(self.velocity);

        let bounds = self.core.bounding_box();
        let scorer = if bounds.max_x() < 0.0 {
            Some(Side::Right)
        } else if bounds.min_x > self.field.width {
            Some(Side::Left)
        } else {
            None
        };

        if let Some(side) = scorer {
            {
                let mut score = self.score.borrow_mut();
                match side {
                    Side::Left => score.left += 1,
                    Side::Right => score.right += 1,
                }
                log::info!("{side:?} scores in frame {}: {} - {}", ctx.frame(), score.left, score.right);
            }
            self.core.remove();
            ctx.spawn(Ball::serve(self.field, Rc::clone(&self.score)));
        }
    }

    fn on_collision(&mut self, other: &CollisionPeer) {
        match other.tag {
            "bat" => self.bounce_off_bat(&other.bounds),
            "wall" => self.bounce_off_wall(&other.bounds),
            _ => {}
        }
    }

    fn on_removed(&mut self) {
        log::debug!("Ball left the field at {:?} moving {:?}", self.core.position(), self.velocity());
    }
}

/// Static wall along the top or bottom edge
pub struct Wall {
    core: EntityCore,
}

impl Wall {
    pub fn top(field: Size) -> Self {
        Self::at(Coordinate2D::ORIGIN, field)
    }

    pub fn bottom(field: Size) -> Self {
        Self::at(Coordinate2D::new(0.0, field.height - WALL_THICKNESS), field)
    }

    fn at(corner: Coordinate2D, field: Size) -> Self {
        let core = EntityCore::new(corner, Size::new(field.width, WALL_THICKNESS))
            .collidable()
            .static_entity()
            .with_layers(CollisionLayers::WALL, CollisionLayers::PROJECTILE)
            .with_view_order(-1.0)
            .with_tag("wall");
        Self { core }
    }
}

impl Entity for Wall {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }
}
