use regolith_geom::Vec3;

/// Camera that glides over the terrain along a fixed heading, keeping a
/// constant eye height above the crater surface.
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32, // degrees
    pub move_speed: f32,
    pub eye_height: f32,
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw: f32, move_speed: f32, eye_height: f32) -> Self {
        Self {
            position,
            yaw,
            move_speed,
            eye_height,
        }
    }

    /// Unit heading in the ground plane.
    pub fn forward(&self) -> Vec3 {
        let yaw_rad = self.yaw.to_radians();
        Vec3::new(yaw_rad.cos(), 0.0, yaw_rad.sin())
    }

    /// Moves `move_speed * dt` world units along the heading.
    pub fn advance(&mut self, dt: f32) {
        self.position += self.forward() * (self.move_speed * dt);
    }

    pub fn settle_on(&mut self, ground: f32) {
        self.position.y = ground + self.eye_height;
    }
}
