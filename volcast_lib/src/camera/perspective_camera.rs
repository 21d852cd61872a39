use nalgebra::{vector, Point3, Vector2, Vector3};

use crate::common::Ray;

use super::Camera;

// up vector = 0,1,0
pub struct PerspectiveCamera {
    position: Point3<f32>,
    direction: Vector3<f32>,
    img_plane_size: Vector2<f32>, // Calculated from fov_y
    // ray
    dir_00: Vector3<f32>, // Vector from camera point to pixel [0,0]
    du: Vector3<f32>, // Vector between two horizontally neighbouring pixels (example: [0,0] -> [1,0])
    dv: Vector3<f32>, // Vector between two vertically neighbouring pixels (example: [0,0] -> [0,1])
}

impl PerspectiveCamera {
    pub fn new(position: Point3<f32>, direction: Vector3<f32>) -> PerspectiveCamera {
        let fov_y = 60.0;
        let mut img_plane_size = vector![0.0, 2.0 * f32::tan(f32::to_radians(0.5 * fov_y))];
        img_plane_size.x = img_plane_size.y; // * aspect, but aspect is 1.0 right now

        let mut camera = PerspectiveCamera {
            position,
            direction: direction.normalize(),
            img_plane_size,
            dir_00: vector![0.0, 0.0, 0.0],
            du: vector![0.0, 0.0, 0.0],
            dv: vector![0.0, 0.0, 0.0],
        };
        camera.recalc_plane();
        camera
    }

    pub fn set_pos(&mut self, pos: Point3<f32>) {
        self.position = pos;
    }

    pub fn change_pos(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    pub fn set_direction(&mut self, direction: Vector3<f32>) {
        self.direction = direction.normalize();
        self.recalc_plane();
    }

    fn recalc_plane(&mut self) {
        let up = vector![0.0, 1.0, 0.0];
        let right = self.direction.cross(&up).normalize();
        self.du = right * self.img_plane_size.x;
        self.dv = right.cross(&self.direction) * self.img_plane_size.y;
        self.dir_00 = self.direction - 0.5 * self.du - 0.5 * self.dv;
    }
}

impl Camera for PerspectiveCamera {
    fn get_ray(&self, pixel_coord: (f32, f32)) -> Ray {
        let dir = self.dir_00 + self.du * pixel_coord.0 + self.dv * pixel_coord.1;
        let dir = dir.normalize();
        Ray::new(self.position, dir)
    }

    fn get_position(&self) -> Point3<f32> {
        self.position
    }

    fn get_forward(&self) -> Vector3<f32> {
        self.direction
    }
}
